//! Text utilities shared by the content and dimension stages.
//! Widths are measured in pixels of a default-width Latin character font.

/// Width of an ordinary character in pixels.
pub(crate) const DEFAULT_CHAR_WIDTH: f64 = 7.0;

/// Width of a CJK or full-width character in pixels.
const WIDE_CHAR_WIDTH: f64 = 12.0;

/// Width of a narrow Latin character in pixels.
const NARROW_CHAR_WIDTH: f64 = 4.0;

const NARROW_CHARS: [char; 7] = ['i', 'l', 'I', '.', ',', ':', ';'];

/// Checks whether a character is rendered at CJK/full width.
#[inline]
pub(crate) fn is_wide_char(character: char) -> bool {
    matches!(
        character,
        '\u{4E00}'..='\u{9FFF}' | '\u{3000}'..='\u{303F}' | '\u{FF00}'..='\u{FFEF}'
    )
}

/// Returns the weighted pixel width of one character.
#[inline]
pub(crate) fn char_width(character: char) -> f64 {
    if is_wide_char(character) {
        WIDE_CHAR_WIDTH
    } else if NARROW_CHARS.contains(&character) {
        NARROW_CHAR_WIDTH
    } else {
        DEFAULT_CHAR_WIDTH
    }
}

/// Returns the weighted pixel width of a single line of text.
pub(crate) fn text_width(text: &str) -> f64 {
    text.chars().map(char_width).sum()
}

/// Returns the width of the longest newline-separated line.
pub(crate) fn longest_line_width(text: &str) -> f64 {
    text.split('\n').map(text_width).fold(0.0, f64::max)
}

/// Counts newline-separated lines; an empty string is one line.
pub(crate) fn line_count(text: &str) -> usize {
    text.split('\n').count()
}

/// Collapses runs of whitespace into single spaces and trims both ends.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits a CSS-like length such as `12.5px` into its number and lowercase unit.
/// Returns `None` when the value does not start with a number.
pub(crate) fn split_number_unit(value: &str) -> Option<(f64, String)> {
    let value = value.trim();
    let end = value
        .char_indices()
        .find(|(index, character)| !(character.is_ascii_digit() || *character == '.' || (*index == 0 && *character == '-')))
        .map(|(index, _)| index)
        .unwrap_or(value.len());
    let number = value[..end].parse::<f64>().ok()?;
    Some((number, value[end..].trim().to_ascii_lowercase()))
}
