//! Style extraction from table cells into a spreadsheet-agnostic [`StyleRecord`].
//!
//! Every axis is resolved in the same order: the last styled descendant of the
//! cell (editors wrap styled runs in `<span>`/`<p>`/`<font>`), then the cell's
//! own inline style, then the computed style reported by the [`StyleResolver`].
//! A value that cannot be understood falls through to the next source.
//! Descendants living inside a nested table never contribute.

use crate::error::ResultOptionChain;
use crate::helpers::string::split_number_unit;
use crate::html::css::presentational_attribute;
use crate::html::css::InlineStyle;
use crate::html::css::StyleError;
use crate::html::css::StyleResolver;
use crate::html::HtmlNode;
use crate::html::TAG_TABLE;
use crate::spreadsheet::color::to_spreadsheet_color;
use crate::spreadsheet::color::ArgbColor;

/// Font used when the source family is missing or not in the font table.
pub const DEFAULT_FONT_NAME: &str = "宋体";

/// Root font size in pixels used for `em`/`rem`/`%` sizes.
const ROOT_FONT_SIZE_PX: f64 = 16.0;

/// Web font names (lowercase) mapped to fonts a spreadsheet engine ships with.
const FONT_TABLE: [(&str, &str); 21] = [
    ("宋体", "宋体"),
    ("simsun", "宋体"),
    ("黑体", "黑体"),
    ("simhei", "黑体"),
    ("微软雅黑", "微软雅黑"),
    ("microsoft yahei", "微软雅黑"),
    ("楷体", "楷体"),
    ("simkai", "楷体"),
    ("仿宋", "仿宋"),
    ("fangsong", "仿宋"),
    ("arial", "Arial"),
    ("helvetica", "Arial"),
    ("times new roman", "Times New Roman"),
    ("calibri", "Calibri"),
    ("verdana", "Verdana"),
    ("tahoma", "Tahoma"),
    ("courier new", "Courier New"),
    ("georgia", "Georgia"),
    ("sans-serif", "Arial"),
    ("serif", "Times New Roman"),
    ("monospace", "Courier New"),
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
    #[default]
    Unset,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VerticalAlign {
    Top,
    #[default]
    Middle,
    Bottom,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BorderStyle {
    Thin,
}

/// Border applied to all four sides of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Border {
    pub style: BorderStyle,
    pub color: ArgbColor,
}

impl Border {
    pub const THIN_BLACK: Border = Border { style: BorderStyle::Thin, color: ArgbColor::BLACK };
}

/// Normalized style of one cell.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StyleRecord {
    pub font_name: String,
    /// `None` lets the spreadsheet engine apply its default size.
    pub font_size_points: Option<u32>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// `None` keeps the engine's default text color.
    pub font_color: Option<ArgbColor>,
    pub fill_color: Option<ArgbColor>,
    pub horizontal_align: HorizontalAlign,
    pub vertical_align: VerticalAlign,
    pub border: Border,
}

impl Default for StyleRecord {
    /// The border-only record used for placeholders and failed extractions.
    fn default() -> Self {
        StyleRecord {
            font_name: DEFAULT_FONT_NAME.to_owned(),
            font_size_points: None,
            bold: false,
            italic: false,
            underline: false,
            font_color: None,
            fill_color: None,
            horizontal_align: HorizontalAlign::default(),
            vertical_align: VerticalAlign::default(),
            border: Border::THIN_BLACK,
        }
    }
}

impl StyleRecord {
    pub fn border_only() -> Self {
        Self::default()
    }
}

/// Style sources of one cell, in priority order.
struct StyleSources<'a, N: HtmlNode, R: StyleResolver<N> + ?Sized> {
    cell: &'a N,
    resolver: &'a R,
    descendants: Vec<N>,
    descendant_styles: Vec<InlineStyle>,
    own: InlineStyle,
}

impl<'a, N: HtmlNode, R: StyleResolver<N> + ?Sized> StyleSources<'a, N, R> {
    fn new(cell: &'a N, resolver: &'a R) -> Self {
        let descendants = styling_descendants(cell);
        let descendant_styles = descendants.iter().map(InlineStyle::of).collect();
        StyleSources { cell, resolver, descendants, descendant_styles, own: InlineStyle::of(cell) }
    }

    /// Values declared by descendants in document order, from their inline
    /// style or from legacy attributes such as `<font color>`.
    fn descendant_values(&self, property: &str) -> Vec<String> {
        self.descendants
            .iter()
            .zip(&self.descendant_styles)
            .filter_map(|(node, style)| {
                style
                    .get(property)
                    .map(str::to_owned)
                    .or_else(|| presentational_attribute(node, property))
            })
            .collect()
    }

    /// Value from the last descendant declaring the property.
    fn descendant(&self, property: &str) -> Option<String> {
        self.descendant_values(property).pop()
    }

    fn own(&self, property: &str) -> Option<String> {
        self.own.get(property).map(str::to_owned)
    }

    fn computed(&self, property: &str) -> Result<Option<String>, StyleError> {
        self.resolver.computed(self.cell, property)
    }

    /// Descendant, then own, then computed value of a property.
    fn resolve(&self, property: &str) -> Result<Option<String>, StyleError> {
        Ok::<_, StyleError>(self.descendant(property))
            .ok_none_else(|| Ok(self.own(property)))
            .ok_none_else(|| self.computed(property))
    }

    /// Like [`Self::resolve`], skipping values `parse` rejects.
    fn resolve_with<T, P>(&self, property: &str, parse: P) -> Result<Option<T>, StyleError>
    where
        P: Fn(&str) -> Option<T>,
    {
        if let Some(value) = self.descendant_values(property).iter().rev().find_map(|value| parse(value)) {
            return Ok(Some(value));
        }
        if let Some(value) = self.own(property).and_then(|value| parse(&value)) {
            return Ok(Some(value));
        }
        Ok(self.computed(property)?.and_then(|value| parse(&value)))
    }

    /// Checks any descendant declaration of a property against a predicate.
    fn any_descendant(&self, property: &str, predicate: fn(&str) -> bool) -> bool {
        self.descendant_values(property).iter().any(|value| predicate(value))
    }

    fn has_descendant_tag(&self, tags: &[&str]) -> bool {
        self.descendants.iter().any(|node| tags.contains(&node.tag()))
    }

    /// Own, then computed value, checked against a predicate.
    fn own_or_computed(&self, property: &str, predicate: fn(&str) -> bool) -> Result<bool, StyleError> {
        if self.own(property).is_some_and(|value| predicate(&value)) {
            return Ok(true);
        }
        Ok(self.computed(property)?.is_some_and(|value| predicate(&value)))
    }
}

/// Derives the [`StyleRecord`] of a table cell.
///
/// Fails only when the resolver cannot answer; callers downgrade that to
/// [`StyleRecord::border_only`].
pub fn extract_style<N, R>(cell: &N, resolver: &R) -> Result<StyleRecord, StyleError>
where
    N: HtmlNode,
    R: StyleResolver<N> + ?Sized,
{
    let sources = StyleSources::new(cell, resolver);

    let bold = sources.any_descendant("font-weight", is_bold)
        || cell.is_header_cell()
        || sources.has_descendant_tag(&["strong", "b"])
        || sources.own_or_computed("font-weight", is_bold)?;
    let italic = sources.any_descendant("font-style", is_italic)
        || sources.has_descendant_tag(&["em", "i"])
        || sources.own_or_computed("font-style", is_italic)?;
    let underline = sources.any_descendant("text-decoration", is_underline)
        || sources.has_descendant_tag(&["u"])
        || sources.own_or_computed("text-decoration", is_underline)?;

    let font_name = sources
        .resolve("font-family")?
        .map_or(DEFAULT_FONT_NAME, |family| map_font_family(&family))
        .to_owned();
    let font_size_points = sources.resolve_with("font-size", font_size_pixels)?.map(pixels_to_points);

    Ok(StyleRecord {
        font_name,
        font_size_points,
        bold,
        italic,
        underline,
        font_color: font_color(&sources)?,
        fill_color: fill_color(&sources)?,
        horizontal_align: sources.resolve_with("text-align", horizontal_align)?.unwrap_or_default(),
        vertical_align: sources.resolve_with("vertical-align", vertical_align)?.unwrap_or_default(),
        border: Border::THIN_BLACK,
    })
}

/// Explicit colors always apply; a computed default black is treated as unset.
fn font_color<N, R>(sources: &StyleSources<'_, N, R>) -> Result<Option<ArgbColor>, StyleError>
where
    N: HtmlNode,
    R: StyleResolver<N> + ?Sized,
{
    if let Some(color) = sources.descendant("color").or_else(|| sources.own("color")) {
        return Ok(Some(to_spreadsheet_color(&color)));
    }
    Ok(sources
        .computed("color")?
        .map(|color| to_spreadsheet_color(&color))
        .filter(|color| *color != ArgbColor::BLACK))
}

/// First non-transparent background in priority order.
fn fill_color<N, R>(sources: &StyleSources<'_, N, R>) -> Result<Option<ArgbColor>, StyleError>
where
    N: HtmlNode,
    R: StyleResolver<N> + ?Sized,
{
    sources.resolve_with("background-color", |color| {
        (!is_transparent(color)).then(|| to_spreadsheet_color(color))
    })
}

/// Descendant elements that may style the cell, skipping nested tables.
fn styling_descendants<N: HtmlNode>(cell: &N) -> Vec<N> {
    let mut nodes = Vec::new();
    let mut stack: Vec<N> = cell.element_children().into_iter().rev().collect();
    while let Some(node) = stack.pop() {
        if node.tag() == TAG_TABLE {
            continue;
        }
        stack.extend(node.element_children().into_iter().rev());
        nodes.push(node);
    }
    nodes
}

fn is_bold(value: &str) -> bool {
    let value = value.trim();
    value.eq_ignore_ascii_case("bold")
        || value.eq_ignore_ascii_case("bolder")
        || value.parse::<u32>().is_ok_and(|weight| weight >= 700)
}

fn is_italic(value: &str) -> bool {
    let value = value.trim();
    value.eq_ignore_ascii_case("italic") || value.eq_ignore_ascii_case("oblique")
}

fn is_underline(value: &str) -> bool {
    value.to_ascii_lowercase().contains("underline")
}

fn is_transparent(value: &str) -> bool {
    let value = value.trim();
    value.is_empty()
        || value.eq_ignore_ascii_case("transparent")
        || value.eq_ignore_ascii_case("inherit")
        || value.eq_ignore_ascii_case("initial")
        || to_spreadsheet_color(value).alpha() == 0
}

/// Converts a CSS font size into pixels; `px` and unitless values are pixels.
pub fn font_size_pixels(value: &str) -> Option<f64> {
    let (number, unit) = split_number_unit(value)?;
    let pixels = match unit.as_str() {
        "" | "px" => number,
        "pt" => number * 4.0 / 3.0,
        "em" | "rem" => number * ROOT_FONT_SIZE_PX,
        "%" => number / 100.0 * ROOT_FONT_SIZE_PX,
        _ => return None,
    };
    (pixels > 0.0).then_some(pixels)
}

/// `points = round(pixels * 0.75)`
pub fn pixels_to_points(pixels: f64) -> u32 {
    (pixels * 0.75).round() as u32
}

/// Maps the first family of a `font-family` list onto a spreadsheet-safe font.
pub fn map_font_family(family: &str) -> &'static str {
    let first = family.split(',').next().unwrap_or_default();
    let name = first.replace(['"', '\''], "").trim().to_lowercase();
    FONT_TABLE
        .iter()
        .find(|(web, _)| *web == name)
        .map_or(DEFAULT_FONT_NAME, |(_, font)| *font)
}

fn horizontal_align(value: &str) -> Option<HorizontalAlign> {
    match value.trim().to_ascii_lowercase().as_str() {
        "center" | "-webkit-center" => Some(HorizontalAlign::Center),
        "right" | "end" => Some(HorizontalAlign::Right),
        "left" | "start" => Some(HorizontalAlign::Left),
        _ => None,
    }
}

fn vertical_align(value: &str) -> Option<VerticalAlign> {
    match value.trim().to_ascii_lowercase().as_str() {
        "top" | "text-top" => Some(VerticalAlign::Top),
        "middle" => Some(VerticalAlign::Middle),
        "bottom" | "text-bottom" => Some(VerticalAlign::Bottom),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::css::CssStyleResolver;
    use crate::html::memory::MemoryDocument;
    use crate::html::memory::MemoryNode;

    struct BrokenResolver;

    impl<'a> StyleResolver<MemoryNode<'a>> for BrokenResolver {
        fn computed(&self, node: &MemoryNode<'a>, _: &str) -> Result<Option<String>, StyleError> {
            Err(StyleError::Unavailable { tag: node.tag().to_owned(), message: "detached".to_owned() })
        }
    }

    fn extract(document: &MemoryDocument, cell: usize) -> StyleRecord {
        extract_style(&document.node(cell), &CssStyleResolver::new()).unwrap()
    }

    #[test]
    fn fill_and_strong_descendant() {
        let mut document = MemoryDocument::new();
        let cell = document.element(None, "td");
        document.set_attribute(cell, "style", "background-color:#ff0000");
        let strong = document.element(Some(cell), "strong");
        document.text(strong, "X");

        let style = extract(&document, cell);
        assert_eq!(style.fill_color.map(|color| color.to_string()).as_deref(), Some("FFFF0000"));
        assert!(style.bold);
        assert!(!style.italic);
        assert_eq!(style.border, Border::THIN_BLACK);
        assert_eq!(style.vertical_align, VerticalAlign::Middle);
    }

    #[test]
    fn descendant_wins_over_own_style() {
        let mut document = MemoryDocument::new();
        let cell = document.element(None, "td");
        document.set_attribute(cell, "style", "color: blue; font-size: 12px; text-align: right");
        let first = document.element(Some(cell), "span");
        document.set_attribute(first, "style", "color: red");
        let second = document.element(Some(cell), "span");
        document.set_attribute(second, "style", "color: #00ff00; font-size: 20px; text-decoration: underline");

        let style = extract(&document, cell);
        assert_eq!(style.font_color, Some(to_spreadsheet_color("#00ff00")));
        assert_eq!(style.font_size_points, Some(15));
        assert!(style.underline);
        assert_eq!(style.horizontal_align, HorizontalAlign::Right);
    }

    #[test]
    fn header_cells_are_bold_and_centered() {
        let mut document = MemoryDocument::new();
        let cell = document.element(None, "th");
        let style = extract(&document, cell);
        assert!(style.bold);
        assert_eq!(style.horizontal_align, HorizontalAlign::Center);
        assert_eq!(style.font_name, DEFAULT_FONT_NAME);
        assert_eq!(style.font_size_points, None);
    }

    #[test]
    fn computed_black_and_transparent_are_unset() {
        let mut document = MemoryDocument::new();
        let table = document.element(None, "table");
        document.set_attribute(table, "style", "color: rgb(0, 0, 0)");
        let row = document.element(Some(table), "tr");
        let cell = document.element(Some(row), "td");
        document.set_attribute(cell, "style", "background-color: rgba(0, 0, 0, 0)");

        let style = extract(&document, cell);
        assert_eq!(style.font_color, None);
        assert_eq!(style.fill_color, None);

        document.set_attribute(cell, "style", "color: black; background: transparent");
        let style = extract(&document, cell);
        assert_eq!(style.font_color, Some(ArgbColor::BLACK));
        assert_eq!(style.fill_color, None);
    }

    #[test]
    fn nested_table_descendants_are_ignored() {
        let mut document = MemoryDocument::new();
        let cell = document.element(None, "td");
        let table = document.element(Some(cell), "table");
        let row = document.element(Some(table), "tr");
        let inner = document.element(Some(row), "td");
        let bold = document.element(Some(inner), "b");
        document.set_attribute(bold, "style", "color: red");

        let style = extract(&document, cell);
        assert!(!style.bold);
        assert_eq!(style.font_color, None);
    }

    #[test]
    fn font_family_and_size_units() {
        assert_eq!(map_font_family("\"Microsoft YaHei\", sans-serif"), "微软雅黑");
        assert_eq!(map_font_family("Helvetica"), "Arial");
        assert_eq!(map_font_family("Comic Sans MS"), DEFAULT_FONT_NAME);
        assert_eq!(font_size_pixels("16px"), Some(16.0));
        assert_eq!(font_size_pixels("12pt"), Some(16.0));
        assert_eq!(font_size_pixels("1.5em"), Some(24.0));
        assert_eq!(font_size_pixels("large"), None);
        assert_eq!(pixels_to_points(14.0), 11);
    }

    #[test]
    fn unparsable_descendant_values_fall_through() {
        let mut document = MemoryDocument::new();
        let cell = document.element(None, "td");
        document.set_attribute(cell, "style", "font-size: 14px; text-align: right");
        let span = document.element(Some(cell), "span");
        document.set_attribute(span, "style", "font-size: small; text-align: justify; background-color: transparent");

        let style = extract(&document, cell);
        assert_eq!(style.font_size_points, Some(11));
        assert_eq!(style.horizontal_align, HorizontalAlign::Right);
        assert_eq!(style.fill_color, None);
    }

    #[test]
    fn font_tag_descendants_style_the_cell() {
        let mut document = MemoryDocument::new();
        let cell = document.element(None, "td");
        let font = document.element(Some(cell), "font");
        document.set_attribute(font, "color", "Red");
        document.set_attribute(font, "face", "Arial");
        document.text(font, "warning");

        let style = extract(&document, cell);
        assert_eq!(style.font_color, Some(to_spreadsheet_color("red")));
        assert_eq!(style.font_name, "Arial");
    }

    #[test]
    fn row_valign_reaches_cells() {
        let mut document = MemoryDocument::new();
        let table = document.element(None, "table");
        let body = document.element(Some(table), "tbody");
        let row = document.element(Some(body), "tr");
        document.set_attribute(row, "valign", "top");
        let cell = document.element(Some(row), "td");
        let bottom = document.element(Some(row), "td");
        document.set_attribute(bottom, "valign", "bottom");

        assert_eq!(extract(&document, cell).vertical_align, VerticalAlign::Top);
        assert_eq!(extract(&document, bottom).vertical_align, VerticalAlign::Bottom);
    }

    #[test]
    fn resolver_failure_is_reported() {
        let mut document = MemoryDocument::new();
        let cell = document.element(None, "td");
        let result = extract_style(&document.node(cell), &BrokenResolver);
        assert!(matches!(result, Err(StyleError::Unavailable { .. })));
    }
}
