//! CSS color to spreadsheet ARGB conversion.
//!
//! Accepts `#rgb`, `#rrggbb`, `#aarrggbb` (with or without `#`), `rgb()`,
//! `rgba()` and a small table of named colors. Anything else becomes opaque
//! black; conversion never fails.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static RGB_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^rgba?\(\s*(-?[0-9.]+)\s*[,\s]\s*(-?[0-9.]+)\s*[,\s]\s*(-?[0-9.]+)\s*(?:[,/]\s*([^)\s]*)\s*)?\)$",
    )
    .expect("BUG: hardcoded rgb() pattern is statically valid")
});

/// Named colors understood by the translator, as `(name, RRGGBB)`.
const NAMED_COLORS: [(&str, u32); 13] = [
    ("black", 0x000000),
    ("white", 0xFFFFFF),
    ("red", 0xFF0000),
    ("green", 0x008000),
    ("blue", 0x0000FF),
    ("yellow", 0xFFFF00),
    ("magenta", 0xFF00FF),
    ("cyan", 0x00FFFF),
    ("gray", 0x808080),
    ("silver", 0xC0C0C0),
    ("purple", 0x800080),
    ("orange", 0xFFA500),
    ("pink", 0xFFC0CB),
];

const OPAQUE: u32 = 0xFF00_0000;

/// Color in the spreadsheet's alpha-first `AARRGGBB` representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ArgbColor(u32);

impl ArgbColor {
    pub const BLACK: ArgbColor = ArgbColor(OPAQUE);

    pub const fn new(alpha: u8, red: u8, green: u8, blue: u8) -> Self {
        ArgbColor(((alpha as u32) << 24) | ((red as u32) << 16) | ((green as u32) << 8) | blue as u32)
    }

    pub const fn alpha(&self) -> u8 {
        (self.0 >> 24) as u8
    }
}

impl fmt::Display for ArgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

/// Converts CSS color syntax into an [`ArgbColor`]; unknown input yields opaque black.
pub fn to_spreadsheet_color(css_color: &str) -> ArgbColor {
    let color = css_color.trim().to_ascii_lowercase();
    if color.is_empty() {
        return ArgbColor::BLACK;
    }
    if let Some((_, rgb)) = NAMED_COLORS.iter().find(|(name, _)| *name == color) {
        return ArgbColor(OPAQUE | rgb);
    }
    if let Some(captures) = RGB_FUNCTION.captures(&color) {
        let red = parse_channel(&captures[1]);
        let green = parse_channel(&captures[2]);
        let blue = parse_channel(&captures[3]);
        let alpha = captures.get(4).map_or(0xFF, |alpha| parse_alpha(alpha.as_str()));
        return ArgbColor::new(alpha, red, green, blue);
    }
    parse_hex(color.strip_prefix('#').unwrap_or(&color)).unwrap_or(ArgbColor::BLACK)
}

fn parse_hex(hex: &str) -> Option<ArgbColor> {
    if !hex.chars().all(|character| character.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let expanded: String = hex.chars().flat_map(|digit| [digit, digit]).collect();
            u32::from_str_radix(&expanded, 16).ok().map(|rgb| ArgbColor(OPAQUE | rgb))
        }
        6 => u32::from_str_radix(hex, 16).ok().map(|rgb| ArgbColor(OPAQUE | rgb)),
        8 => u32::from_str_radix(hex, 16).ok().map(ArgbColor),
        _ => None,
    }
}

fn parse_channel(value: &str) -> u8 {
    value.parse::<f64>().map_or(0, |channel| channel.round().clamp(0.0, 255.0) as u8)
}

fn parse_alpha(value: &str) -> u8 {
    let alpha = match value.strip_suffix('%') {
        Some(percent) => percent.parse::<f64>().map(|percent| percent / 100.0),
        None => value.parse::<f64>(),
    };
    match alpha {
        Ok(alpha) if alpha.is_finite() => (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
        _ => 0xFF,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hex(css: &str) -> String {
        to_spreadsheet_color(css).to_string()
    }

    #[test]
    fn hex_forms() {
        assert_eq!(hex("#fff"), "FFFFFFFF");
        assert_eq!(hex("#ffffff"), "FFFFFFFF");
        assert_eq!(hex("white"), "FFFFFFFF");
        assert_eq!(hex("#ff0000"), "FFFF0000");
        assert_eq!(hex("00ff00"), "FF00FF00");
        assert_eq!(hex("#AbC"), "FFAABBCC");
    }

    #[test]
    fn rgb_functions() {
        assert_eq!(hex("rgba(10,20,30,0.5)"), "800A141E");
        assert_eq!(hex("rgb(255, 0, 0)"), "FFFF0000");
        assert_eq!(hex("rgb(300, -5, 12.6)"), "FFFF000D");
        assert_eq!(hex("rgba(1, 2, 3, oops)"), "FF010203");
        assert_eq!(hex("rgba(1, 2, 3, 0)"), "00010203");
        assert_eq!(hex("rgb(1 2 3 / 50%)"), "80010203");
    }

    #[test]
    fn named_colors() {
        assert_eq!(hex("green"), "FF008000");
        assert_eq!(hex(" Orange "), "FFFFA500");
        assert_eq!(hex("pink"), "FFFFC0CB");
    }

    #[test]
    fn unknown_input_is_black() {
        assert_eq!(hex(""), "FF000000");
        assert_eq!(hex("chartreuse-ish"), "FF000000");
        assert_eq!(hex("#12345"), "FF000000");
        assert_eq!(hex("rgb(1,2)"), "FF000000");
    }

    proptest! {
        #[test]
        fn output_is_idempotent(value in any::<u32>()) {
            let first = ArgbColor(value).to_string();
            prop_assert_eq!(hex(&first), first.clone());
            prop_assert_eq!(hex(&format!("#{first}")), first);
        }

        #[test]
        fn rgb_channels_round_trip(red in any::<u8>(), green in any::<u8>(), blue in any::<u8>()) {
            let color = to_spreadsheet_color(&format!("rgb({red}, {green}, {blue})"));
            prop_assert_eq!(color, ArgbColor::new(0xFF, red, green, blue));
            prop_assert_eq!(to_spreadsheet_color(&color.to_string()), color);
        }
    }
}
