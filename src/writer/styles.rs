//! Deduplicated SpreadsheetML style table (`xl/styles.xml`).

use crate::error::HtmlSheetError;
use crate::helpers::xml::XmlWriter;
use crate::spreadsheet::color::ArgbColor;
use crate::spreadsheet::style::Border;
use crate::spreadsheet::style::BorderStyle;
use crate::spreadsheet::style::HorizontalAlign;
use crate::spreadsheet::style::StyleRecord;
use crate::spreadsheet::style::VerticalAlign;
use crate::spreadsheet::style::DEFAULT_FONT_NAME;
use crate::writer::NS_MAIN;
use std::collections::HashMap;

/// Font size written when a style leaves it to the engine.
const DEFAULT_FONT_SIZE: u32 = 11;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct FontKey {
    name: String,
    size: u32,
    bold: bool,
    italic: bool,
    underline: bool,
    color: Option<ArgbColor>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct FormatKey {
    font: usize,
    fill: usize,
    border: usize,
    horizontal: HorizontalAlign,
    vertical: VerticalAlign,
}

/// Fonts, fills, borders and cell formats shared by all sheets of a workbook.
pub(crate) struct StyleTable {
    wrap_text: bool,
    fonts: Vec<FontKey>,
    fills: Vec<Option<ArgbColor>>,
    borders: Vec<Option<Border>>,
    formats: Vec<FormatKey>,
    format_ids: HashMap<StyleRecord, usize>,
}

impl StyleTable {
    /// Creates the table with the entries every package must start with:
    /// the default font, the `none` and `gray125` fills, an empty border and
    /// the default cell format.
    pub(crate) fn new(wrap_text: bool) -> Self {
        let default_font = FontKey {
            name: DEFAULT_FONT_NAME.to_owned(),
            size: DEFAULT_FONT_SIZE,
            bold: false,
            italic: false,
            underline: false,
            color: None,
        };
        StyleTable {
            wrap_text,
            fonts: vec![default_font],
            fills: vec![None, None],
            borders: vec![None],
            formats: vec![FormatKey {
                font: 0,
                fill: 0,
                border: 0,
                horizontal: HorizontalAlign::Unset,
                vertical: VerticalAlign::Middle,
            }],
            format_ids: HashMap::new(),
        }
    }

    /// Returns the `cellXfs` index of a style, adding it when new.
    pub(crate) fn register(&mut self, style: &StyleRecord) -> usize {
        if let Some(id) = self.format_ids.get(style) {
            return *id;
        }
        let font = FontKey {
            name: style.font_name.clone(),
            size: style.font_size_points.unwrap_or(DEFAULT_FONT_SIZE),
            bold: style.bold,
            italic: style.italic,
            underline: style.underline,
            color: style.font_color,
        };
        let format = FormatKey {
            font: index_of(&mut self.fonts, font),
            fill: match style.fill_color {
                // 0 and 1 are the reserved `none` and `gray125` fills
                Some(color) => index_of_from(&mut self.fills, Some(color), 2),
                None => 0,
            },
            border: index_of(&mut self.borders, Some(style.border)),
            horizontal: style.horizontal_align,
            vertical: style.vertical_align,
        };
        let id = index_of(&mut self.formats, format);
        self.format_ids.insert(style.clone(), id);
        id
    }

    pub(crate) fn format_count(&self) -> usize {
        self.formats.len()
    }

    /// Writes the `styleSheet` document.
    pub(crate) fn write(&self, writer: &mut XmlWriter<Vec<u8>>) -> Result<(), HtmlSheetError> {
        writer.start("styleSheet", &[("xmlns", NS_MAIN)])?;

        writer.start("fonts", &[("count", &self.fonts.len().to_string())])?;
        for font in &self.fonts {
            write_font(writer, font)?;
        }
        writer.end("fonts")?;

        writer.start("fills", &[("count", &self.fills.len().to_string())])?;
        for (index, fill) in self.fills.iter().enumerate() {
            write_fill(writer, index, fill)?;
        }
        writer.end("fills")?;

        writer.start("borders", &[("count", &self.borders.len().to_string())])?;
        for border in &self.borders {
            write_border(writer, border)?;
        }
        writer.end("borders")?;

        writer.start("cellStyleXfs", &[("count", "1")])?;
        writer.empty("xf", &[("numFmtId", "0"), ("fontId", "0"), ("fillId", "0"), ("borderId", "0")])?;
        writer.end("cellStyleXfs")?;

        writer.start("cellXfs", &[("count", &self.formats.len().to_string())])?;
        for format in &self.formats {
            self.write_format(writer, format)?;
        }
        writer.end("cellXfs")?;

        writer.start("cellStyles", &[("count", "1")])?;
        writer.empty("cellStyle", &[("name", "Normal"), ("xfId", "0"), ("builtinId", "0")])?;
        writer.end("cellStyles")?;

        writer.end("styleSheet")
    }

    fn write_format(&self, writer: &mut XmlWriter<Vec<u8>>, format: &FormatKey) -> Result<(), HtmlSheetError> {
        let font = format.font.to_string();
        let fill = format.fill.to_string();
        let border = format.border.to_string();
        writer.start("xf", &[
            ("numFmtId", "0"),
            ("fontId", &font),
            ("fillId", &fill),
            ("borderId", &border),
            ("xfId", "0"),
            ("applyFont", "1"),
            ("applyFill", "1"),
            ("applyBorder", "1"),
            ("applyAlignment", "1"),
        ])?;

        let mut alignment = Vec::with_capacity(3);
        match format.horizontal {
            HorizontalAlign::Left => alignment.push(("horizontal", "left")),
            HorizontalAlign::Center => alignment.push(("horizontal", "center")),
            HorizontalAlign::Right => alignment.push(("horizontal", "right")),
            HorizontalAlign::Unset => (),
        }
        alignment.push(match format.vertical {
            VerticalAlign::Top => ("vertical", "top"),
            VerticalAlign::Middle => ("vertical", "center"),
            VerticalAlign::Bottom => ("vertical", "bottom"),
        });
        if self.wrap_text {
            alignment.push(("wrapText", "1"));
        }
        writer.empty("alignment", &alignment)?;

        writer.end("xf")
    }
}

fn index_of<T: PartialEq>(items: &mut Vec<T>, item: T) -> usize {
    index_of_from(items, item, 0)
}

/// Position of `item` at or after `start`, appending it when absent.
fn index_of_from<T: PartialEq>(items: &mut Vec<T>, item: T, start: usize) -> usize {
    match items.iter().skip(start).position(|existing| *existing == item) {
        Some(position) => start + position,
        None => {
            items.push(item);
            items.len() - 1
        }
    }
}

fn write_font(writer: &mut XmlWriter<Vec<u8>>, font: &FontKey) -> Result<(), HtmlSheetError> {
    writer.start("font", &[])?;
    if font.bold {
        writer.empty("b", &[])?;
    }
    if font.italic {
        writer.empty("i", &[])?;
    }
    if font.underline {
        writer.empty("u", &[])?;
    }
    writer.empty("sz", &[("val", &font.size.to_string())])?;
    if let Some(color) = font.color {
        writer.empty("color", &[("rgb", &color.to_string())])?;
    }
    writer.empty("name", &[("val", &font.name)])?;
    writer.end("font")
}

fn write_fill(writer: &mut XmlWriter<Vec<u8>>, index: usize, fill: &Option<ArgbColor>) -> Result<(), HtmlSheetError> {
    writer.start("fill", &[])?;
    match fill {
        Some(color) => {
            writer.start("patternFill", &[("patternType", "solid")])?;
            writer.empty("fgColor", &[("rgb", &color.to_string())])?;
            writer.empty("bgColor", &[("indexed", "64")])?;
            writer.end("patternFill")?;
        }
        None if index == 1 => writer.empty("patternFill", &[("patternType", "gray125")])?,
        None => writer.empty("patternFill", &[("patternType", "none")])?,
    }
    writer.end("fill")
}

fn write_border(writer: &mut XmlWriter<Vec<u8>>, border: &Option<Border>) -> Result<(), HtmlSheetError> {
    writer.start("border", &[])?;
    for side in ["left", "right", "top", "bottom"] {
        match border {
            Some(border) => {
                let style = match border.style {
                    BorderStyle::Thin => "thin",
                };
                writer.start(side, &[("style", style)])?;
                writer.empty("color", &[("rgb", &border.color.to_string())])?;
                writer.end(side)?;
            }
            None => writer.empty(side, &[])?,
        }
    }
    writer.empty("diagonal", &[])?;
    writer.end("border")
}
