//! # HTML Table to Spreadsheet Export
//!
//! Turns the tables of an HTML document (rich-text editor output, saved web
//! pages) into a spreadsheet workbook, preserving what a reader sees: merged
//! cells, fonts, colors, alignment, borders and sensible column widths.
//!
//! ## Pipeline
//!
//! - **Grid resolution**: `rowspan`/`colspan` become absolute coordinates and
//!   merge ranges, with malformed spans clipped or shrunk
//! - **Style extraction**: computed and inline CSS become a [`StyleRecord`]
//!   with spreadsheet-native colors and font sizes
//! - **Content normalization**: nested tables, lists and images become text
//! - **Dimension estimation**: CJK-aware column widths and row heights
//! - **Serialization**: one worksheet per top-level table, written as `.xlsx`
//!
//! ## Example
//!
//! ```no_run
//! use html_sheet::export_html;
//! use html_sheet::ExportOptions;
//!
//! let html = "<table><tr><th>Name</th><th>Score</th></tr><tr><td>Ada</td><td>95</td></tr></table>";
//! let bytes = export_html(html, &ExportOptions::default()).unwrap();
//! std::fs::write("scores.xlsx", bytes).unwrap();
//! ```
//!
//! Documents other than the bundled `scraper` adapter can be exported by
//! implementing [`HtmlNode`] and [`StyleResolver`] and calling
//! [`build_workbook`] directly.
mod error;
mod helpers;
pub mod html;
pub mod spreadsheet;
pub mod writer;

pub use crate::error::HtmlSheetError;
pub use crate::html::css::CssStyleResolver;
pub use crate::html::css::InlineStyle;
pub use crate::html::css::StyleError;
pub use crate::html::css::StyleResolver;
pub use crate::html::document::DomNode;
pub use crate::html::document::HtmlDocument;
pub use crate::html::memory::MemoryDocument;
pub use crate::html::HtmlNode;
pub use crate::html::NodeChild;
pub use crate::spreadsheet::color::to_spreadsheet_color;
pub use crate::spreadsheet::color::ArgbColor;
pub use crate::spreadsheet::grid::Cell;
pub use crate::spreadsheet::grid::MergeRange;
pub use crate::spreadsheet::grid::TableGrid;
pub use crate::spreadsheet::options::DimensionOptions;
pub use crate::spreadsheet::options::ExportOptions;
pub use crate::spreadsheet::style::StyleRecord;
pub use crate::spreadsheet::workbook::build_workbook;
pub use crate::spreadsheet::workbook::Diagnostic;
pub use crate::spreadsheet::workbook::DiagnosticKind;
pub use crate::spreadsheet::workbook::Sheet;
pub use crate::spreadsheet::workbook::WorkbookModel;
pub use crate::spreadsheet::SpreadsheetError;
pub use crate::writer::xlsx::XlsxWriter;
pub use crate::writer::WorkbookWriter;
pub use crate::writer::WriterError;

/// Exports every top-level table of an HTML document to `.xlsx` bytes.
///
/// # Errors
///
/// Returns [`SpreadsheetError::NoTablesFound`] when the document has no
/// exportable table, or a writer error when serialization fails. Problems
/// local to one cell never fail the export; they are recorded as
/// [`Diagnostic`]s and logged.
pub fn export_html(html: &str, options: &ExportOptions) -> Result<Vec<u8>, HtmlSheetError> {
    export_html_with(html, options, &XlsxWriter::default())
}

/// Same as [`export_html`], serializing with the given writer.
pub fn export_html_with(
    html: &str,
    options: &ExportOptions,
    writer: &dyn WorkbookWriter,
) -> Result<Vec<u8>, HtmlSheetError> {
    let document = HtmlDocument::parse(html);
    let resolver = CssStyleResolver::new();
    let workbook = build_workbook(&document.tables(), &resolver, options)?;
    writer.write(&workbook)
}
