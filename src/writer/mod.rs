//! # Workbook Writers
//!
//! Serializers turning a [`WorkbookModel`] into the bytes of a spreadsheet
//! file. [`xlsx::XlsxWriter`] produces Office Open XML (`.xlsx`) packages.
use crate::error::HtmlSheetError;
use crate::spreadsheet::workbook::WorkbookModel;
use thiserror::Error;

pub(crate) mod styles;
pub mod xlsx;

/// SpreadsheetML main namespace.
pub(crate) const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// Office document relationships namespace.
pub(crate) const NS_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Rows allowed in one worksheet.
pub const MAX_ROWS: usize = 1_048_576;

/// Columns allowed in one worksheet.
pub const MAX_COLUMNS: usize = 16_384;

#[derive(Error, Debug)]
pub enum WriterError {
    #[error("Workbook has no sheets to write")]
    EmptyWorkbook,

    #[error("Sheet '{name}' has {rows} rows and {columns} columns, more than a worksheet holds")]
    SheetTooLarge { name: String, rows: usize, columns: usize },
}

/// Serializes a workbook into a spreadsheet file format.
pub trait WorkbookWriter {
    /// File extension of the produced format, without the dot.
    fn extension(&self) -> &'static str;

    /// MIME type of the produced format.
    fn mime_type(&self) -> &'static str;

    /// Writes the whole workbook into an in-memory file.
    fn write(&self, workbook: &WorkbookModel) -> Result<Vec<u8>, HtmlSheetError>;
}
