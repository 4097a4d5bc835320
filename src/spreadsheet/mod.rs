//! # Spreadsheet Model Module
//!
//! This module turns HTML tables into the abstract workbook model consumed by
//! the writers. The pipeline per table is:
//!
//! 1. [`grid`]: resolve `rowspan`/`colspan` into absolute coordinates
//! 2. [`style`] (with [`color`]): derive a [`style::StyleRecord`] per cell
//! 3. [`content`]: normalize the cell text (nested tables, lists, images)
//! 4. [`dimension`]: estimate column widths and row heights
//! 5. [`workbook`]: assemble sheets, one per top-level table
use thiserror::Error;

pub mod color;
pub mod content;
pub mod dimension;
pub mod grid;
pub mod options;
pub mod reference;
pub mod style;
pub mod workbook;

/// Workbook-level errors.
///
/// Failures local to one cell never surface here; they are recorded as
/// [`workbook::Diagnostic`]s on the sheet instead.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    /// No top-level table is left after filtering nested (and hidden) tables
    #[error("No tables found to export")]
    NoTablesFound,

    /// The sheet name prefix has no usable characters
    #[error("Invalid sheet name prefix '{name}'")]
    InvalidSheetName { name: String },
}
