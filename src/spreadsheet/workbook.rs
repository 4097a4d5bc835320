//! Workbook assembly: one sheet per top-level table.

use crate::error::HtmlSheetError;
use crate::html::css::StyleResolver;
use crate::html::HtmlNode;
use crate::spreadsheet::content::extract_content;
use crate::spreadsheet::content::plain_content;
use crate::spreadsheet::dimension::column_width_hints;
use crate::spreadsheet::dimension::estimate_column_widths;
use crate::spreadsheet::dimension::estimate_row_heights;
use crate::spreadsheet::grid::resolve_grid;
use crate::spreadsheet::grid::CellData;
use crate::spreadsheet::grid::MergeRange;
use crate::spreadsheet::grid::TableGrid;
use crate::spreadsheet::options::ExportOptions;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::style::extract_style;
use crate::spreadsheet::style::StyleRecord;
use crate::spreadsheet::SpreadsheetError;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// Longest sheet name a spreadsheet accepts.
const MAX_SHEET_NAME_LENGTH: usize = 31;

/// Characters not allowed in sheet names.
const INVALID_SHEET_NAME_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Style probing failed; the cell got a border-only style.
    CellStyle,
    /// Content normalization failed; the cell got its plain text.
    CellContent,
}

/// Non-fatal problem met while processing one cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub row: usize,
    pub col: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }
}

/// One worksheet built from one table.
#[derive(Clone, Debug)]
pub struct Sheet {
    pub name: String,
    pub grid: TableGrid,
    pub column_widths: Vec<f64>,
    pub row_heights: Vec<f64>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Sheet {
    pub fn merges(&self) -> &[MergeRange] {
        self.grid.merges()
    }
}

/// The workbook handed to a [`crate::writer::WorkbookWriter`].
#[derive(Clone, Debug, Default)]
pub struct WorkbookModel {
    pub sheets: Vec<Sheet>,
}

/// Keeps hidden elements revealed while alive and conceals them again on drop.
struct RevealGuard<'a, N: HtmlNode, R: StyleResolver<N> + ?Sized> {
    resolver: &'a R,
    revealed: Vec<N>,
}

impl<'a, N: HtmlNode, R: StyleResolver<N> + ?Sized> RevealGuard<'a, N, R> {
    /// Reveals the table and each ancestor that is `display: none`.
    fn reveal(table: &N, resolver: &'a R) -> Self {
        let mut guard = RevealGuard { resolver, revealed: Vec::new() };
        for node in hidden_elements(table, resolver) {
            if resolver.reveal(&node) {
                debug!("<{}> temporarily revealed", node.tag());
                guard.revealed.push(node);
            }
        }
        guard
    }
}

impl<'a, N: HtmlNode, R: StyleResolver<N> + ?Sized> Drop for RevealGuard<'a, N, R> {
    fn drop(&mut self) {
        for node in self.revealed.iter().rev() {
            self.resolver.conceal(node);
        }
    }
}

/// The table and its ancestors whose computed `display` is `none`.
fn hidden_elements<N, R>(table: &N, resolver: &R) -> Vec<N>
where
    N: HtmlNode,
    R: StyleResolver<N> + ?Sized,
{
    let mut hidden = Vec::new();
    let mut current = Some(table.clone());
    while let Some(node) = current {
        match resolver.computed(&node, "display") {
            Ok(Some(display)) if display.trim().eq_ignore_ascii_case("none") => hidden.push(node.clone()),
            Ok(_) => (),
            Err(error) => warn!("visibility of <{}> unknown, treated as visible: {}", node.tag(), error),
        }
        current = node.parent();
    }
    hidden
}

/// Builds the name of the `index`-th sheet (1-based).
pub fn sheet_name(prefix: &str, index: usize) -> Result<String, SpreadsheetError> {
    let cleaned: String = prefix
        .chars()
        .filter(|character| !INVALID_SHEET_NAME_CHARS.contains(character))
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'');
    if cleaned.is_empty() {
        return Err(SpreadsheetError::InvalidSheetName { name: prefix.to_owned() });
    }
    let suffix = format!(" {index}");
    let room = MAX_SHEET_NAME_LENGTH.saturating_sub(suffix.chars().count());
    let truncated: String = cleaned.chars().take(room).collect();
    Ok(format!("{}{}", truncated.trim_end(), suffix))
}

/// Assembles a workbook from candidate tables in document order.
///
/// Nested tables are skipped (their parent cell absorbs them as text); hidden
/// tables are revealed for the duration of their processing unless the
/// options filter them out. Fails with [`SpreadsheetError::NoTablesFound`]
/// when nothing survives.
pub fn build_workbook<N, R>(tables: &[N], resolver: &R, options: &ExportOptions) -> Result<WorkbookModel, HtmlSheetError>
where
    N: HtmlNode,
    R: StyleResolver<N> + ?Sized,
{
    let mut sheets = Vec::new();
    for table in tables {
        if table.is_nested_table() {
            debug!("nested table skipped, flattened into its parent cell");
            continue;
        }
        if !options.include_hidden_tables && !hidden_elements(table, resolver).is_empty() {
            debug!("hidden table skipped");
            continue;
        }

        let name = sheet_name(&options.sheet_name_prefix, sheets.len() + 1)?;
        let _guard = RevealGuard::reveal(table, resolver);
        sheets.push(build_sheet(table, resolver, options, name));
    }

    if sheets.is_empty() {
        return Err(SpreadsheetError::NoTablesFound.into());
    }
    info!("assembled workbook with {} sheets", sheets.len());
    Ok(WorkbookModel { sheets })
}

fn build_sheet<N, R>(table: &N, resolver: &R, options: &ExportOptions, name: String) -> Sheet
where
    N: HtmlNode,
    R: StyleResolver<N> + ?Sized,
{
    let mut diagnostics = Vec::new();
    let grid = resolve_grid(table, |cell, row, col| {
        let mut report = |kind: DiagnosticKind, message: String| {
            warn!("{} {}: {:?} failed: {}", name, index_to_reference(row, col), kind, message);
            diagnostics.push(Diagnostic { kind, row, col, message });
        };
        let style = match extract_style(cell, resolver) {
            Ok(style) => style,
            Err(error) => {
                report(DiagnosticKind::CellStyle, error.to_string());
                StyleRecord::border_only()
            }
        };
        let content = match extract_content(cell, options.convert_star_ratings) {
            Ok(content) => content,
            Err(error) => {
                report(DiagnosticKind::CellContent, error.to_string());
                plain_content(cell)
            }
        };
        CellData { content, style }
    });

    let hints = column_width_hints(table);
    let column_widths = estimate_column_widths(&grid, &hints, &options.dimensions);
    let row_heights = estimate_row_heights(&grid, &options.dimensions);
    debug!("{}: {} rows, {} columns, {} merges", name, grid.row_count(), grid.column_count(), grid.merges().len());

    Sheet { name, grid, column_widths, row_heights, diagnostics }
}
