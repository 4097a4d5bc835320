//! Column width and row height estimation.

use crate::helpers::string::line_count;
use crate::helpers::string::longest_line_width;
use crate::helpers::string::split_number_unit;
use crate::helpers::string::DEFAULT_CHAR_WIDTH;
use crate::html::css::InlineStyle;
use crate::html::HtmlNode;
use crate::spreadsheet::grid::read_span;
use crate::spreadsheet::grid::TableGrid;
use crate::spreadsheet::grid::MAX_COLSPAN;
use crate::spreadsheet::options::DimensionOptions;

/// Width units per percent of a percentage width hint.
const PERCENT_WIDTH_FACTOR: f64 = 0.6;

/// Estimates the width of every column of a grid.
///
/// Content is measured with CJK-weighted character widths, multi-line content
/// by its longest line, and merged cells share their width across the columns
/// they span. `hints` act as lower bounds before clamping.
pub fn estimate_column_widths(grid: &TableGrid, hints: &[Option<f64>], options: &DimensionOptions) -> Vec<f64> {
    let mut widths = vec![0.0_f64; grid.column_count()];
    for cell in grid.cells() {
        let share = longest_line_width(&cell.raw_content) / DEFAULT_CHAR_WIDTH / cell.col_span as f64;
        for width in widths.iter_mut().skip(cell.col).take(cell.col_span) {
            *width = width.max(share);
        }
    }

    widths
        .into_iter()
        .enumerate()
        .map(|(col, measured)| {
            let estimate = measured * options.width_scale + options.width_margin;
            let hinted = hints.get(col).copied().flatten().map_or(estimate, |hint| estimate.max(hint));
            hinted.clamp(options.min_column_width, options.max_column_width)
        })
        .collect()
}

/// Estimates the height of every row: one line height per line of the tallest
/// cell anchored in the row, never below the base height.
pub fn estimate_row_heights(grid: &TableGrid, options: &DimensionOptions) -> Vec<f64> {
    grid.rows()
        .iter()
        .map(|row| {
            let lines = row
                .iter()
                .flatten()
                .map(|cell| line_count(&cell.raw_content))
                .max()
                .unwrap_or(1);
            options.base_row_height.max(lines as f64 * options.line_height)
        })
        .collect()
}

/// Reads authored column widths, in width units, from `<col>` elements or,
/// when there are none, from the cells of the first row.
pub fn column_width_hints<N: HtmlNode>(table: &N) -> Vec<Option<f64>> {
    let columns = column_elements(table);
    if !columns.is_empty() {
        return columns
            .iter()
            .flat_map(|column| {
                let span = read_span(column, "span", MAX_COLSPAN);
                std::iter::repeat(element_width(column)).take(span)
            })
            .collect();
    }

    let Some(first_row) = table.table_rows().into_iter().next() else {
        return Vec::new();
    };
    first_row
        .row_cells()
        .iter()
        .flat_map(|cell| {
            let span = read_span(cell, "colspan", MAX_COLSPAN);
            let width = element_width(cell).map(|width| width / span as f64);
            std::iter::repeat(width).take(span)
        })
        .collect()
}

fn column_elements<N: HtmlNode>(table: &N) -> Vec<N> {
    let mut columns = Vec::new();
    for child in table.element_children() {
        match child.tag() {
            "col" => columns.push(child),
            "colgroup" => columns.extend(child.element_children().into_iter().filter(|col| col.tag() == "col")),
            _ => (),
        }
    }
    columns
}

/// Width of an element from its inline style or `width` attribute.
fn element_width<N: HtmlNode>(node: &N) -> Option<f64> {
    let style = InlineStyle::of(node);
    let width = style.get("width").or_else(|| node.attr("width"))?;
    parse_width(width)
}

/// `px` (or unitless) widths are divided by the character width; percentages use a fixed factor.
fn parse_width(value: &str) -> Option<f64> {
    let (number, unit) = split_number_unit(value)?;
    let width = match unit.as_str() {
        "" | "px" => number / DEFAULT_CHAR_WIDTH,
        "%" => number * PERCENT_WIDTH_FACTOR,
        _ => return None,
    };
    (width > 0.0).then_some(width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::memory::MemoryDocument;
    use crate::spreadsheet::grid::resolve_grid;
    use crate::spreadsheet::grid::CellData;
    use crate::spreadsheet::style::StyleRecord;

    /// Single-row grid from `(text, colspan)` cells plus extra rows.
    fn grid(rows: &[&[(&str, usize)]]) -> TableGrid {
        let mut document = MemoryDocument::new();
        let table = document.element(None, "table");
        for cells in rows {
            let row = document.element(Some(table), "tr");
            for (text, col_span) in *cells {
                let cell = document.element(Some(row), "td");
                document.text(cell, text);
                document.set_attribute(cell, "colspan", &col_span.to_string());
            }
        }
        resolve_grid(&document.node(table), |cell, _, _| CellData {
            content: cell.text_content(),
            style: StyleRecord::border_only(),
        })
    }

    #[test]
    fn widths_are_weighted_and_clamped() {
        let options = DimensionOptions::default();
        let long = "x".repeat(200);
        let grid = grid(&[&[("a", 1), ("中文中文中文中文中文中文中文中文中文中文", 1), (long.as_str(), 1)]]);
        let widths = estimate_column_widths(&grid, &[], &options);

        assert_eq!(widths[0], 10.0);
        let cjk = 20.0 * 12.0 / 7.0 * 1.2 + 2.0;
        assert!((widths[1] - cjk).abs() < 1e-9);
        assert_eq!(widths[2], 50.0);
    }

    #[test]
    fn longest_line_and_merged_share() {
        let options = DimensionOptions::default();
        let long = "x".repeat(28);
        let lines = format!("ab\n{long}\nc");
        let grid = grid(&[&[(lines.as_str(), 1)], &[(long.as_str(), 2)], &[("", 1), ("", 1)]]);
        let widths = estimate_column_widths(&grid, &[], &options);

        let single = 28.0 * 1.2 + 2.0;
        assert!((widths[0] - single).abs() < 1e-9);
        let shared = 14.0 * 1.2 + 2.0;
        assert!((widths[1] - shared).abs() < 1e-9);
    }

    #[test]
    fn hints_are_lower_bounds() {
        let options = DimensionOptions::default();
        let grid = grid(&[&[("a", 1), ("a", 1), ("a", 1)]]);
        let widths = estimate_column_widths(&grid, &[Some(20.0), None, Some(80.0)], &options);
        assert_eq!(widths, vec![20.0, 10.0, 50.0]);
    }

    #[test]
    fn row_heights_follow_line_count() {
        let options = DimensionOptions::default();
        let grid = grid(&[&[("one", 1), ("a\nb\nc", 1)], &[("", 1)]]);
        assert_eq!(estimate_row_heights(&grid, &options), vec![54.0, 18.0]);
    }

    #[test]
    fn width_hints_from_cols_or_first_row() {
        let mut document = MemoryDocument::new();
        let table = document.element(None, "table");
        let group = document.element(Some(table), "colgroup");
        let first = document.element(Some(group), "col");
        document.set_attribute(first, "style", "width: 140px");
        let second = document.element(Some(group), "col");
        document.set_attribute(second, "span", "2");
        document.set_attribute(second, "width", "50%");
        assert_eq!(column_width_hints(&document.node(table)), vec![Some(20.0), Some(30.0), Some(30.0)]);

        let mut document = MemoryDocument::new();
        let table = document.element(None, "table");
        let row = document.element(Some(table), "tr");
        let wide = document.element(Some(row), "th");
        document.set_attribute(wide, "colspan", "2");
        document.set_attribute(wide, "width", "280");
        document.element(Some(row), "th");
        assert_eq!(column_width_hints(&document.node(table)), vec![Some(20.0), Some(20.0), None]);
    }
}
