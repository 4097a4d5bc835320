//! Span resolution: HTML rows and cells to an absolute rectangular grid.

use crate::html::HtmlNode;
use crate::spreadsheet::content::EMPTY_CELL_CONTENT;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::style::StyleRecord;
use tracing::debug;

/// Largest `colspan` honored, as in HTML.
pub const MAX_COLSPAN: usize = 1000;

/// Largest `rowspan` honored, as in HTML.
pub const MAX_ROWSPAN: usize = 65534;

/// One logical table cell, the anchor of a possible merge.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    /// Row index (0-based)
    pub row: usize,
    /// Column index (0-based)
    pub col: usize,
    pub row_span: usize,
    pub col_span: usize,
    pub is_header: bool,
    pub raw_content: String,
    pub style: StyleRecord,
}

impl Cell {
    /// Empty bordered cell used to pad ragged rows.
    pub fn placeholder(row: usize, col: usize) -> Self {
        Cell {
            row,
            col,
            row_span: 1,
            col_span: 1,
            is_header: false,
            raw_content: EMPTY_CELL_CONTENT.to_owned(),
            style: StyleRecord::border_only(),
        }
    }

    /// Returns the A1-style reference of the anchor.
    pub fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    pub fn is_merged(&self) -> bool {
        self.row_span > 1 || self.col_span > 1
    }

    /// Returns the rectangle covered by this cell.
    pub fn range(&self) -> MergeRange {
        MergeRange {
            start_row: self.row,
            start_col: self.col,
            end_row: self.row + self.row_span - 1,
            end_col: self.col + self.col_span - 1,
        }
    }
}

/// Inclusive rectangle rendered as one visual cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MergeRange {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

impl MergeRange {
    /// Returns the range as `A1:B2`.
    pub fn reference(&self) -> String {
        format!(
            "{}:{}",
            index_to_reference(self.start_row, self.start_col),
            index_to_reference(self.end_row, self.end_col)
        )
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.start_row..=self.end_row).contains(&row) && (self.start_col..=self.end_col).contains(&col)
    }
}

/// Content and style produced for one source cell.
#[derive(Clone, Debug, Default)]
pub struct CellData {
    pub content: String,
    pub style: StyleRecord,
}

/// A table after span resolution. Every coordinate of the rectangle is either
/// the anchor of exactly one [`Cell`] (`Some`) or consumed by a merge (`None`).
#[derive(Clone, Debug, Default)]
pub struct TableGrid {
    rows: Vec<Vec<Option<Cell>>>,
    merges: Vec<MergeRange>,
}

impl TableGrid {
    pub fn rows(&self) -> &[Vec<Option<Cell>>] {
        &self.rows
    }

    pub fn merges(&self) -> &[MergeRange] {
        &self.merges
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Returns the cell anchored at a coordinate.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row)?.get(col)?.as_ref()
    }

    /// All anchored cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.rows.iter().flatten().flatten()
    }

    /// Returns the cell whose rectangle covers a coordinate.
    pub fn covering_cell(&self, row: usize, col: usize) -> Option<&Cell> {
        if let Some(cell) = self.cell(row, col) {
            return Some(cell);
        }
        let merge = self.merges.iter().find(|merge| merge.contains(row, col))?;
        self.cell(merge.start_row, merge.start_col)
    }
}

/// Coordinates claimed so far, one growable bit row per table row.
struct Occupancy {
    rows: Vec<Vec<bool>>,
}

impl Occupancy {
    fn new(row_count: usize) -> Self {
        Occupancy { rows: vec![Vec::new(); row_count] }
    }

    fn is_claimed(&self, row: usize, col: usize) -> bool {
        self.rows[row].get(col).copied().unwrap_or(false)
    }

    fn claim(&mut self, row: usize, col: usize) {
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, false);
        }
        cells[col] = true;
    }

    fn width(&self) -> usize {
        self.rows
            .iter()
            .map(|cells| cells.iter().rposition(|claimed| *claimed).map_or(0, |last| last + 1))
            .max()
            .unwrap_or(0)
    }
}

/// Reads a span attribute; missing, non-numeric or non-positive values are 1.
pub fn read_span<N: HtmlNode>(cell: &N, name: &str, max: usize) -> usize {
    let Some(value) = cell.attr(name) else {
        return 1;
    };
    let value = value.trim();
    let digits = value
        .char_indices()
        .find(|(_, character)| !character.is_ascii_digit())
        .map_or(value, |(index, _)| &value[..index]);
    match digits.parse::<usize>() {
        Ok(span) if span > 0 => span.min(max),
        _ => 1,
    }
}

/// Resolves the rows of a table into a [`TableGrid`].
///
/// `process` is called once per source cell with its anchor row and column
/// and returns the cell's content and style. Rows of nested tables are never
/// visited.
pub fn resolve_grid<N, F>(table: &N, mut process: F) -> TableGrid
where
    N: HtmlNode,
    F: FnMut(&N, usize, usize) -> CellData,
{
    let rows = table.table_rows();
    let row_count = rows.len();
    let mut occupancy = Occupancy::new(row_count);
    let mut grid: Vec<Vec<Option<Cell>>> = vec![Vec::new(); row_count];
    let mut merges = Vec::new();

    for (row, source_row) in rows.iter().enumerate() {
        let mut col = 0;
        for source in source_row.row_cells() {
            while occupancy.is_claimed(row, col) {
                col += 1;
            }

            let mut col_span = read_span(&source, "colspan", MAX_COLSPAN);
            let mut row_span = read_span(&source, "rowspan", MAX_ROWSPAN);
            if row + row_span > row_count {
                debug!("rowspan {} at {} clipped to the last row", row_span, index_to_reference(row, col));
                row_span = row_count - row;
            }
            if let Some(blocked) = (col + 1..col + col_span).find(|next| occupancy.is_claimed(row, *next)) {
                debug!("colspan {} at {} shrunk to {}", col_span, index_to_reference(row, col), blocked - col);
                col_span = blocked - col;
            }
            if let Some(blocked) = (row + 1..row + row_span)
                .find(|below| (col..col + col_span).any(|next| occupancy.is_claimed(*below, next)))
            {
                debug!("rowspan {} at {} shrunk to {}", row_span, index_to_reference(row, col), blocked - row);
                row_span = blocked - row;
            }

            for claimed_row in row..row + row_span {
                for claimed_col in col..col + col_span {
                    occupancy.claim(claimed_row, claimed_col);
                }
            }

            let CellData { content, style } = process(&source, row, col);
            let cell = Cell {
                row,
                col,
                row_span,
                col_span,
                is_header: source.is_header_cell(),
                raw_content: content,
                style,
            };
            if cell.is_merged() {
                merges.push(cell.range());
            }
            place(&mut grid[row], cell);
            col += col_span;
        }
    }

    let width = occupancy.width();
    for (row, cells) in grid.iter_mut().enumerate() {
        cells.resize(width, None);
        let mut padded = 0;
        for col in 0..width {
            if !occupancy.is_claimed(row, col) {
                cells[col] = Some(Cell::placeholder(row, col));
                padded += 1;
            }
        }
        if padded > 0 {
            debug!("row {} padded with {} placeholder cells", row + 1, padded);
        }
    }

    TableGrid { rows: grid, merges }
}

fn place(cells: &mut Vec<Option<Cell>>, cell: Cell) {
    let col = cell.col;
    if cells.len() <= col {
        cells.resize(col + 1, None);
    }
    cells[col] = Some(cell);
}
