//! Textual content of table cells.
//!
//! Checked in order: nested tables (flattened to `a | b` lines), images,
//! lists and line breaks (one line per item or block), plain text. A cell never yields an empty string.

use crate::helpers::string::collapse_whitespace;
use crate::html::HtmlNode;
use crate::html::NodeChild;
use crate::html::TAG_IMAGE;
use crate::html::TAG_LIST_ITEM;
use crate::html::TAG_ORDERED_LIST;
use crate::html::TAG_TABLE;
use crate::html::TAG_UNORDERED_LIST;
use thiserror::Error;

/// Content written for cells without any text, so borders still render.
pub const EMPTY_CELL_CONTENT: &str = " ";

/// Deepest chain of tables-in-cells that is flattened.
pub const MAX_FLATTEN_DEPTH: usize = 32;

const CELL_SEPARATOR: &str = " | ";
const NESTED_LINE_SEPARATOR: &str = "; ";
const LIST_INDENT: &str = "  ";
const BLOCK_TAGS: [&str; 10] = ["p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre"];
const LINE_TAGS: [&str; 4] = [TAG_IMAGE, TAG_ORDERED_LIST, TAG_UNORDERED_LIST, "br"];

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Nested tables deeper than {0} levels")]
    NestingTooDeep(usize),
}

/// Normalizes the content of one cell.
///
/// `convert_star_ratings` turns text made only of `★`/`☆` into `"<filled>/<total> 星"`.
pub fn extract_content<N: HtmlNode>(cell: &N, convert_star_ratings: bool) -> Result<String, ContentError> {
    let nested = nested_tables(cell);
    let content = if !nested.is_empty() {
        nested
            .iter()
            .map(|table| flatten_table(table, 1))
            .collect::<Result<Vec<_>, _>>()?
            .join("\n")
    } else if cell.has_descendant_tag(&LINE_TAGS) || cell.has_descendant_tag(&BLOCK_TAGS) {
        let mut lines = LineBuilder::default();
        lines.walk(cell, 0);
        lines.finish()
    } else {
        collapse_whitespace(&cell.text_content())
    };

    let content = match convert_star_ratings {
        true => star_rating(&content).unwrap_or(content),
        false => content,
    };
    Ok(non_empty(content))
}

/// Plain collapsed text of a cell, used when normalization fails.
pub fn plain_content<N: HtmlNode>(cell: &N) -> String {
    non_empty(collapse_whitespace(&cell.text_content()))
}

/// Placeholder token standing in for an image.
pub fn image_placeholder<N: HtmlNode>(image: &N) -> String {
    match image.attr("alt").map(str::trim).filter(|alt| !alt.is_empty()) {
        Some(alt) => format!("[Image: {alt}]"),
        None => "[Image]".to_owned(),
    }
}

fn non_empty(content: String) -> String {
    if content.trim().is_empty() {
        EMPTY_CELL_CONTENT.to_owned()
    } else {
        content
    }
}

/// Outermost tables inside a cell.
fn nested_tables<N: HtmlNode>(cell: &N) -> Vec<N> {
    let mut tables = Vec::new();
    let mut stack: Vec<N> = cell.element_children().into_iter().rev().collect();
    while let Some(node) = stack.pop() {
        if node.tag() == TAG_TABLE {
            tables.push(node);
        } else {
            stack.extend(node.element_children().into_iter().rev());
        }
    }
    tables
}

/// Renders a table as text: rows joined by newlines, cells by `" | "`.
fn flatten_table<N: HtmlNode>(table: &N, depth: usize) -> Result<String, ContentError> {
    if depth > MAX_FLATTEN_DEPTH {
        return Err(ContentError::NestingTooDeep(MAX_FLATTEN_DEPTH));
    }
    let mut lines = Vec::new();
    for row in table.table_rows() {
        let cells = row
            .row_cells()
            .iter()
            .map(|cell| flatten_cell(cell, depth))
            .collect::<Result<Vec<_>, _>>()?;
        lines.push(cells.join(CELL_SEPARATOR));
    }
    Ok(lines.join("\n"))
}

fn flatten_cell<N: HtmlNode>(cell: &N, depth: usize) -> Result<String, ContentError> {
    let nested = nested_tables(cell);
    if nested.is_empty() {
        return Ok(collapse_whitespace(&cell.text_content()));
    }
    let mut parts = Vec::with_capacity(nested.len());
    for table in &nested {
        // Keep the outer row on one line
        parts.push(flatten_table(table, depth + 1)?.replace('\n', NESTED_LINE_SEPARATOR));
    }
    Ok(parts.join(NESTED_LINE_SEPARATOR))
}

/// `"★★★☆☆"` becomes `"3/5 星"`.
fn star_rating(text: &str) -> Option<String> {
    let stars: Vec<char> = text.chars().filter(|character| !character.is_whitespace()).collect();
    if stars.is_empty() || !stars.iter().all(|star| matches!(star, '★' | '☆')) {
        return None;
    }
    let filled = stars.iter().filter(|star| **star == '★').count();
    Some(format!("{}/{} 星", filled, stars.len()))
}

/// Accumulates lines of formatted content (lists, images, breaks).
#[derive(Default)]
struct LineBuilder {
    lines: Vec<String>,
    current: String,
    prefix: Option<String>,
}

impl LineBuilder {
    fn walk<N: HtmlNode>(&mut self, node: &N, level: usize) {
        for child in node.children() {
            let element = match child {
                NodeChild::Text(text) => {
                    self.current.push_str(&text);
                    continue;
                }
                NodeChild::Element(element) => element,
            };
            match element.tag() {
                TAG_IMAGE => {
                    self.current.push(' ');
                    self.current.push_str(&image_placeholder(&element));
                    self.current.push(' ');
                }
                "br" => self.break_line(),
                TAG_ORDERED_LIST | TAG_UNORDERED_LIST => {
                    self.end_line();
                    self.push_list(&element, level);
                }
                tag if BLOCK_TAGS.contains(&tag) => {
                    self.break_line();
                    self.walk(&element, level);
                    self.break_line();
                }
                _ => self.walk(&element, level),
            }
        }
    }

    fn push_list<N: HtmlNode>(&mut self, list: &N, level: usize) {
        let ordered = list.tag() == TAG_ORDERED_LIST;
        let start = list
            .attr("start")
            .and_then(|start| start.trim().parse::<i64>().ok())
            .unwrap_or(1);
        let indent = LIST_INDENT.repeat(level);
        let items = list.element_children().into_iter().filter(|item| item.tag() == TAG_LIST_ITEM);
        for (index, item) in items.enumerate() {
            let marker = if ordered {
                format!("{}. ", start + index as i64)
            } else {
                "- ".to_owned()
            };
            self.prefix = Some(format!("{indent}{marker}"));
            self.walk(&item, level + 1);
            self.end_line();
        }
    }

    /// Starts a new line. A list marker with no text yet stays pending, so
    /// `<li><p>text</p></li>` still yields one prefixed line.
    fn break_line(&mut self) {
        if self.prefix.is_some() && collapse_whitespace(&self.current).is_empty() {
            self.current.clear();
            return;
        }
        self.end_line();
    }

    /// Emits the current line, including a marker left without text.
    fn end_line(&mut self) {
        let text = collapse_whitespace(&self.current);
        self.current.clear();
        match (self.prefix.take(), text.is_empty()) {
            (Some(prefix), true) => self.lines.push(prefix.trim_end().to_owned()),
            (Some(prefix), false) => self.lines.push(prefix + &text),
            (None, false) => self.lines.push(text),
            (None, true) => (),
        }
    }

    fn finish(mut self) -> String {
        self.end_line();
        self.lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::memory::MemoryDocument;
    use crate::html::memory::NodeIndex;

    fn cell_with_nested_table(document: &mut MemoryDocument, rows: &[&[&str]]) -> NodeIndex {
        let cell = document.element(None, "td");
        let table = document.element(Some(cell), "table");
        let body = document.element(Some(table), "tbody");
        for values in rows {
            let row = document.element(Some(body), "tr");
            for value in *values {
                let inner = document.element(Some(row), "td");
                document.text(inner, value);
            }
        }
        cell
    }

    #[test]
    fn empty_cell_is_a_single_space() {
        let mut document = MemoryDocument::new();
        let cell = document.element(None, "td");
        assert_eq!(extract_content(&document.node(cell), false).unwrap(), " ");

        document.text(cell, " \n\t ");
        assert_eq!(extract_content(&document.node(cell), false).unwrap(), " ");
    }

    #[test]
    fn plain_text_is_collapsed() {
        let mut document = MemoryDocument::new();
        let cell = document.element(None, "td");
        document.text(cell, "  Hello\n ");
        let bold = document.element(Some(cell), "b");
        document.text(bold, "World ");
        assert_eq!(extract_content(&document.node(cell), false).unwrap(), "Hello World");
    }

    #[test]
    fn nested_table_is_flattened() {
        let mut document = MemoryDocument::new();
        let cell = cell_with_nested_table(&mut document, &[&["A", "B"], &[" C ", "D"]]);
        assert_eq!(extract_content(&document.node(cell), false).unwrap(), "A | B\nC | D");
    }

    #[test]
    fn deeply_nested_tables_fail() {
        let mut document = MemoryDocument::new();
        let outer = document.element(None, "td");
        let mut cell = outer;
        for _ in 0..=MAX_FLATTEN_DEPTH {
            let table = document.element(Some(cell), "table");
            let row = document.element(Some(table), "tr");
            cell = document.element(Some(row), "td");
        }
        document.text(cell, "deep");

        let result = extract_content(&document.node(outer), false);
        assert!(matches!(result, Err(ContentError::NestingTooDeep(MAX_FLATTEN_DEPTH))));
        assert_eq!(plain_content(&document.node(outer)), "deep");
    }

    #[test]
    fn lists_become_prefixed_lines() {
        let mut document = MemoryDocument::new();
        let cell = document.element(None, "td");
        document.text(cell, "Steps:");
        let ordered = document.element(Some(cell), "ol");
        for text in ["First", "Second"] {
            let item = document.element(Some(ordered), "li");
            document.text(item, text);
        }
        let item = document.element(Some(ordered), "li");
        document.text(item, "Third");
        let nested = document.element(Some(item), "ul");
        let nested_item = document.element(Some(nested), "li");
        document.text(nested_item, "detail");

        assert_eq!(
            extract_content(&document.node(cell), false).unwrap(),
            "Steps:\n1. First\n2. Second\n3. Third\n  - detail"
        );
    }

    #[test]
    fn lists_with_paragraph_items() {
        let mut document = MemoryDocument::new();
        let cell = document.element(None, "td");
        let ordered = document.element(Some(cell), "ol");
        for text in ["First", "Second"] {
            let item = document.element(Some(ordered), "li");
            let paragraph = document.element(Some(item), "p");
            document.text(paragraph, text);
        }
        let empty = document.element(Some(ordered), "li");
        document.element(Some(empty), "br");

        assert_eq!(extract_content(&document.node(cell), false).unwrap(), "1. First\n2. Second\n3.");
    }

    #[test]
    fn images_become_placeholders() {
        let mut document = MemoryDocument::new();
        let cell = document.element(None, "td");
        let icon = document.element(Some(cell), "img");
        document.set_attribute(icon, "alt", "logo");
        document.element(Some(cell), "img");
        assert_eq!(extract_content(&document.node(cell), false).unwrap(), "[Image: logo] [Image]");
    }

    #[test]
    fn breaks_and_blocks_start_new_lines() {
        let mut document = MemoryDocument::new();
        let cell = document.element(None, "td");
        document.text(cell, "line1");
        document.element(Some(cell), "br");
        document.text(cell, " line2 ");
        let paragraph = document.element(Some(cell), "p");
        document.text(paragraph, "para");
        assert_eq!(extract_content(&document.node(cell), false).unwrap(), "line1\nline2\npara");
    }

    #[test]
    fn star_ratings() {
        let mut document = MemoryDocument::new();
        let cell = document.element(None, "td");
        document.text(cell, " ★★★☆☆ ");
        assert_eq!(extract_content(&document.node(cell), true).unwrap(), "3/5 星");
        assert_eq!(extract_content(&document.node(cell), false).unwrap(), "★★★☆☆");
        assert_eq!(star_rating("Rated ★★"), None);
    }
}
