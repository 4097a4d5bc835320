//! # Document Capability Module
//!
//! The transcoding pipeline never touches a concrete DOM. It depends on the
//! small read-only capability set described by [`HtmlNode`]: tag name,
//! attribute lookup, parent and ordered children. Two implementations exist:
//!
//! - [`document::DomNode`]: adapter over a parsed `scraper` document
//! - [`memory::MemoryNode`]: arena-backed in-memory tree, handy for fixtures
//!
//! Style lookup is a separate capability, see [`css::StyleResolver`].
use std::fmt::Debug;
use std::hash::Hash;

pub mod css;
pub mod document;
pub mod memory;

/// Tag names the pipeline dispatches on.
pub(crate) const TAG_TABLE: &str = "table";
pub(crate) const TAG_ROW: &str = "tr";
pub(crate) const TAG_HEADER_CELL: &str = "th";
pub(crate) const TAG_DATA_CELL: &str = "td";
pub(crate) const TAG_IMAGE: &str = "img";
pub(crate) const TAG_ORDERED_LIST: &str = "ol";
pub(crate) const TAG_UNORDERED_LIST: &str = "ul";
pub(crate) const TAG_LIST_ITEM: &str = "li";

/// Table sections that may wrap rows.
const TABLE_SECTIONS: [&str; 3] = ["thead", "tbody", "tfoot"];

/// One child of an element: either a nested element or a run of text.
#[derive(Clone, Debug)]
pub enum NodeChild<N> {
    Element(N),
    Text(String),
}

/// Read-only view of an element in an HTML-like tree.
pub trait HtmlNode: Clone + Sized {
    /// Stable identity of the node inside its document
    type Id: Copy + Eq + Hash + Debug;

    /// Returns the identity of this node.
    fn id(&self) -> Self::Id;

    /// Returns the lowercase tag name.
    fn tag(&self) -> &str;

    /// Looks up an attribute by name.
    fn attr(&self, name: &str) -> Option<&str>;

    /// Returns the parent element, if any.
    fn parent(&self) -> Option<Self>;

    /// Returns element and text children in document order.
    fn children(&self) -> Vec<NodeChild<Self>>;

    /// Returns only the element children.
    fn element_children(&self) -> Vec<Self> {
        self.children()
            .into_iter()
            .filter_map(|child| match child {
                NodeChild::Element(element) => Some(element),
                NodeChild::Text(_) => None,
            })
            .collect()
    }

    /// Concatenated text of all descendant text nodes, like DOM `textContent`.
    fn text_content(&self) -> String {
        let mut text = String::new();
        push_text_content(self, &mut text);
        text
    }

    /// All descendant elements in pre-order, excluding the node itself.
    fn descendants(&self) -> Vec<Self> {
        let mut nodes = Vec::new();
        collect_descendants(self, &mut nodes);
        nodes
    }

    /// Returns the first descendant element (pre-order) matching the predicate.
    fn find_descendant<P>(&self, predicate: P) -> Option<Self>
    where
        P: Fn(&Self) -> bool,
    {
        find_descendant(self, &predicate)
    }

    /// Checks whether any descendant element has one of the given tags.
    fn has_descendant_tag(&self, tags: &[&str]) -> bool {
        self.find_descendant(|node| tags.contains(&node.tag())).is_some()
    }

    /// Checks whether this element is a header cell.
    fn is_header_cell(&self) -> bool {
        self.tag() == TAG_HEADER_CELL
    }

    /// Checks whether this element is a table cell.
    fn is_cell(&self) -> bool {
        matches!(self.tag(), TAG_HEADER_CELL | TAG_DATA_CELL)
    }

    /// Checks whether this table lives inside another table.
    ///
    /// Walks the ancestor chain; any enclosing `table` (directly or through a
    /// cell) makes the table nested.
    fn is_nested_table(&self) -> bool {
        let mut parent = self.parent();
        while let Some(node) = parent {
            if node.tag() == TAG_TABLE {
                return true;
            }
            parent = node.parent();
        }
        false
    }

    /// Returns the rows of a table element, without descending into nested tables.
    fn table_rows(&self) -> Vec<Self> {
        let mut rows = Vec::new();
        for child in self.element_children() {
            if child.tag() == TAG_ROW {
                rows.push(child);
            } else if TABLE_SECTIONS.contains(&child.tag()) {
                rows.extend(child.element_children().into_iter().filter(|row| row.tag() == TAG_ROW));
            }
        }
        rows
    }

    /// Returns the `td`/`th` children of a row element.
    fn row_cells(&self) -> Vec<Self> {
        self.element_children()
            .into_iter()
            .filter(|cell| cell.is_cell())
            .collect()
    }
}

fn push_text_content<N: HtmlNode>(node: &N, text: &mut String) {
    for child in node.children() {
        match child {
            NodeChild::Element(element) => push_text_content(&element, text),
            NodeChild::Text(value) => text.push_str(&value),
        }
    }
}

fn collect_descendants<N: HtmlNode>(node: &N, nodes: &mut Vec<N>) {
    for child in node.element_children() {
        nodes.push(child.clone());
        collect_descendants(&child, nodes);
    }
}

fn find_descendant<N, P>(node: &N, predicate: &P) -> Option<N>
where
    N: HtmlNode,
    P: Fn(&N) -> bool,
{
    for child in node.element_children() {
        if predicate(&child) {
            return Some(child);
        }
        if let Some(found) = find_descendant(&child, predicate) {
            return Some(found);
        }
    }
    None
}
