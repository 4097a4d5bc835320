//! Adapter exposing a parsed `scraper` document through [`HtmlNode`].

use crate::html::HtmlNode;
use crate::html::NodeChild;
use ego_tree::NodeId;
use scraper::ElementRef;
use scraper::Html;
use scraper::Node;
use scraper::Selector;
use std::sync::LazyLock;

static TABLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("table").expect("BUG: hardcoded selector 'table' is statically valid")
});

/// Parsed HTML document (editor output, a saved page, a fragment).
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    /// Parses a complete HTML document.
    pub fn parse(markup: &str) -> Self {
        Self { html: Html::parse_document(markup) }
    }

    /// Parses an HTML fragment such as the inner HTML of an editor.
    pub fn parse_fragment(markup: &str) -> Self {
        Self { html: Html::parse_fragment(markup) }
    }

    /// All `table` elements in document order, nested ones included.
    pub fn tables(&self) -> Vec<DomNode<'_>> {
        self.html.select(&TABLE_SELECTOR).map(DomNode).collect()
    }
}

/// Element of an [`HtmlDocument`].
#[derive(Clone, Copy, Debug)]
pub struct DomNode<'a>(ElementRef<'a>);

impl<'a> HtmlNode for DomNode<'a> {
    type Id = NodeId;

    fn id(&self) -> NodeId {
        self.0.id()
    }

    fn tag(&self) -> &str {
        self.0.value().name()
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.0.value().attr(name)
    }

    fn parent(&self) -> Option<Self> {
        self.0.parent().and_then(ElementRef::wrap).map(DomNode)
    }

    fn children(&self) -> Vec<NodeChild<Self>> {
        self.0
            .children()
            .filter_map(|child| match child.value() {
                Node::Element(_) => ElementRef::wrap(child).map(|element| NodeChild::Element(DomNode(element))),
                Node::Text(text) => Some(NodeChild::Text(text.to_string())),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_through_implicit_tbody() {
        let document = HtmlDocument::parse_fragment(
            "<table><tr><th>A</th><td colspan='2'>B</td></tr><tr><td>C</td></tr></table>",
        );
        let tables = document.tables();
        assert_eq!(tables.len(), 1);

        let rows = tables[0].table_rows();
        assert_eq!(rows.len(), 2);
        let cells = rows[0].row_cells();
        assert_eq!(cells.len(), 2);
        assert!(cells[0].is_header_cell());
        assert_eq!(cells[1].attr("colspan"), Some("2"));
        assert_eq!(cells[1].text_content(), "B");
    }

    #[test]
    fn nested_tables_are_listed_and_detected() {
        let document = HtmlDocument::parse(
            "<table><tr><td><table><tr><td>X</td></tr></table></td></tr></table><table><tr><td>Y</td></tr></table>",
        );
        let tables = document.tables();
        assert_eq!(tables.len(), 3);
        let nested: Vec<bool> = tables.iter().map(|table| table.is_nested_table()).collect();
        assert_eq!(nested, vec![false, true, false]);
    }
}
