//! In-memory HTML-like tree stored as an arena of nodes addressed by index.
//! Used to build synthetic tables without a parser or a rendering engine.

use crate::html::HtmlNode;
use crate::html::NodeChild;

/// Index of a node inside a [`MemoryDocument`].
pub type NodeIndex = usize;

#[derive(Clone, Debug)]
enum Content {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        children: Vec<NodeIndex>,
    },
    Text(String),
}

#[derive(Clone, Debug)]
struct NodeData {
    parent: Option<NodeIndex>,
    content: Content,
}

/// Arena holding every node of an in-memory document.
#[derive(Clone, Debug, Default)]
pub struct MemoryDocument {
    nodes: Vec<NodeData>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an element (tag is lowercased) and returns its index.
    pub fn element(&mut self, parent: Option<NodeIndex>, tag: &str) -> NodeIndex {
        self.push(parent, Content::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            children: Vec::new(),
        })
    }

    /// Appends a text run to an element.
    pub fn text(&mut self, parent: NodeIndex, text: &str) -> NodeIndex {
        self.push(Some(parent), Content::Text(text.to_owned()))
    }

    /// Sets (or replaces) an attribute on an element.
    pub fn set_attribute(&mut self, index: NodeIndex, name: &str, value: &str) {
        if let Some(NodeData { content: Content::Element { attributes, .. }, .. }) = self.nodes.get_mut(index) {
            match attributes.iter_mut().find(|(key, _)| key == name) {
                Some((_, existing)) => *existing = value.to_owned(),
                None => attributes.push((name.to_owned(), value.to_owned())),
            }
        }
    }

    /// Returns a node handle for an element index.
    pub fn node(&self, index: NodeIndex) -> MemoryNode<'_> {
        MemoryNode { document: self, index }
    }

    /// All elements with the given tag in document order.
    pub fn elements_by_tag(&self, tag: &str) -> Vec<MemoryNode<'_>> {
        let mut found = Vec::new();
        for root in self.roots() {
            let root = self.node(root);
            if root.tag() == tag {
                found.push(root.clone());
            }
            found.extend(root.descendants().into_iter().filter(|node| node.tag() == tag));
        }
        found
    }

    fn roots(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, data)| data.parent.is_none() && matches!(data.content, Content::Element { .. }))
            .map(|(index, _)| index)
    }

    fn push(&mut self, parent: Option<NodeIndex>, content: Content) -> NodeIndex {
        let index = self.nodes.len();
        self.nodes.push(NodeData { parent, content });
        if let Some(NodeData { content: Content::Element { children, .. }, .. }) =
            parent.and_then(|parent| self.nodes.get_mut(parent))
        {
            children.push(index);
        }
        index
    }
}

/// Borrowed handle to an element of a [`MemoryDocument`].
#[derive(Clone, Copy, Debug)]
pub struct MemoryNode<'a> {
    document: &'a MemoryDocument,
    index: NodeIndex,
}

impl<'a> MemoryNode<'a> {
    fn data(&self) -> &'a NodeData {
        &self.document.nodes[self.index]
    }
}

impl<'a> HtmlNode for MemoryNode<'a> {
    type Id = NodeIndex;

    fn id(&self) -> NodeIndex {
        self.index
    }

    fn tag(&self) -> &str {
        match &self.data().content {
            Content::Element { tag, .. } => tag,
            Content::Text(_) => "",
        }
    }

    fn attr(&self, name: &str) -> Option<&str> {
        match &self.data().content {
            Content::Element { attributes, .. } => attributes
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str()),
            Content::Text(_) => None,
        }
    }

    fn parent(&self) -> Option<Self> {
        self.data().parent.map(|index| self.document.node(index))
    }

    fn children(&self) -> Vec<NodeChild<Self>> {
        match &self.data().content {
            Content::Element { children, .. } => children
                .iter()
                .map(|index| match &self.document.nodes[*index].content {
                    Content::Element { .. } => NodeChild::Element(self.document.node(*index)),
                    Content::Text(text) => NodeChild::Text(text.to_owned()),
                })
                .collect(),
            Content::Text(_) => Vec::new(),
        }
    }
}
