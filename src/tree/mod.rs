//! Tag tree model and builder.
//!
//! A [`Document`] owns its root [`Node`]s; every node exclusively owns its
//! children. Text runs and line-break markers are leaves in the child
//! sequence, so the interleaving of text and elements follows the markup.
//!
//! ```rust
//! use rs_purifier::selector::Selector;
//! use rs_purifier::tree::{self, TagTable};
//!
//! let doc = tree::parse("<div class=\"body\">Hello</div>", &TagTable::default(), 512);
//! let body = Selector::new(Some("div"), Some("class"), Some("body"))?;
//! assert_eq!(doc.query(&body).len(), 1);
//! # Ok::<(), rs_purifier::Error>(())
//! ```

mod builder;
mod sink;
pub mod tags;

pub use builder::TreeBuilder;
pub use sink::{parse, preprocess};
pub use tags::{TagClass, TagTable};

use crate::selector::Selector;

/// One HTML element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<Child>,
}

/// An entry in a node's child sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    /// Nested element.
    Node(Node),
    /// Raw text run.
    Text(String),
    /// Synthetic newline marker (from `<br>` or a closed block).
    LineBreak,
}

impl Node {
    /// Create an element, normalizing its attributes.
    ///
    /// Attributes are sorted by name and exact duplicates removed.
    #[must_use]
    pub fn new(tag: &str, attributes: Vec<(String, String)>) -> Self {
        let mut attributes = attributes;
        attributes.sort();
        attributes.dedup();
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes,
            children: Vec::new(),
        }
    }

    /// Lowercase element name.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Attributes sorted by name.
    #[must_use]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// All values of attributes named `name`.
    pub fn attribute_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.attributes
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Child sequence in document order.
    #[must_use]
    pub fn children(&self) -> &[Child] {
        &self.children
    }

    /// Element children only.
    pub fn child_nodes(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter_map(|child| match child {
            Child::Node(node) => Some(node),
            _ => None,
        })
    }

    /// Text runs directly under this node.
    pub fn text_fragments(&self) -> impl Iterator<Item = &str> {
        self.children.iter().filter_map(|child| match child {
            Child::Text(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Whether the node has any attribute.
    #[must_use]
    pub fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }

    /// Append a child element.
    pub fn push_node(&mut self, node: Node) {
        self.children.push(Child::Node(node));
    }

    /// Append a text run.
    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(Child::Text(text.into()));
    }

    /// Append a line-break marker.
    pub fn push_line_break(&mut self) {
        self.children.push(Child::LineBreak);
    }

    /// Visit this node and its descendant elements in document order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

/// Pre-order iterator over a node and its descendant elements.
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.child_nodes().collect::<Vec<_>>().into_iter().rev());
        Some(node)
    }
}

/// The tree produced by one parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    roots: Vec<Node>,
}

impl Document {
    /// Build a document from already assembled roots.
    #[must_use]
    pub fn from_roots(roots: Vec<Node>) -> Self {
        Self { roots }
    }

    /// Roots in document order.
    ///
    /// Usually a single `html` element; stray markup after it adds more.
    #[must_use]
    pub fn roots(&self) -> &[Node] {
        &self.roots
    }

    /// Every element of the document in document order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.roots.iter().flat_map(Node::descendants)
    }

    /// All elements matching the selector, outer before inner.
    #[must_use]
    pub fn query(&self, selector: &Selector) -> Vec<&Node> {
        self.nodes().filter(|node| selector.matches(node)).collect()
    }

    /// Whether the parse produced nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
