use std::fmt;
use std::ops::Range;

/// A node of a [`Document`](crate::Document)'s current tree.
///
/// Borrows the document, so it cannot outlive the next `commit()`.
#[derive(Clone, Copy)]
pub struct Node<'doc> {
    raw: tree_sitter::Node<'doc>,
    source: &'doc str,
}

impl<'doc> Node<'doc> {
    pub(crate) fn new(raw: tree_sitter::Node<'doc>, source: &'doc str) -> Self {
        Self { raw, source }
    }

    /// Grammar kind, e.g. `function_item`.
    pub fn kind(&self) -> &'static str {
        self.raw.kind()
    }

    /// Source text covered by the node.
    pub fn text(&self) -> &'doc str {
        &self.source[self.raw.byte_range()]
    }

    /// Half-open byte range `[pos, end)`.
    pub fn range(&self) -> Range<usize> {
        self.raw.byte_range()
    }

    pub fn pos(&self) -> usize {
        self.raw.start_byte()
    }

    pub fn end(&self) -> usize {
        self.raw.end_byte()
    }

    /// Zero-based row and byte column of the node start.
    pub fn start_position(&self) -> tree_sitter::Point {
        self.raw.start_position()
    }

    pub fn is_named(&self) -> bool {
        self.raw.is_named()
    }

    pub fn parent(&self) -> Option<Node<'doc>> {
        self.raw.parent().map(|raw| Node::new(raw, self.source))
    }

    /// Child stored under a grammar field, e.g. `name` or `body`.
    pub fn field(&self, name: &str) -> Option<Node<'doc>> {
        self.raw
            .child_by_field_name(name)
            .map(|raw| Node::new(raw, self.source))
    }

    pub fn named_children(&self) -> Vec<Node<'doc>> {
        let mut cursor = self.raw.walk();
        self.raw
            .named_children(&mut cursor)
            .map(|raw| Node::new(raw, self.source))
            .collect()
    }

    /// The underlying tree-sitter node.
    pub fn raw(&self) -> tree_sitter::Node<'doc> {
        self.raw
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.raw.id() == other.raw.id()
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}..{})", self.kind(), self.pos(), self.end())
    }
}
