use crate::document::{Document, QueryPattern};
use crate::node::Node;
use crate::selection::{Derived, Many, Selection, SelectionError};

/// Per-node view handed to selection callbacks.
///
/// Queries issued from a context only see the node's subtree and always
/// return [`Derived`] selections, so nested inspection can never schedule
/// edits.
pub struct Context<'doc> {
    doc: &'doc Document,
    node: Node<'doc>,
}

impl<'doc> Context<'doc> {
    pub(crate) fn new(doc: &'doc Document, node: Node<'doc>) -> Self {
        Self { doc, node }
    }

    pub fn node(&self) -> Node<'doc> {
        self.node
    }

    /// Rendered text of the node.
    pub fn text(&self) -> &'doc str {
        self.node.text()
    }

    /// Select nodes matching `pattern` inside this node (itself included).
    pub fn query<'p>(
        &self,
        pattern: impl Into<QueryPattern<'p>>,
    ) -> Result<Selection<'doc, Many, Derived>, SelectionError> {
        let nodes = self.doc.match_nodes(self.node.raw(), pattern.into())?;
        Ok(Selection::from_parts(self.doc, nodes))
    }
}
