//! Mutation payloads and their resolution into pending edits.

use crate::edit::PendingEdit;
use crate::node::Node;
use crate::template::Snippet;
use std::borrow::Cow;

/// Canonical text of something that can be spliced into a document.
pub trait Render {
    fn render(&self) -> Cow<'_, str>;
}

impl Render for str {
    fn render(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl Render for String {
    fn render(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl Render for Node<'_> {
    fn render(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.text())
    }
}

impl Render for Snippet {
    fn render(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.text())
    }
}

impl<T: Render + ?Sized> Render for &T {
    fn render(&self) -> Cow<'_, str> {
        (**self).render()
    }
}

/// Value returned by a `prepend`/`append`/`replace` callback.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Payload {
    /// Nothing to do for this element
    #[default]
    Absent,
    /// Literal text, used verbatim
    Text(String),
    /// A constructed node, rendered before splicing
    Node(Snippet),
}

impl Payload {
    /// Concrete text for the payload, `None` when absent.
    pub fn resolve(self) -> Option<String> {
        match self {
            Payload::Absent => None,
            Payload::Text(text) => Some(text),
            Payload::Node(snippet) => Some(snippet.render().into_owned()),
        }
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<Snippet> for Payload {
    fn from(snippet: Snippet) -> Self {
        Payload::Node(snippet)
    }
}

impl From<Node<'_>> for Payload {
    fn from(node: Node<'_>) -> Self {
        Payload::Text(node.text().to_string())
    }
}

impl<T: Into<Payload>> From<Option<T>> for Payload {
    fn from(value: Option<T>) -> Self {
        value.map_or(Payload::Absent, Into::into)
    }
}

/// What a mutation does to each selected node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditIntent {
    Remove,
    Prepend,
    Append,
    Replace,
}

/// Turn an intent and payload into the edit anchored at `node`.
///
/// `Remove` ignores the payload; every other intent is a no-op for an absent
/// payload.
pub fn edit_for(intent: EditIntent, node: Node<'_>, payload: Payload) -> Option<PendingEdit> {
    let (pos, end) = (node.pos(), node.end());
    let edit = match intent {
        EditIntent::Remove => PendingEdit::spanning(pos, end, String::new()),
        EditIntent::Prepend => PendingEdit::insert(pos, payload.resolve()?),
        EditIntent::Append => PendingEdit::insert(end, payload.resolve()?),
        EditIntent::Replace => PendingEdit::spanning(pos, end, payload.resolve()?),
    };
    Some(edit)
}
