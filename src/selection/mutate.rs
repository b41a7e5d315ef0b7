//! Edit scheduling, available on `Root` selections only.

use crate::payload::{edit_for, EditIntent, Payload};
use crate::selection::{Cardinality, Context, Root, Selection, SelectionError};

impl<'doc, C: Cardinality> Selection<'doc, C, Root> {
    /// Queue the removal of every selected node.
    pub fn remove(self) -> Self {
        for node in &self.nodes {
            if let Some(edit) = edit_for(EditIntent::Remove, *node, Payload::Absent) {
                self.doc.push_change(edit);
            }
        }
        self
    }

    /// Queue an insertion before every node whose callback yields a payload.
    pub fn prepend<F, P>(self, f: F) -> Result<Self, SelectionError>
    where
        F: FnMut(&Context<'doc>) -> Result<P, SelectionError>,
        P: Into<Payload>,
    {
        self.schedule(EditIntent::Prepend, f)
    }

    /// Queue an insertion after every node whose callback yields a payload.
    pub fn append<F, P>(self, f: F) -> Result<Self, SelectionError>
    where
        F: FnMut(&Context<'doc>) -> Result<P, SelectionError>,
        P: Into<Payload>,
    {
        self.schedule(EditIntent::Append, f)
    }

    /// Queue a replacement of every node whose callback yields a payload.
    ///
    /// ```
    /// use tree_splice::{Document, SupportLang, Template};
    ///
    /// let mut doc = Document::parse(SupportLang::Rust, "fn a() { old(1); }").unwrap();
    /// doc.query("old($X)")
    ///     .unwrap()
    ///     .replace(|ctx| {
    ///         let arg = ctx.query("1").unwrap().unique().unwrap().node();
    ///         Ok(Template::new("new($ARG)").bind("ARG", arg).build()?)
    ///     })
    ///     .unwrap();
    /// doc.commit().unwrap();
    ///
    /// assert_eq!(doc.text(), "fn a() { new(1); }");
    /// ```
    pub fn replace<F, P>(self, f: F) -> Result<Self, SelectionError>
    where
        F: FnMut(&Context<'doc>) -> Result<P, SelectionError>,
        P: Into<Payload>,
    {
        self.schedule(EditIntent::Replace, f)
    }

    fn schedule<F, P>(self, intent: EditIntent, mut f: F) -> Result<Self, SelectionError>
    where
        F: FnMut(&Context<'doc>) -> Result<P, SelectionError>,
        P: Into<Payload>,
    {
        for node in &self.nodes {
            let payload = f(&self.context(*node))?.into();
            if let Some(edit) = edit_for(intent, *node, payload) {
                self.doc.push_change(edit);
            }
        }
        Ok(self)
    }
}
