//! Typed selections over document nodes.
//!
//! A [`Selection`] carries two marker types:
//!
//! - cardinality: [`Single`] (exactly one node) or [`Many`] (zero or more,
//!   in match order)
//! - tier: [`Root`] (can schedule edits) or [`Derived`] (read-only)
//!
//! Only [`Document::query`](crate::Document::query) produces `Root`
//! selections, and `filter`/`parent`/`first`/`last`/`unique` keep the tier.
//! Queries made from a callback [`Context`] produce `Derived` selections, which
//! have no mutation methods at all:
//!
//! ```compile_fail
//! use tree_splice::{Document, SupportLang};
//!
//! let doc = Document::parse(SupportLang::Rust, "fn a() { b(); }").unwrap();
//! doc.query("fn a() { $$$BODY }").unwrap().for_each(|ctx| {
//!     ctx.query("b()").unwrap().remove();
//! });
//! ```

mod context;
mod errors;
mod mutate;

pub use context::Context;
pub use errors::{CardinalityError, SelectionError};

use crate::document::Document;
use crate::node::Node;
use std::fmt;
use std::marker::PhantomData;

/// Exactly one node.
pub enum Single {}
/// Zero or more nodes.
pub enum Many {}
/// Selection produced by the document's own query chain; may edit.
pub enum Root {}
/// Selection produced by a nested query; read-only.
pub enum Derived {}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Single {}
    impl Sealed for super::Many {}
    impl Sealed for super::Root {}
    impl Sealed for super::Derived {}
}

pub trait Cardinality: sealed::Sealed {}
impl Cardinality for Single {}
impl Cardinality for Many {}

pub trait Tier: sealed::Sealed {}
impl Tier for Root {}
impl Tier for Derived {}

pub type RootSelection<'doc> = Selection<'doc, Many, Root>;
pub type RootSingle<'doc> = Selection<'doc, Single, Root>;
pub type DerivedSelection<'doc> = Selection<'doc, Many, Derived>;
pub type DerivedSingle<'doc> = Selection<'doc, Single, Derived>;

/// An ordered view over nodes of one document.
pub struct Selection<'doc, C: Cardinality, T: Tier> {
    doc: &'doc Document,
    nodes: Vec<Node<'doc>>,
    _tags: PhantomData<fn() -> (C, T)>,
}

impl<'doc, C: Cardinality, T: Tier> Selection<'doc, C, T> {
    pub(crate) fn from_parts(doc: &'doc Document, nodes: Vec<Node<'doc>>) -> Self {
        Self {
            doc,
            nodes,
            _tags: PhantomData,
        }
    }

    fn context(&self, node: Node<'doc>) -> Context<'doc> {
        Context::new(self.doc, node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node<'doc>] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<Node<'doc>> {
        self.nodes
    }

    /// Call `f` once per node, in order.
    pub fn for_each(self, mut f: impl FnMut(&Context<'doc>)) -> Self {
        for node in &self.nodes {
            f(&self.context(*node));
        }
        self
    }

    /// Replace every node with its parent. Siblings map to the same parent
    /// and are kept as duplicates.
    ///
    /// Fails with [`SelectionError::NoParent`] if any node is the tree root.
    pub fn parent(self) -> Result<Self, SelectionError> {
        let parents = self
            .nodes
            .iter()
            .map(|node| {
                node.parent().ok_or(SelectionError::NoParent {
                    kind: node.kind(),
                    pos: node.pos(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_parts(self.doc, parents))
    }
}

impl<'doc, T: Tier> Selection<'doc, Many, T> {
    /// Keep the nodes whose context satisfies `predicate`. Never fails; the
    /// result may be empty.
    pub fn filter(self, mut predicate: impl FnMut(&Context<'doc>) -> bool) -> Self {
        let kept = self
            .nodes
            .iter()
            .copied()
            .filter(|node| predicate(&self.context(*node)))
            .collect();
        Self::from_parts(self.doc, kept)
    }

    pub fn map<R>(&self, f: impl FnMut(&Context<'doc>) -> R) -> Vec<R> {
        let mut f = f;
        self.nodes
            .iter()
            .map(|node| f(&self.context(*node)))
            .collect()
    }

    pub fn first(self) -> Result<Selection<'doc, Single, T>, SelectionError> {
        let node = *self.nodes.first().ok_or(CardinalityError::EmptySelection)?;
        Ok(Selection::from_parts(self.doc, vec![node]))
    }

    pub fn last(self) -> Result<Selection<'doc, Single, T>, SelectionError> {
        let node = *self.nodes.last().ok_or(CardinalityError::EmptySelection)?;
        Ok(Selection::from_parts(self.doc, vec![node]))
    }

    /// Narrow to the only node; fails unless there is exactly one.
    pub fn unique(self) -> Result<Selection<'doc, Single, T>, SelectionError> {
        match self.nodes.as_slice() {
            [node] => {
                let node = *node;
                Ok(Selection::from_parts(self.doc, vec![node]))
            }
            nodes => Err(CardinalityError::NotExactlyOne { count: nodes.len() }.into()),
        }
    }
}

impl<'doc, T: Tier> Selection<'doc, Single, T> {
    pub fn node(&self) -> Node<'doc> {
        self.nodes[0]
    }

    pub fn text(&self) -> &'doc str {
        self.node().text()
    }

    /// Check `predicate` holds for the node.
    ///
    /// Unlike [`Many`] selections, which narrow silently, a single selection
    /// fails with [`SelectionError::PredicateFailed`].
    pub fn filter(
        self,
        mut predicate: impl FnMut(&Context<'doc>) -> bool,
    ) -> Result<Self, SelectionError> {
        let node = self.node();
        if predicate(&self.context(node)) {
            Ok(self)
        } else {
            Err(SelectionError::PredicateFailed {
                kind: node.kind(),
                pos: node.pos(),
            })
        }
    }

    pub fn map<R>(&self, f: impl FnOnce(&Context<'doc>) -> R) -> R {
        f(&self.context(self.node()))
    }

    pub fn first(self) -> Self {
        self
    }

    pub fn last(self) -> Self {
        self
    }

    pub fn unique(self) -> Self {
        self
    }
}

impl<C: Cardinality, T: Tier> Clone for Selection<'_, C, T> {
    fn clone(&self) -> Self {
        Self::from_parts(self.doc, self.nodes.clone())
    }
}

impl<C: Cardinality, T: Tier> fmt::Debug for Selection<'_, C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("cardinality", &std::any::type_name::<C>())
            .field("tier", &std::any::type_name::<T>())
            .field("nodes", &self.nodes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ast_grep_language::SupportLang;

    const SOURCE: &str = "const A: u8 = 1; const B: &str = \"x\"; /* foo! */ const C: u8 = 3;";

    fn doc() -> Document {
        Document::parse(SupportLang::Rust, SOURCE).unwrap()
    }

    #[test]
    fn query_returns_document_order() {
        let d = doc();
        let names = d
            .query("const $N: $T = $V;")
            .unwrap()
            .map(|ctx| ctx.node().field("name").unwrap().text().to_string());
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn many_filter_narrows_silently() {
        let d = doc();
        let sel = d
            .query("const $N: $T = $V;")
            .unwrap()
            .filter(|ctx| ctx.node().field("value").unwrap().kind() == "integer_literal");
        assert_eq!(sel.len(), 2);

        let none = sel.filter(|_| false);
        assert!(none.is_empty());
    }

    #[test]
    fn single_filter_fails_loudly() {
        let d = doc();
        let single = d.query("const B: $T = $V;").unwrap().unique().unwrap();
        let single = single.filter(|ctx| ctx.text().contains('B')).unwrap();

        let err = single.filter(|_| false).unwrap_err();
        assert!(matches!(
            err,
            SelectionError::PredicateFailed { kind: "const_item", .. }
        ));
    }

    #[test]
    fn narrowing_failures() {
        let d = doc();
        let err = d.query("static X: u8 = 0;").unwrap().first().unwrap_err();
        assert!(matches!(
            err,
            SelectionError::Cardinality(CardinalityError::EmptySelection)
        ));

        let err = d.query("static X: u8 = 0;").unwrap().last().unwrap_err();
        assert!(matches!(
            err,
            SelectionError::Cardinality(CardinalityError::EmptySelection)
        ));

        let err = d.query("const $N: $T = $V;").unwrap().unique().unwrap_err();
        assert!(matches!(
            err,
            SelectionError::Cardinality(CardinalityError::NotExactlyOne { count: 3 })
        ));

        let err = d.query("static X: u8 = 0;").unwrap().unique().unwrap_err();
        assert!(matches!(
            err,
            SelectionError::Cardinality(CardinalityError::NotExactlyOne { count: 0 })
        ));
    }

    #[test]
    fn first_and_last() {
        let d = doc();
        let all = d.query("const $N: $T = $V;").unwrap();
        assert!(all.clone().first().unwrap().text().starts_with("const A"));
        assert!(all.last().unwrap().text().starts_with("const C"));
    }

    #[test]
    fn single_narrowing_is_identity() {
        let d = doc();
        let single = d.query("const A: u8 = 1;").unwrap().first().unwrap();
        let node = single.node();
        assert_eq!(single.first().last().unique().node(), node);
    }

    #[test]
    fn unique_then_map() {
        let d = doc();
        let text = d
            .query("const B: $T = $V;")
            .unwrap()
            .unique()
            .unwrap()
            .map(|ctx| ctx.text().to_string());
        assert_eq!(text, "const B: &str = \"x\";");
    }

    #[test]
    fn parent_keeps_cardinality() {
        let d = doc();
        let parents = d.query("1").unwrap().parent().unwrap();
        assert_eq!(parents.len(), 1);
        assert_eq!(parents.nodes()[0].kind(), "const_item");

        let root = parents.parent().unwrap();
        assert_eq!(root.nodes()[0].kind(), "source_file");

        let err = root.parent().unwrap_err();
        assert!(matches!(
            err,
            SelectionError::NoParent { kind: "source_file", pos: 0 }
        ));
    }

    #[test]
    fn for_each_visits_in_order() {
        let d = doc();
        let mut seen = Vec::new();
        let sel = d
            .query("const $N: $T = $V;")
            .unwrap()
            .for_each(|ctx| seen.push(ctx.node().pos()));
        assert_eq!(sel.len(), 3);
        assert_eq!(seen.len(), 3);
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn nested_query_is_scoped() {
        let d = doc();
        let values = d
            .query("const $N: $T = $V;")
            .unwrap()
            .map(|ctx| ctx.query("\"x\"").unwrap().len());
        assert_eq!(values, vec![0, 1, 0]);
    }
}
