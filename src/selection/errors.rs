use crate::sg::AstGrepError;
use crate::template::TemplateError;
use crate::ts::TreeSitterError;
use thiserror::Error;

/// A narrowing operation found the wrong number of nodes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CardinalityError {
    #[error("selection is empty")]
    EmptySelection,

    #[error("selection has {count} nodes, expected exactly 1")]
    NotExactlyOne { count: usize },
}

#[derive(Error, Debug)]
pub enum SelectionError {
    #[error(transparent)]
    Cardinality(#[from] CardinalityError),

    #[error("predicate rejected the selected `{kind}` node at byte {pos}")]
    PredicateFailed { kind: &'static str, pos: usize },

    #[error("`{kind}` node at byte {pos} has no parent")]
    NoParent { kind: &'static str, pos: usize },

    #[error("pattern error: {0}")]
    AstGrep(#[from] AstGrepError),

    #[error("query error: {0}")]
    TreeSitter(#[from] TreeSitterError),

    #[error("template error: {0}")]
    Template(#[from] TemplateError),
}
