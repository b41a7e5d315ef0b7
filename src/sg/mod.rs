//! ast-grep integration for pattern-based node selection.
//!
//! Patterns use ast-grep's metavariable syntax ($NAME, $$$BODY, $_) and are
//! matched against the grammar of the document's language. Matches are mapped
//! back onto the document's own tree-sitter tree so selections can walk
//! parents and anchor edits.

pub mod errors;
pub mod lang;
pub mod matcher;

pub use errors::AstGrepError;
pub use lang::{lang_from_path, parse_lang, SupportLang};
pub use matcher::find_nodes;
