//! tree-splice: structural selection and batched editing of source trees
//!
//! A [`Document`] owns a source text and its tree-sitter tree. Queries (ast-grep
//! patterns or tree-sitter S-expressions) return typed [`Selection`]s that can
//! be narrowed, inspected and, at the top level, turned into pending edits.
//! [`Document::commit`] applies every pending edit in one pass and reparses
//! incrementally.
//!
//! # Architecture
//!
//! All mutations compile down to a single primitive: [`PendingEdit`], a byte
//! span replacement queued on the document. Selections decide *where* edits
//! go; the commit engine decides how a batch of them becomes one new text.
//!
//! # Guarantees
//!
//! - A commit applies all surviving edits or none
//! - Overlapping edits are resolved deterministically (right to left; an edit
//!   starting at or after an applied one is dropped)
//! - Only selections returned by [`Document::query`] can schedule edits;
//!   nested queries from callbacks are read-only at the type level
//! - Nodes cannot outlive the commit that invalidates them
//!
//! # Example
//!
//! ```
//! use tree_splice::{Document, SupportLang};
//!
//! let mut doc = Document::parse(SupportLang::Rust, "fn main() { dbg!(1); run(); }").unwrap();
//! doc.query("dbg!($$$ARGS)").unwrap().remove();
//! doc.query("run()").unwrap().append(|_| Ok(".await")).unwrap();
//! doc.commit().unwrap();
//!
//! assert_eq!(doc.text(), "fn main() { ; run().await; }");
//! ```

pub mod batch;
pub mod cache;
pub mod config;
pub mod document;
pub mod edit;
pub mod node;
pub mod payload;
pub mod pool;
pub mod selection;
pub mod sg;
pub mod template;
pub mod ts;

// Re-exports
pub use ast_grep_language::SupportLang;
pub use batch::{BatchOptions, BatchReport, FileOutcome, Transform, TransformError};
pub use config::{load_from_path, load_from_str, ConfigError, RuleConfig, RuleSet};
pub use document::{Document, DocumentError, QueryPattern};
pub use edit::{CommitStats, EditError, PendingEdit};
pub use node::Node;
pub use payload::{Payload, Render};
pub use selection::{
    CardinalityError, Context, Derived, Many, Root, Selection, SelectionError, Single,
};
pub use sg::AstGrepError;
pub use template::{Snippet, Template, TemplateError};
pub use ts::TreeSitterError;
