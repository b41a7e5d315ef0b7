//! The document: one text snapshot, its tree, and a queue of pending edits.
//!
//! ## Lifecycle
//!
//! ```text
//! parse → query → select/inspect → push edits → commit
//!   ↓       ↓           ↓               ↓          ↓
//! Tree   Selection   Context        PendingEdit  new text + reparsed tree
//! ```
//!
//! Selections and nodes borrow the document immutably while `commit()` needs
//! `&mut self`, so no node of an old tree can survive a commit.

use crate::edit::{self, CommitStats, EditError, PendingEdit};
use crate::node::Node;
use crate::pool::with_parser;
use crate::selection::{Many, Root, Selection, SelectionError};
use crate::sg::{self, lang_from_path};
use crate::ts::{self, TreeSitterError};
use ast_grep_core::tree_sitter::StrDoc;
use ast_grep_core::AstGrep;
use ast_grep_language::SupportLang;
use std::cell::{OnceCell, RefCell};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use tree_sitter::Tree;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("tree-sitter error: {0}")]
    TreeSitter(#[from] TreeSitterError),

    #[error("edit error: {0}")]
    Edit(#[from] EditError),

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot detect language of {path}")]
    UnknownLanguage { path: PathBuf },
}

/// Which matcher interprets a query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPattern<'p> {
    /// ast-grep pattern with `$METAVAR`s
    AstGrep(&'p str),
    /// tree-sitter S-expression query selecting its `@match` capture
    TreeSitter(&'p str),
}

impl<'p> From<&'p str> for QueryPattern<'p> {
    fn from(pattern: &'p str) -> Self {
        QueryPattern::AstGrep(pattern)
    }
}

impl<'p> From<&'p String> for QueryPattern<'p> {
    fn from(pattern: &'p String) -> Self {
        QueryPattern::AstGrep(pattern.as_str())
    }
}

/// A parsed source text with pending edits.
pub struct Document {
    path: Option<PathBuf>,
    lang: SupportLang,
    text: String,
    tree: Tree,
    /// ast-grep view of `text`, built on first pattern query
    sg: OnceCell<AstGrep<StrDoc<SupportLang>>>,
    pending: RefCell<Vec<PendingEdit>>,
    touched: bool,
}

impl Document {
    /// Parse `text` as `lang`.
    pub fn parse(lang: SupportLang, text: impl Into<String>) -> Result<Self, DocumentError> {
        let text = text.into();
        let tree = with_parser(lang, |parser| parser.parse(&text))??;

        Ok(Self {
            path: None,
            lang,
            text,
            tree,
            sg: OnceCell::new(),
            pending: RefCell::new(Vec::new()),
            touched: false,
        })
    }

    /// Read and parse a file, detecting the language from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let lang = lang_from_path(path).ok_or_else(|| DocumentError::UnknownLanguage {
            path: path.to_path_buf(),
        })?;
        Self::from_path_as(path, lang)
    }

    /// Read and parse a file as the given language.
    pub fn from_path_as(path: impl AsRef<Path>, lang: SupportLang) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(lang, text)?.with_path(path))
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn lang(&self) -> SupportLang {
        self.lang
    }

    /// Text as of the most recent commit.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn root(&self) -> Node<'_> {
        Node::new(self.tree.root_node(), &self.text)
    }

    /// Edits are queued and not yet committed.
    pub fn dirty(&self) -> bool {
        !self.pending.borrow().is_empty()
    }

    /// A non-empty batch of edits has been committed at least once.
    pub fn touched(&self) -> bool {
        self.touched
    }

    /// Snapshot of the queued edits, in push order.
    pub fn pending(&self) -> Vec<PendingEdit> {
        self.pending.borrow().clone()
    }

    /// Select every node matching `pattern`, in document order.
    ///
    /// This is the only way to obtain a [`Root`] selection, the tier that can
    /// schedule edits.
    pub fn query<'p>(
        &self,
        pattern: impl Into<QueryPattern<'p>>,
    ) -> Result<Selection<'_, Many, Root>, SelectionError> {
        let nodes = self.match_nodes(self.tree.root_node(), pattern.into())?;
        Ok(Selection::from_parts(self, nodes))
    }

    pub(crate) fn match_nodes<'d>(
        &'d self,
        scope: tree_sitter::Node<'d>,
        pattern: QueryPattern<'_>,
    ) -> Result<Vec<Node<'d>>, SelectionError> {
        let raw = match pattern {
            QueryPattern::AstGrep(pattern) => sg::find_nodes(self.sg(), scope, pattern, self.lang)?,
            QueryPattern::TreeSitter(query) => ts::find_nodes(scope, &self.text, query, self.lang)?,
        };
        Ok(raw
            .into_iter()
            .map(|raw| Node::new(raw, &self.text))
            .collect())
    }

    fn sg(&self) -> &AstGrep<StrDoc<SupportLang>> {
        self.sg
            .get_or_init(|| AstGrep::new(self.text.as_str(), self.lang))
    }

    /// Queue one edit. Nothing changes until [`Document::commit`].
    pub fn push_change(&self, edit: PendingEdit) {
        self.pending.borrow_mut().push(edit);
    }

    /// Drop every queued edit without applying it.
    pub fn discard_changes(&self) -> Vec<PendingEdit> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }

    /// Apply all queued edits as one atomic pass and reparse.
    pub fn commit(&mut self) -> Result<&mut Self, DocumentError> {
        self.commit_with_stats()?;
        Ok(self)
    }

    /// Like [`Document::commit`], reporting how many edits were applied and
    /// how many were dropped as overlapping.
    ///
    /// On error the text, tree and queue are left unchanged.
    pub fn commit_with_stats(&mut self) -> Result<CommitStats, DocumentError> {
        let pending = self.pending.get_mut();
        if pending.is_empty() {
            return Ok(CommitStats::default());
        }

        let spliced = edit::splice(&self.text, pending)?;

        let mut old_tree = self.tree.clone();
        for input in &spliced.input_edits {
            old_tree.edit(input);
        }
        let tree = with_parser(self.lang, |parser| parser.reparse(&spliced.text, &old_tree))??;

        debug!(
            path = ?self.path,
            applied = spliced.stats.applied,
            discarded = spliced.stats.discarded,
            "committed edits"
        );

        pending.clear();
        self.text = spliced.text;
        self.tree = tree;
        self.sg.take();
        self.touched = true;

        Ok(spliced.stats)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("path", &self.path)
            .field("lang", &self.lang)
            .field("len", &self.text.len())
            .field("pending", &self.pending.borrow().len())
            .field("touched", &self.touched)
            .finish()
    }
}
