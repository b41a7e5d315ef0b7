//! Run one transform over many files.
//!
//! Every file gets its own [`Document`]. A file whose transform or commit
//! fails is reported and left alone; the others are still processed.

use crate::document::{Document, DocumentError};
use crate::selection::SelectionError;
use crate::sg::lang_from_path;
use ast_grep_language::SupportLang;
use serde::Serialize;
use similar::TextDiff;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Something that queues (and optionally commits) edits on a document.
///
/// Closures taking `&mut Document` are transforms:
///
/// ```
/// use tree_splice::{batch::TransformError, Document, SupportLang, Transform};
///
/// let drop_todo = |doc: &mut Document| -> Result<(), TransformError> {
///     doc.query("todo!()")?.remove();
///     Ok(())
/// };
///
/// let mut doc = Document::parse(SupportLang::Rust, "fn a() { todo!(); }").unwrap();
/// drop_todo.apply(&mut doc).unwrap();
/// doc.commit().unwrap();
/// assert_eq!(doc.text(), "fn a() { ; }");
/// ```
pub trait Transform {
    fn apply(&self, doc: &mut Document) -> Result<(), TransformError>;
}

impl<F> Transform for F
where
    F: Fn(&mut Document) -> Result<(), TransformError>,
{
    fn apply(&self, doc: &mut Document) -> Result<(), TransformError> {
        self(doc)
    }
}

#[derive(Error, Debug)]
enum BatchError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Persist changed files instead of only reporting a diff
    pub write: bool,
    /// Parse every file as this language instead of detecting it
    pub lang: Option<SupportLang>,
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum FileOutcome {
    Unchanged,
    /// Preview mode: the file would change as shown
    Changed { diff: String },
    /// Write mode: the file was rewritten
    Written { diff: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn changed(&self) -> usize {
        self.files
            .iter()
            .filter(|f| {
                matches!(
                    f.outcome,
                    FileOutcome::Changed { .. } | FileOutcome::Written { .. }
                )
            })
            .count()
    }

    pub fn failed(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::Failed { .. }))
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }
}

/// Apply `transform` to every file and report each outcome in input order.
pub fn run(files: &[PathBuf], transform: &dyn Transform, options: &BatchOptions) -> BatchReport {
    let mut report = BatchReport::default();

    for path in files {
        let outcome = match process(path, transform, options) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "file failed");
                FileOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        };
        report.files.push(FileReport {
            path: path.clone(),
            outcome,
        });
    }

    info!(
        files = report.files.len(),
        changed = report.changed(),
        failed = report.failed(),
        "batch finished"
    );
    report
}

fn process(
    path: &Path,
    transform: &dyn Transform,
    options: &BatchOptions,
) -> Result<FileOutcome, BatchError> {
    let mut doc = match options.lang {
        Some(lang) => Document::from_path_as(path, lang)?,
        None => Document::from_path(path)?,
    };
    let original = doc.text().to_string();
    debug!(path = %path.display(), lang = ?doc.lang(), "processing");

    transform.apply(&mut doc)?;
    if doc.dirty() {
        doc.commit()?;
    }

    if !doc.touched() || doc.text() == original {
        return Ok(FileOutcome::Unchanged);
    }

    let diff = unified_diff(path, &original, doc.text());
    if options.write {
        atomic_write(path, doc.text().as_bytes()).map_err(|source| BatchError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "written");
        Ok(FileOutcome::Written { diff })
    } else {
        Ok(FileOutcome::Changed { diff })
    }
}

/// Unified diff of `original` against `modified`, labelled with `path`.
pub fn unified_diff(path: &Path, original: &str, modified: &str) -> String {
    let label = path.display().to_string();
    TextDiff::from_lines(original, modified)
        .unified_diff()
        .context_radius(3)
        .header(&label, &label)
        .to_string()
}

/// Atomic file write: tempfile + fsync + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    // Same directory keeps the rename on one filesystem.
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

/// Include/exclude globs applied during file discovery.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    include: Vec<glob::Pattern>,
    exclude: Vec<glob::Pattern>,
}

impl FileFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, glob::PatternError> {
        let compile = |patterns: &[String]| {
            patterns
                .iter()
                .map(|p| glob::Pattern::new(p))
                .collect::<Result<Vec<_>, _>>()
        };
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// An empty include list admits every path.
    pub fn matches(&self, path: &Path) -> bool {
        let path = path.strip_prefix(".").unwrap_or(path);
        let included = self.include.is_empty() || self.include.iter().any(|p| p.matches_path(path));
        included && !self.exclude.iter().any(|p| p.matches_path(path))
    }
}

/// Expand `roots` into a sorted list of source files.
///
/// Files named directly are always kept. Directories are walked, skipping
/// hidden entries, and keep files that pass `filter` and whose language can be
/// detected (any file when `lang` is given).
pub fn discover(
    roots: &[PathBuf],
    filter: &FileFilter,
    lang: Option<SupportLang>,
) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut files = Vec::new();

    for root in roots {
        if root.is_file() {
            files.push(root.clone());
            continue;
        }

        let walker = WalkDir::new(root)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()));
        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if (lang.is_some() || lang_from_path(path).is_some()) && filter.matches(path) {
                files.push(path.to_path_buf());
            }
        }
    }

    files.sort();
    files.dedup();
    debug!(count = files.len(), "discovered files");
    Ok(files)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|name| name.starts_with('.'))
}
