use crate::ts::point_at;
use thiserror::Error;
use tracing::{debug, warn};
use tree_sitter::InputEdit;

/// A queued text splice: replace `[pos, end)` with `new_text`.
///
/// Offsets are byte offsets into the document text as it is when the edit is
/// committed, not when it was queued. Insertions have `pos == end`, removals
/// have an empty `new_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    pos: usize,
    end: usize,
    new_text: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("Inverted byte range: [{pos}, {end})")]
    InvertedRange { pos: usize, end: usize },

    #[error("Invalid byte range: [{pos}, {end}) in text of length {text_len}")]
    OutOfBounds {
        pos: usize,
        end: usize,
        text_len: usize,
    },

    #[error("Byte offset {offset} is not on a UTF-8 character boundary")]
    NotCharBoundary { offset: usize },
}

impl PendingEdit {
    /// Create an edit replacing `[pos, end)`.
    pub fn new(pos: usize, end: usize, new_text: impl Into<String>) -> Result<Self, EditError> {
        if pos > end {
            return Err(EditError::InvertedRange { pos, end });
        }
        Ok(Self {
            pos,
            end,
            new_text: new_text.into(),
        })
    }

    /// Create an edit inserting `new_text` at `at`.
    pub fn insert(at: usize, new_text: impl Into<String>) -> Self {
        Self {
            pos: at,
            end: at,
            new_text: new_text.into(),
        }
    }

    /// Edit over a span already known to be ordered, such as a node range.
    pub(crate) fn spanning(pos: usize, end: usize, new_text: String) -> Self {
        debug_assert!(pos <= end);
        Self { pos, end, new_text }
    }

    /// Create an edit deleting `[pos, end)`.
    pub fn delete(pos: usize, end: usize) -> Result<Self, EditError> {
        Self::new(pos, end, String::new())
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn new_text(&self) -> &str {
        &self.new_text
    }

    /// Check the edit can be spliced into `text`.
    fn validate(&self, text: &str) -> Result<(), EditError> {
        if self.end > text.len() {
            return Err(EditError::OutOfBounds {
                pos: self.pos,
                end: self.end,
                text_len: text.len(),
            });
        }
        for offset in [self.pos, self.end] {
            if !text.is_char_boundary(offset) {
                return Err(EditError::NotCharBoundary { offset });
            }
        }
        Ok(())
    }
}

/// Counts reported by a commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitStats {
    /// Edits spliced into the text
    pub applied: usize,
    /// Edits dropped because they started at or after an applied edit
    pub discarded: usize,
}

/// Outcome of splicing a batch of edits into a text.
#[derive(Debug, Clone)]
pub struct Splice {
    /// The new text
    pub text: String,
    /// One tree-sitter edit per applied splice, in application order
    pub input_edits: Vec<InputEdit>,
    pub stats: CommitStats,
}

/// Apply a batch of pending edits to `text` in one pass.
///
/// Edits are sorted by descending `end`, ties by descending `pos`, and applied
/// right to left so offsets of edits still to be applied never move. Once an
/// edit has been applied at `pos`, every later edit with `pos' >= pos` is
/// dropped without error; this also drops edits that merely touch the applied
/// one, such as a second insertion at the same point.
///
/// An edit that starts before the applied one but ends inside or past it is
/// still applied, with its end cut back to the length of the rewritten text.
///
/// Either every surviving edit is applied or an error is returned and `text`
/// is left as it was. Only the initial validation against `text` can fail.
pub fn splice(text: &str, edits: &[PendingEdit]) -> Result<Splice, EditError> {
    for edit in edits {
        edit.validate(text)?;
    }

    let mut ordered: Vec<&PendingEdit> = edits.iter().collect();
    ordered.sort_by(|a, b| b.end.cmp(&a.end).then(b.pos.cmp(&a.pos)));

    let mut working = text.to_string();
    let mut input_edits = Vec::with_capacity(ordered.len());
    let mut stats = CommitStats::default();
    let mut last_applied_pos: Option<usize> = None;

    for edit in ordered {
        if let Some(last) = last_applied_pos {
            if edit.pos >= last {
                debug!(
                    pos = edit.pos,
                    end = edit.end,
                    last_applied_pos = last,
                    "discarding overlapping edit"
                );
                stats.discarded += 1;
                continue;
            }
            if edit.end > last {
                warn!(
                    pos = edit.pos,
                    end = edit.end,
                    last_applied_pos = last,
                    "edit extends into already rewritten text"
                );
            }
        }

        // A partially overlapping edit keeps its start and is cut off at the
        // end of the rewritten text, on a char boundary.
        let pos = edit.pos;
        let mut end = edit.end.min(working.len());
        while !working.is_char_boundary(end) {
            end -= 1;
        }

        let start_position = point_at(&working, pos);
        let old_end_position = point_at(&working, end);
        working.replace_range(pos..end, &edit.new_text);
        let new_end_byte = pos + edit.new_text.len();

        input_edits.push(InputEdit {
            start_byte: pos,
            old_end_byte: end,
            new_end_byte,
            start_position,
            old_end_position,
            new_end_position: point_at(&working, new_end_byte),
        });
        stats.applied += 1;
        last_applied_pos = Some(pos);
    }

    Ok(Splice {
        text: working,
        input_edits,
        stats,
    })
}
