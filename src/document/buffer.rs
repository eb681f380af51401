//! Rope-backed note body with undo/redo.
//!
//! Every mutation goes through [`Buffer::replace`], which records exactly one
//! undo step. Offsets are character offsets.

use ropey::Rope;

use crate::error::{NotesError, Result};

/// Visual divider inserted between entries.
pub const SEPARATOR: &str = "\n-------------------------------\n\n";

/// The text a capture adds to a document whose current body is `current`:
/// a blank line first if the body has any visible text, then the captured
/// text, then a blank line.
pub fn captured_insertion(current_is_blank: bool, text: &str) -> String {
    let prefix = if current_is_blank { "" } else { "\n\n" };
    format!("{}{}\n\n", prefix, text)
}

/// Pure form of a capture insert: the whole body after appending `text`.
pub fn insert_captured_text(current: &str, text: &str) -> String {
    let mut next = String::with_capacity(current.len() + text.len() + 4);
    next.push_str(current);
    next.push_str(&captured_insertion(current.trim().is_empty(), text));
    next
}

/// One reversible replacement of `removed` by `inserted` at `at`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    at: usize,
    removed: String,
    inserted: String,
}

#[derive(Debug, Clone, Default)]
pub struct Buffer {
    rope: Rope,
    undo_stack: Vec<Edit>,
    redo_stack: Vec<Edit>,
    revision: u64,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            ..Self::default()
        }
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.rope.chars().all(char::is_whitespace)
    }

    /// Bumped on every change, including undo and redo.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace `[start, end)` with `text` as one undo step.
    pub fn replace(&mut self, start: usize, end: usize, text: &str) -> Result<()> {
        let len = self.len_chars();
        if start > end || end > len {
            return Err(NotesError::EditOutOfBounds { start, end, len });
        }
        if start == end && text.is_empty() {
            return Ok(());
        }

        let removed = self.rope.slice(start..end).to_string();
        let edit = Edit {
            at: start,
            removed,
            inserted: text.to_string(),
        };
        self.apply(&edit);
        self.undo_stack.push(edit);
        self.redo_stack.clear();
        Ok(())
    }

    pub fn insert(&mut self, at: usize, text: &str) -> Result<()> {
        self.replace(at, at, text)
    }

    pub fn delete(&mut self, start: usize, end: usize) -> Result<()> {
        self.replace(start, end, "")
    }

    /// Append captured text at the end, as a single undo step.
    /// Returns the number of characters added.
    pub fn append_captured(&mut self, text: &str) -> usize {
        let insertion = captured_insertion(self.is_blank(), text);
        let end = self.len_chars();
        let added = insertion.chars().count();
        // end..end is always in bounds
        let _ = self.replace(end, end, &insertion);
        added
    }

    /// Insert [`SEPARATOR`] at `at`, or at the end when `at` is None.
    pub fn insert_separator(&mut self, at: Option<usize>) -> Result<()> {
        let at = at.unwrap_or_else(|| self.len_chars());
        self.insert(at, SEPARATOR)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Revert the latest step. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(edit) = self.undo_stack.pop() else {
            return false;
        };
        self.apply(&edit.inverse());
        self.redo_stack.push(edit);
        true
    }

    /// Reapply the latest undone step.
    pub fn redo(&mut self) -> bool {
        let Some(edit) = self.redo_stack.pop() else {
            return false;
        };
        self.apply(&edit);
        self.undo_stack.push(edit);
        true
    }

    /// Replace the whole body and forget history (switching notes).
    pub fn reset(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.revision += 1;
    }

    fn apply(&mut self, edit: &Edit) {
        let removed_len = edit.removed.chars().count();
        self.rope.remove(edit.at..edit.at + removed_len);
        self.rope.insert(edit.at, &edit.inserted);
        self.revision += 1;
    }
}

impl Edit {
    fn inverse(&self) -> Edit {
        Edit {
            at: self.at,
            removed: self.inserted.clone(),
            inserted: self.removed.clone(),
        }
    }
}
