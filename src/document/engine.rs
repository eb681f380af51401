//! Document Engine
//!
//! Owns the active note: its buffer, its highlight ranges, the autosave
//! timer and the consumer-side capture filter. A single owner drives it
//! (see [`super::actor`]).

use std::time::{Duration, Instant};

use tracing::{debug, info, instrument};

use super::buffer::Buffer;
use crate::capture::{CaptureFilter, CapturedEvent};
use crate::config::Config;
use crate::debounce::Debounce;
use crate::error::{NotesError, Result};
use crate::highlights::{AddOutcome, RangeSet, RenderSpan};
use crate::logging;
use crate::notes::{NoteHandle, NoteStore};

/// What happened to a captured text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Appended; `chars` characters were added to the body.
    Inserted { chars: usize },
    /// Same text as the previous acceptance, inside the dedup window.
    Duplicate,
}

/// Read-only view of the engine for clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSnapshot {
    pub note: Option<String>,
    pub text: String,
    pub spans: Vec<RenderSpan>,
    pub range_count: usize,
    pub revision: u64,
    pub dirty: bool,
}

#[derive(Debug)]
struct ActiveNote {
    handle: NoteHandle,
    buffer: Buffer,
    ranges: RangeSet,
}

pub struct DocumentEngine {
    store: NoteStore,
    active: Option<ActiveNote>,
    autosave: Debounce,
    capture_filter: CaptureFilter,
}

impl DocumentEngine {
    pub fn new(store: NoteStore, autosave_quiet: Duration, dedup_window: Duration) -> Self {
        Self {
            store,
            active: None,
            autosave: Debounce::new(autosave_quiet),
            capture_filter: CaptureFilter::new(dedup_window),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let store = NoteStore::open(config.notes_dir())?;
        Ok(Self::new(
            store,
            config.autosave_quiet(),
            config.dedup_window(),
        ))
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    pub fn active_note(&self) -> Option<&NoteHandle> {
        self.active.as_ref().map(|active| &active.handle)
    }

    pub fn text(&self) -> Option<String> {
        self.active.as_ref().map(|active| active.buffer.text())
    }

    pub fn ranges(&self) -> Option<&RangeSet> {
        self.active.as_ref().map(|active| &active.ranges)
    }

    /// Unsaved changes are waiting for the autosave timer.
    pub fn is_dirty(&self) -> bool {
        self.autosave.is_pending()
    }

    pub fn list_notes(&self) -> Result<Vec<NoteHandle>> {
        self.store.list()
    }

    fn active_mut(&mut self) -> Result<&mut ActiveNote> {
        self.active.as_mut().ok_or(NotesError::NoActiveNote)
    }

    fn is_active(&self, handle: &NoteHandle) -> bool {
        self.active_note() == Some(handle)
    }

    // ------------------------------------------------------------------
    // Note lifecycle
    // ------------------------------------------------------------------

    /// Make `name` the active note, saving pending changes of the previous one.
    #[instrument(skip(self))]
    pub fn open(&mut self, name: &str) -> Result<&NoteHandle> {
        self.flush()?;
        let loaded = self.store.load(&self.store.handle(name))?;
        info!(note = %loaded.handle, ranges = loaded.ranges.len(), "Opened note");

        let active = self.active.insert(ActiveNote {
            handle: loaded.handle,
            buffer: Buffer::from_text(&loaded.text),
            ranges: loaded.ranges,
        });
        Ok(&active.handle)
    }

    /// Save pending changes and drop the active note.
    pub fn close(&mut self) -> Result<()> {
        self.flush()?;
        if let Some(active) = self.active.take() {
            debug!(note = %active.handle, "Closed note");
        }
        Ok(())
    }

    /// Create an empty note and open it.
    pub fn create_note(&mut self, name: &str) -> Result<NoteHandle> {
        let handle = self.store.create(name)?;
        self.open(handle.file_name())?;
        Ok(handle)
    }

    /// Delete a note. Deleting the active note clears the engine.
    pub fn delete_note(&mut self, name: &str) -> Result<()> {
        let handle = self.store.handle(name);
        self.store.delete(&handle)?;
        if self.is_active(&handle) {
            self.autosave.cancel();
            self.active = None;
            info!(note = %handle, "Active note deleted");
        }
        Ok(())
    }

    /// Rename a note and its sidecar. Pending edits of the active note are
    /// saved under the old name first.
    pub fn rename_note(&mut self, name: &str, new_name: &str) -> Result<NoteHandle> {
        let handle = self.store.handle(name);
        if self.is_active(&handle) {
            self.flush()?;
        }
        let renamed = self.store.rename(&handle, new_name)?;
        if let Some(active) = self.active.as_mut().filter(|a| a.handle == handle) {
            active.handle = renamed.clone();
        }
        Ok(renamed)
    }

    // ------------------------------------------------------------------
    // Edits
    // ------------------------------------------------------------------

    /// Local edit: replace `[start, end)` with `text`.
    pub fn apply_edit(&mut self, start: usize, end: usize, text: &str, now: Instant) -> Result<()> {
        self.active_mut()?.buffer.replace(start, end, text)?;
        self.autosave.schedule(now);
        Ok(())
    }

    pub fn insert_separator(&mut self, at: Option<usize>, now: Instant) -> Result<()> {
        self.active_mut()?.buffer.insert_separator(at)?;
        self.autosave.schedule(now);
        Ok(())
    }

    pub fn undo(&mut self, now: Instant) -> Result<bool> {
        let undone = self.active_mut()?.buffer.undo();
        if undone {
            self.autosave.schedule(now);
        }
        Ok(undone)
    }

    pub fn redo(&mut self, now: Instant) -> Result<bool> {
        let redone = self.active_mut()?.buffer.redo();
        if redone {
            self.autosave.schedule(now);
        }
        Ok(redone)
    }

    /// Append a captured text to the active note.
    ///
    /// Rejected without an active note. A repeat of the previously accepted
    /// text inside the dedup window is dropped.
    pub fn accept_capture(&mut self, event: &CapturedEvent, now: Instant) -> Result<CaptureOutcome> {
        if self.active.is_none() {
            return Err(NotesError::NoActiveNote);
        }
        if !self.capture_filter.accept(&event.text, event.timestamp) {
            logging::log_capture_event(event.origin.as_str(), &event.text, false);
            debug!(origin = event.origin.as_str(), "Duplicate capture dropped");
            return Ok(CaptureOutcome::Duplicate);
        }

        let chars = self.active_mut()?.buffer.append_captured(&event.text);
        self.autosave.schedule(now);
        Ok(CaptureOutcome::Inserted { chars })
    }

    // ------------------------------------------------------------------
    // Highlights
    // ------------------------------------------------------------------

    /// Highlight `[start, end)` and save immediately.
    pub fn add_highlight(&mut self, start: usize, end: usize, color: &str) -> Result<AddOutcome> {
        let active = self.active_mut()?;
        let outcome = active.ranges.add(active.buffer.rope(), start, end, color)?;
        let doc_len = active.buffer.len_chars();
        active.ranges = active.ranges.sanitized(doc_len);
        self.save_now("highlight")?;
        Ok(outcome)
    }

    /// Remove highlights overlapping `[start, end)` and save immediately.
    /// Returns how many were removed.
    pub fn clear_highlights(&mut self, start: usize, end: usize) -> Result<usize> {
        let active = self.active_mut()?;
        let doc_len = active.buffer.len_chars();
        let start = start.min(doc_len);
        let end = end.min(doc_len).max(start);
        if end <= start {
            return Err(NotesError::NoSelection);
        }
        let removed = active.ranges.clear_overlapping(start, end);
        active.ranges = active.ranges.sanitized(doc_len);
        self.save_now("clear")?;
        Ok(removed)
    }

    /// Spans to paint for the current text. Drifted ranges are left out.
    pub fn render_spans(&self) -> Vec<RenderSpan> {
        self.active
            .as_ref()
            .map(|active| active.ranges.resolve_for_render(active.buffer.rope()))
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    pub fn autosave_deadline(&self) -> Option<Instant> {
        self.autosave.deadline()
    }

    /// Save if the quiet period has elapsed. Returns whether a save happened.
    ///
    /// A failed save stays dirty and is retried one quiet period later.
    pub fn tick(&mut self, now: Instant) -> Result<bool> {
        if !self.autosave.fire_if_due(now) {
            return Ok(false);
        }
        if let Err(e) = self.save_now("autosave") {
            self.autosave.schedule(now);
            return Err(e);
        }
        Ok(true)
    }

    /// Write body and sidecar together. A no-op without an active note.
    ///
    /// Pending changes are only marked clean once the write succeeded.
    pub fn save_now(&mut self, trigger: &str) -> Result<()> {
        let Some(active) = self.active.as_ref() else {
            self.autosave.cancel();
            return Ok(());
        };
        let text = active.buffer.text();
        self.store.save(&active.handle, &text, &active.ranges)?;
        logging::log_save(
            active.handle.file_name(),
            &text,
            active.ranges.len(),
            trigger,
        );
        self.autosave.cancel();
        Ok(())
    }

    /// Save only if changes are pending.
    pub fn flush(&mut self) -> Result<()> {
        if self.autosave.is_pending() {
            self.save_now("flush")?;
        }
        Ok(())
    }

    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            note: self.active_note().map(|h| h.file_name().to_string()),
            text: self.text().unwrap_or_default(),
            spans: self.render_spans(),
            range_count: self.ranges().map(RangeSet::len).unwrap_or(0),
            revision: self
                .active
                .as_ref()
                .map(|a| a.buffer.revision())
                .unwrap_or(0),
            dirty: self.is_dirty(),
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
