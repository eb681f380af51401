//! Notes Storage Layer
//!
//! File-backed persistence: each note is `<dir>/<name>.txt` plus an optional
//! `<dir>/<name>.txt.highlights.json` sidecar. Writes go through a temp file
//! and a rename so a crash never leaves a half-written note behind.

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use super::model::{sanitize_note_name, LoadedNote, NoteHandle, NOTE_EXTENSION};
use crate::error::{NotesError, Result};
use crate::highlights::{self, RangeSet, TextSource};

/// The directory of notes.
#[derive(Debug, Clone)]
pub struct NoteStore {
    dir: PathBuf,
}

impl NoteStore {
    /// Open (and create if needed) the notes directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| NotesError::io(&dir, e))?;
        debug!(dir = %dir.display(), "Note store opened");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Handle for a user-supplied name (sanitized). The file may not exist.
    pub fn handle(&self, name: &str) -> NoteHandle {
        NoteHandle::new(&self.dir, sanitize_note_name(name))
    }

    pub fn exists(&self, handle: &NoteHandle) -> bool {
        handle.path().is_file()
    }

    /// All notes, sorted case-insensitively by file name.
    pub fn list(&self) -> Result<Vec<NoteHandle>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| NotesError::io(&self.dir, e))?;

        let mut notes: Vec<NoteHandle> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.ends_with(NOTE_EXTENSION))
            .map(|name| NoteHandle::new(&self.dir, name))
            .collect();

        notes.sort_by_key(|note| note.file_name().to_lowercase());
        debug!(count = notes.len(), "Listed notes");
        Ok(notes)
    }

    /// Create an empty note with an empty sidecar.
    #[instrument(skip(self))]
    pub fn create(&self, name: &str) -> Result<NoteHandle> {
        let handle = self.handle(name);
        if self.exists(&handle) {
            return Err(NotesError::NoteExists(handle.file_name().to_string()));
        }

        write_atomic(handle.path(), b"")?;
        write_atomic(&handle.sidecar_path(), &highlights::serialize(&RangeSet::new())?)?;

        info!(note = %handle, "Note created");
        Ok(handle)
    }

    /// Read the body and the highlights of a note.
    ///
    /// The body must be readable; the sidecar is best effort and its ranges
    /// are sanitized against the body that was just read.
    #[instrument(skip(self), fields(note = %handle))]
    pub fn load(&self, handle: &NoteHandle) -> Result<LoadedNote> {
        let text = match fs::read_to_string(handle.path()) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(NotesError::NoteNotFound(handle.file_name().to_string()))
            }
            Err(e) => return Err(NotesError::io(handle.path(), e)),
        };

        let ranges = self.load_ranges(handle).sanitized(text.char_len());

        debug!(
            text_len = text.len(),
            range_count = ranges.len(),
            "Note loaded"
        );
        Ok(LoadedNote {
            handle: handle.clone(),
            text,
            ranges,
        })
    }

    /// Raw sidecar content. Missing, unreadable, or malformed means empty.
    pub fn load_ranges(&self, handle: &NoteHandle) -> RangeSet {
        let sidecar = handle.sidecar_path();
        match fs::read(&sidecar) {
            Ok(bytes) => highlights::deserialize(&bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => RangeSet::new(),
            Err(e) => {
                warn!(path = %sidecar.display(), error = %e, "Failed to read highlight sidecar");
                RangeSet::new()
            }
        }
    }

    /// Write body and sidecar together.
    ///
    /// Both temp files are written before either is moved into place, so a
    /// failed write leaves the previous pair untouched.
    #[instrument(skip(self, text, ranges), fields(note = %handle, text_len = text.len(), range_count = ranges.len()))]
    pub fn save(&self, handle: &NoteHandle, text: &str, ranges: &RangeSet) -> Result<()> {
        let encoded = highlights::serialize(ranges)?;
        let body = Staged::write(handle.path(), text.as_bytes())?;
        let sidecar = match Staged::write(&handle.sidecar_path(), &encoded) {
            Ok(staged) => staged,
            Err(e) => {
                body.discard();
                return Err(e);
            }
        };
        if let Err(e) = body.commit() {
            sidecar.discard();
            return Err(e);
        }
        sidecar.commit()?;
        debug!("Note saved");
        Ok(())
    }

    /// Remove a note and its sidecar.
    #[instrument(skip(self), fields(note = %handle))]
    pub fn delete(&self, handle: &NoteHandle) -> Result<()> {
        if !self.exists(handle) {
            return Err(NotesError::NoteNotFound(handle.file_name().to_string()));
        }
        fs::remove_file(handle.path()).map_err(|e| NotesError::io(handle.path(), e))?;
        remove_if_present(&handle.sidecar_path())?;
        info!("Note deleted");
        Ok(())
    }

    /// Move a note and its sidecar to a new name, as a pair.
    ///
    /// If the sidecar cannot be moved the body is moved back. A source
    /// without a sidecar produces a target without one.
    #[instrument(skip(self), fields(note = %handle))]
    pub fn rename(&self, handle: &NoteHandle, new_name: &str) -> Result<NoteHandle> {
        let target = self.handle(new_name);
        if target.path() == handle.path() {
            return Ok(target);
        }
        if !self.exists(handle) {
            return Err(NotesError::NoteNotFound(handle.file_name().to_string()));
        }
        if self.exists(&target) {
            return Err(NotesError::NoteExists(target.file_name().to_string()));
        }

        fs::rename(handle.path(), target.path()).map_err(|e| NotesError::io(handle.path(), e))?;

        let old_sidecar = handle.sidecar_path();
        let new_sidecar = target.sidecar_path();
        if old_sidecar.exists() {
            if let Err(e) = fs::rename(&old_sidecar, &new_sidecar) {
                warn!(error = %e, "Failed to move highlight sidecar, rolling back rename");
                if let Err(rollback) = fs::rename(target.path(), handle.path()) {
                    warn!(error = %rollback, "Rollback of note rename failed");
                }
                return Err(NotesError::io(old_sidecar, e));
            }
        } else {
            // An orphaned sidecar at the target would attach stale highlights
            remove_if_present(&new_sidecar)?;
        }

        info!(new_name = %target, "Note renamed");
        Ok(target)
    }
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(NotesError::io(path, e)),
    }
}

/// Atomic write: write to `<path>.tmp`, then rename over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    Staged::write(path, bytes)?.commit()
}

/// Contents written to `<target>.tmp`, not yet moved over `target`.
struct Staged {
    tmp: PathBuf,
    target: PathBuf,
}

impl Staged {
    fn write(target: &Path, bytes: &[u8]) -> Result<Self> {
        let mut tmp: OsString = target.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, bytes).map_err(|e| NotesError::io(&tmp, e))?;
        Ok(Self {
            tmp,
            target: target.to_path_buf(),
        })
    }

    fn commit(self) -> Result<()> {
        if let Err(e) = fs::rename(&self.tmp, &self.target) {
            let target = self.target.clone();
            self.discard();
            return Err(NotesError::io(&target, e));
        }
        Ok(())
    }

    fn discard(self) {
        if let Err(e) = fs::remove_file(&self.tmp) {
            debug!(path = %self.tmp.display(), error = %e, "Failed to remove temp file");
        }
    }
}

#[cfg(test)]
#[path = "storage_tests.rs"]
mod tests;
