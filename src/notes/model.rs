//! Note identity and file naming.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::highlights::RangeSet;

/// Title used when the requested name is empty
pub const DEFAULT_NOTE_TITLE: &str = "New Note";

/// Note bodies are plain UTF-8 text files
pub const NOTE_EXTENSION: &str = ".txt";

/// Appended to the note file name to form the highlight sidecar
pub const SIDECAR_SUFFIX: &str = ".highlights.json";

/// Characters that are not allowed in note file names
const ILLEGAL_NAME_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Turn a user-supplied title into a safe note file name.
///
/// Empty names become [`DEFAULT_NOTE_TITLE`], a missing `.txt` suffix is
/// appended, and path-significant characters are replaced with `_`.
pub fn sanitize_note_name(name: &str) -> String {
    let trimmed = name.trim();
    let mut file_name = if trimmed.is_empty() {
        DEFAULT_NOTE_TITLE.to_string()
    } else {
        trimmed.to_string()
    };
    if !file_name.to_lowercase().ends_with(NOTE_EXTENSION) {
        file_name.push_str(NOTE_EXTENSION);
    }
    file_name.replace(ILLEGAL_NAME_CHARS, "_")
}

/// `notes/Todo.txt` -> `notes/Todo.txt.highlights.json`
pub fn sidecar_path(note_path: &Path) -> PathBuf {
    let mut raw: OsString = note_path.as_os_str().to_owned();
    raw.push(SIDECAR_SUFFIX);
    PathBuf::from(raw)
}

/// A note on disk, addressed by its sanitized file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NoteHandle {
    file_name: String,
    path: PathBuf,
}

impl NoteHandle {
    pub(crate) fn new(dir: &Path, file_name: String) -> Self {
        let path = dir.join(&file_name);
        Self { file_name, path }
    }

    /// File name including the `.txt` extension
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// File name without the extension
    pub fn title(&self) -> &str {
        self.file_name
            .get(..self.file_name.len().saturating_sub(NOTE_EXTENSION.len()))
            .unwrap_or(&self.file_name)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sidecar_path(&self) -> PathBuf {
        sidecar_path(&self.path)
    }
}

impl std::fmt::Display for NoteHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.file_name)
    }
}

/// Body and highlights read back from disk.
#[derive(Debug, Clone)]
pub struct LoadedNote {
    pub handle: NoteHandle,
    pub text: String,
    pub ranges: RangeSet,
}
