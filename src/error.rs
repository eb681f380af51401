use std::path::PathBuf;

use thiserror::Error;
use tracing::{error, warn};

/// Error severity for status display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,    // informational, nothing was lost
    Warning, // recoverable, operation skipped
    Error,   // operation failed, prior state intact
}

/// The three failure classes of the note engine.
///
/// None of them is fatal to the process: validation aborts one operation
/// without touching state, I/O failures are reported and retried (polling)
/// or abandoned (hotkey, save), data failures are recovered silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Io,
    Data,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Io => "io",
            ErrorKind::Data => "data",
        }
    }
}

/// Domain-specific errors for the note engine
#[derive(Error, Debug)]
pub enum NotesError {
    #[error("No text selected")]
    NoSelection,

    #[error("A note named '{0}' already exists")]
    NoteExists(String),

    #[error("Note '{0}' not found")]
    NoteNotFound(String),

    #[error("No active note")]
    NoActiveNote,

    #[error("Invalid highlight color '{0}'")]
    InvalidColor(String),

    #[error("Edit range {start}..{end} is outside the document (length {len})")]
    EditOutOfBounds { start: usize, end: usize, len: usize },

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Keypress synthesis failed: {0}")]
    Keypress(String),

    #[error("Hotkey error: {0}")]
    Hotkey(String),

    #[error("Malformed data: {0}")]
    Data(String),
}

impl NotesError {
    /// Wrap an `io::Error` with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoSelection
            | Self::NoteExists(_)
            | Self::NoteNotFound(_)
            | Self::NoActiveNote
            | Self::InvalidColor(_)
            | Self::EditOutOfBounds { .. } => ErrorKind::Validation,
            Self::Io { .. } | Self::Clipboard(_) | Self::Keypress(_) | Self::Hotkey(_) => {
                ErrorKind::Io
            }
            Self::Data(_) => ErrorKind::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.kind() {
            ErrorKind::Validation => ErrorSeverity::Warning,
            ErrorKind::Io => ErrorSeverity::Error,
            ErrorKind::Data => ErrorSeverity::Info,
        }
    }

    /// Text suitable for the status line.
    pub fn user_message(&self) -> String {
        match self {
            Self::NoSelection => "Select some text first.".to_string(),
            Self::NoteExists(name) => format!("A note named '{}' already exists.", name),
            Self::NoteNotFound(name) => format!("Note '{}' was not found.", name),
            Self::NoActiveNote => "Select or create a note first.".to_string(),
            Self::InvalidColor(color) => format!("'{}' is not a hex color.", color),
            Self::EditOutOfBounds { .. } => "Edit is outside the document.".to_string(),
            Self::Io { path, source } => {
                format!("Could not access {}: {}", path.display(), source)
            }
            Self::Clipboard(msg) => format!("Error (clipboard): {}", msg),
            Self::Keypress(msg) => format!("Error (hotkey): {}", msg),
            Self::Hotkey(msg) => format!("Hotkey unavailable: {}", msg),
            Self::Data(msg) => format!("Ignored malformed data: {}", msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, NotesError>;

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and the user doesn't need to know.
///
/// # Examples
///
/// ```ignore
/// use clip_notes::error::ResultExt;
///
/// // Log and continue if the flush fails
/// engine.flush().log_err();
/// ```
pub trait ResultExt<T> {
    /// Log error with caller location and return None. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_warnings() {
        assert_eq!(NotesError::NoSelection.kind(), ErrorKind::Validation);
        assert_eq!(
            NotesError::NoteExists("a.txt".into()).severity(),
            ErrorSeverity::Warning
        );
    }

    #[test]
    fn test_io_errors_carry_path() {
        let err = NotesError::io(
            "/tmp/missing.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.user_message().contains("/tmp/missing.txt"));
    }

    #[test]
    fn test_data_errors_are_informational() {
        let err = NotesError::Data("not an array".into());
        assert_eq!(err.kind(), ErrorKind::Data);
        assert_eq!(err.severity(), ErrorSeverity::Info);
    }

    #[test]
    fn test_log_err_returns_value_or_none() {
        let ok: std::result::Result<u32, NotesError> = Ok(3);
        assert_eq!(ok.log_err(), Some(3));

        let failed: std::result::Result<u32, NotesError> = Err(NotesError::NoActiveNote);
        assert_eq!(failed.warn_on_err(), None);
    }
}
