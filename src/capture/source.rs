//! System clipboard access and copy-keypress synthesis.
//!
//! The clipboard is an external shared resource with no locking; callers rely
//! on content comparison, never on exclusive access.

use arboard::Clipboard;
use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use std::thread;
use std::time::Duration;
use tracing::debug;

use crate::error::{NotesError, Result};

/// Where captured text comes from.
pub trait ClipboardSource: Send + Sync {
    /// Current clipboard text. An empty clipboard is `Ok("")`.
    fn read_text(&self) -> Result<String>;

    /// Ask the focused application to copy its selection.
    fn simulate_copy(&self) -> Result<()>;
}

/// The OS clipboard via `arboard`, copy synthesis via `enigo`.
///
/// A fresh `Clipboard` is opened per read so the source can be shared across
/// the poll thread and the hotkey thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl ClipboardSource for SystemClipboard {
    fn read_text(&self) -> Result<String> {
        let mut clipboard =
            Clipboard::new().map_err(|e| NotesError::Clipboard(e.to_string()))?;
        match clipboard.get_text() {
            Ok(text) => Ok(text),
            // Non-text or empty clipboard
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(e) => Err(NotesError::Clipboard(e.to_string())),
        }
    }

    fn simulate_copy(&self) -> Result<()> {
        let mut enigo =
            Enigo::new(&Settings::default()).map_err(|e| NotesError::Keypress(e.to_string()))?;

        let modifier = copy_modifier();
        enigo
            .key(modifier, Direction::Press)
            .map_err(|e| NotesError::Keypress(e.to_string()))?;
        let pressed = enigo.key(Key::Unicode('c'), Direction::Click);
        // Always release the modifier, even if the click failed
        thread::sleep(Duration::from_millis(5));
        let released = enigo.key(modifier, Direction::Release);

        pressed.map_err(|e| NotesError::Keypress(e.to_string()))?;
        released.map_err(|e| NotesError::Keypress(e.to_string()))?;

        debug!("Simulated copy keypress");
        Ok(())
    }
}

#[cfg(target_os = "macos")]
fn copy_modifier() -> Key {
    Key::Meta
}

#[cfg(not(target_os = "macos"))]
fn copy_modifier() -> Key {
    Key::Control
}

// ============================================================================
// System Tests (require `cargo test --features system-tests`)
// ============================================================================

#[cfg(all(test, feature = "system-tests"))]
mod system_tests {
    use super::*;

    #[test]
    #[ignore] // Reads the real clipboard
    fn test_read_text_does_not_fail() {
        let text = SystemClipboard::new().read_text();
        assert!(text.is_ok(), "clipboard read failed: {:?}", text.err());
    }
}
