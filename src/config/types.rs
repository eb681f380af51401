//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::defaults::*;

// ============================================
// HOTKEY CONFIG
// ============================================

/// A global key chord: modifier names plus a key code name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotkeyConfig {
    /// "ctrl", "shift", "alt", "meta"
    pub modifiers: Vec<String>,
    /// Key code name such as "KeyS", "Digit1", "F5"
    pub key: String,
}

impl HotkeyConfig {
    /// Ctrl+Shift+S
    pub fn default_capture_hotkey() -> Self {
        HotkeyConfig {
            modifiers: DEFAULT_CAPTURE_MODIFIERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            key: DEFAULT_CAPTURE_KEY.to_string(),
        }
    }

    /// Display form, e.g. "ctrl+shift+KeyS"
    pub fn display(&self) -> String {
        let mut parts: Vec<&str> = self.modifiers.iter().map(String::as_str).collect();
        parts.push(&self.key);
        parts.join("+")
    }
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self::default_capture_hotkey()
    }
}

// ============================================
// MAIN CONFIG
// ============================================

/// Application configuration loaded from ~/.clip-notes/config.json
///
/// Every field is optional; the getters fill in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding the `.txt` notes and their sidecars
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes_dir: Option<String>,
    /// Clipboard polling interval in milliseconds (default: 600)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,
    /// Delay after the synthesized copy before re-reading the clipboard (default: 150)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settle_delay_ms: Option<u64>,
    /// Quiet period before autosave (default: 600)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autosave_quiet_ms: Option<u64>,
    /// Window in which an identical capture is dropped (default: 1000)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dedup_window_ms: Option<u64>,
    /// Capture hotkey (default: Ctrl+Shift+S)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture_hotkey: Option<HotkeyConfig>,
    /// Highlight palette colors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub palette: Option<Vec<String>>,
}

impl Config {
    /// Notes directory with `~` expanded.
    pub fn notes_dir(&self) -> PathBuf {
        let raw = self.notes_dir.as_deref().unwrap_or(DEFAULT_NOTES_DIR);
        PathBuf::from(shellexpand::tilde(raw).as_ref())
    }

    pub fn poll_interval(&self) -> Duration {
        // A zero interval would spin the poll thread
        Duration::from_millis(
            self.poll_interval_ms
                .filter(|ms| *ms > 0)
                .unwrap_or(DEFAULT_POLL_INTERVAL_MS),
        )
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms.unwrap_or(DEFAULT_SETTLE_DELAY_MS))
    }

    pub fn autosave_quiet(&self) -> Duration {
        Duration::from_millis(
            self.autosave_quiet_ms
                .unwrap_or(DEFAULT_AUTOSAVE_QUIET_MS),
        )
    }

    pub fn dedup_window(&self) -> Duration {
        Duration::from_millis(self.dedup_window_ms.unwrap_or(DEFAULT_DEDUP_WINDOW_MS))
    }

    pub fn capture_hotkey(&self) -> HotkeyConfig {
        self.capture_hotkey
            .clone()
            .unwrap_or_else(HotkeyConfig::default_capture_hotkey)
    }

    pub fn palette(&self) -> Vec<String> {
        match &self.palette {
            Some(colors) if !colors.is_empty() => colors.clone(),
            _ => DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}
