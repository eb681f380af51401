//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// Clipboard polling interval. Bounds the CPU/latency trade-off of the poll loop.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 600;

/// Delay between the synthesized copy keypress and the clipboard re-read,
/// giving the OS time to publish the new clipboard content.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 150;

/// Quiet period after the last edit before an autosave is written.
pub const DEFAULT_AUTOSAVE_QUIET_MS: u64 = 600;

/// Identical captures arriving within this window are collapsed into one.
pub const DEFAULT_DEDUP_WINDOW_MS: u64 = 1000;

/// Default notes directory (relative to the home directory)
pub const DEFAULT_NOTES_DIR: &str = "~/Documents/ClipNotes";

/// Default capture hotkey: Ctrl+Shift+S
pub const DEFAULT_CAPTURE_MODIFIERS: &[&str] = &["ctrl", "shift"];
pub const DEFAULT_CAPTURE_KEY: &str = "KeyS";

/// Highlight palette offered to the user
pub const DEFAULT_PALETTE: &[&str] = &[
    "#FFD700", "#FF6B6B", "#4ECDC4", "#1E90FF", "#FF8C00", "#ADFF2F", "#DA70D6", "#FF1493",
    "#40E0D0",
];

/// Config file location, overridable through `CONFIG_PATH_ENV`
pub const DEFAULT_CONFIG_PATH: &str = "~/.clip-notes/config.json";
pub const CONFIG_PATH_ENV: &str = "CLIP_NOTES_CONFIG";
