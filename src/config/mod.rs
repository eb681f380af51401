//! Configuration module - application settings and user preferences
//!
//! - `defaults` - All default constant values
//! - `types` - Configuration struct definitions (Config, HotkeyConfig)
//! - `loader` - File system loading and parsing

mod defaults;
mod loader;
mod types;

pub use defaults::{
    CONFIG_PATH_ENV, DEFAULT_AUTOSAVE_QUIET_MS, DEFAULT_DEDUP_WINDOW_MS, DEFAULT_PALETTE,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_SETTLE_DELAY_MS,
};
pub use loader::{config_path, load_config, load_config_from};
pub use types::{Config, HotkeyConfig};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
