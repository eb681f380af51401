//! Configuration loading from the file system

use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use super::defaults::{CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
use super::types::Config;

/// Resolve the config path: `$CLIP_NOTES_CONFIG`, else ~/.clip-notes/config.json
pub fn config_path() -> PathBuf {
    let raw = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    PathBuf::from(shellexpand::tilde(&raw).as_ref())
}

/// Load configuration from the default location.
///
/// Returns `Config::default()` if the file is missing or unreadable.
pub fn load_config() -> Config {
    load_config_from(&config_path())
}

/// Load configuration from an explicit path.
///
/// Never fails: a missing file, an unreadable file, or malformed JSON all log
/// and fall back to defaults.
#[instrument(name = "load_config", skip_all, fields(path = %path.display()))]
pub fn load_config_from(path: &Path) -> Config {
    if !path.exists() {
        info!("Config file not found, using defaults");
        return Config::default();
    }

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            warn!(error = %e, "Failed to read config file, using defaults");
            return Config::default();
        }
    };

    match serde_json::from_str::<Config>(&contents) {
        Ok(config) => {
            info!("Successfully loaded config");
            config
        }
        Err(e) => {
            // Provide a hint for the most common mistake
            let hint = if e.to_string().contains("missing field `key`")
                || e.to_string().contains("missing field `modifiers`")
            {
                "captureHotkey requires 'modifiers' (array) and 'key' (string), e.g. \
                 {\"modifiers\": [\"ctrl\", \"shift\"], \"key\": \"KeyS\"}"
            } else {
                ""
            };
            warn!(error = %e, hint = %hint, "Failed to parse config JSON, using defaults");
            Config::default()
        }
    }
}
