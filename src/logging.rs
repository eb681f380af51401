//! Structured JSONL logging plus a human-readable stderr stream.
//!
//! This module provides dual-output logging:
//! - **JSONL to file** (~/.clip-notes/logs/clip-notes.jsonl) - structured, one event per line
//! - **Pretty to stderr** - compact and human-readable
//!
//! It also keeps the status line: a short ring of the most recent
//! user-facing messages ("Capture ON", "Autosaved.", clipboard errors...).
//!
//! # Usage
//!
//! ```rust,ignore
//! use clip_notes::logging;
//!
//! // MUST keep the guard alive for the duration of the program
//! let _guard = logging::init();
//!
//! tracing::info!(event_type = "app_start", "Application started");
//! logging::status("Capture ON");
//! ```

use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::OnceLock;

use parking_lot::Mutex;
use time::format_description::FormatItem;
use time::macros::format_description;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

static STATUS_BUFFER: OnceLock<Mutex<VecDeque<String>>> = OnceLock::new();
const MAX_STATUS_LINES: usize = 50;

const LOG_FILE_NAME: &str = "clip-notes.jsonl";

/// Wall-clock prefix for stderr lines; the JSONL file carries full RFC 3339.
const STDERR_TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour]:[minute]:[second].[subsecond digits:3]");

/// Guard that must be kept alive for the duration of the program.
/// Dropping this guard will flush and close the log file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize the dual-output logging system.
///
/// Returns a guard that MUST be kept alive for the duration of the program.
/// A log file that cannot be opened degrades to stderr-only logging.
pub fn init() -> Option<LoggingGuard> {
    let log_dir = log_dir();
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("[LOGGING] Failed to create log directory: {}", e);
    }

    let log_path = log_dir.join(LOG_FILE_NAME);

    // Environment filter - default to info, allow override via RUST_LOG
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("[LOGGING] Failed to open log file: {}", e);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer())
                .init();
            return None;
        }
    };

    // Non-blocking writer so a slow disk never stalls the document thread
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file);

    let json_layer = fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(true)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(stderr_layer())
        .init();

    tracing::info!(
        event_type = "app_lifecycle",
        action = "started",
        log_path = %log_path.display(),
        "Application logging initialized"
    );

    Some(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Compact human-readable layer for stderr.
fn stderr_layer<S>() -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(UtcTime::new(STDERR_TIME_FORMAT))
        .with_ansi(true)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .compact()
}

/// Get the log directory path (~/.clip-notes/logs/)
fn log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".clip-notes").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("clip-notes-logs"))
}

/// Get the path to the JSONL log file
pub fn log_path() -> PathBuf {
    log_dir().join(LOG_FILE_NAME)
}

// =============================================================================
// STATUS LINE
// =============================================================================

/// Record a user-facing status message.
pub fn status(message: &str) {
    push_status(message.to_string());
    tracing::info!(event_type = "status", "{}", message);
}

/// Record a status message produced by a failure.
pub fn status_error(category: &str, message: &str) {
    push_status(message.to_string());
    tracing::warn!(event_type = "status", category = category, "{}", message);
}

fn push_status(line: String) {
    let buffer = STATUS_BUFFER.get_or_init(|| Mutex::new(VecDeque::with_capacity(MAX_STATUS_LINES)));
    let mut buf = buffer.lock();
    if buf.len() >= MAX_STATUS_LINES {
        buf.pop_front();
    }
    buf.push_back(line);
}

/// Most recent status messages, oldest first.
pub fn recent_status() -> Vec<String> {
    STATUS_BUFFER
        .get()
        .map(|buffer| buffer.lock().iter().cloned().collect())
        .unwrap_or_default()
}

/// The current status line, if anything was reported yet.
pub fn current_status() -> Option<String> {
    STATUS_BUFFER
        .get()
        .and_then(|buffer| buffer.lock().back().cloned())
}

// =============================================================================
// STRUCTURED LOGGING HELPERS
// =============================================================================

/// Length reported by the log helpers, in characters like every other
/// document offset.
fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Log a capture event with structured fields
pub fn log_capture_event(origin: &str, text: &str, accepted: bool) {
    let text_len = char_len(text);
    tracing::debug!(
        event_type = "capture_event",
        origin = origin,
        text_len = text_len,
        accepted = accepted,
        "Capture from {} ({} chars, accepted={})",
        origin,
        text_len,
        accepted
    );
}

/// Log a persistence operation with structured fields
pub fn log_save(note: &str, text: &str, range_count: usize, trigger: &str) {
    let text_len = char_len(text);
    tracing::debug!(
        event_type = "note_saved",
        note = note,
        text_len = text_len,
        range_count = range_count,
        trigger = trigger,
        "Saved {}",
        note
    );
}
