//! clip-notes - plain-text notes with highlight overlays and clipboard capture
//!
//! The library holds the two engines of the application: the highlight
//! store that keeps colored ranges valid across edits and reloads, and the
//! background capture worker that feeds clipboard text to the active note.
//! A UI (here, the `clip-notes` binary) is a thin client of both.

pub mod capture;
pub mod config;
pub mod debounce;
pub mod document;
pub mod error;
pub mod highlights;
pub mod logging;
pub mod notes;
