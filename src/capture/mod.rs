//! Capture Module
//!
//! Watches the system clipboard and a global key chord, and publishes new
//! clipboard text to whoever owns the document.
//!
//! - `source` - clipboard reads and copy-keypress synthesis
//! - `chord` - key chord parsing and OS-wide registration
//! - `worker` - the two-state background worker
//! - `dedup` - consumer-side duplicate filter

mod chord;
mod dedup;
mod source;
mod worker;

pub use chord::{parse_code, parse_modifier, ChordSource, GlobalChordSource, KeyChord};
pub use dedup::CaptureFilter;
pub use source::{ClipboardSource, SystemClipboard};
pub use worker::{
    CaptureEvent, CaptureOrigin, CaptureSettings, CaptureWorker, CapturedEvent, WorkerState,
    STATUS_APPENDED, STATUS_CAPTURE_OFF, STATUS_CAPTURE_ON, STATUS_NOTHING_SELECTED,
};
