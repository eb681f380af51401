//! Document Module
//!
//! The active note's text and highlights, owned by a single thread.
//!
//! - `buffer` - rope-backed text with undo/redo
//! - `engine` - active note, autosave, capture acceptance, highlights
//! - `actor` - the document-owning message loop

mod actor;
mod buffer;
mod engine;

pub use actor::{request_snapshot, DocumentActor, DocumentCommand, DocumentMessage};
pub use buffer::{captured_insertion, insert_captured_text, Buffer, SEPARATOR};
pub use engine::{CaptureOutcome, DocumentEngine, DocumentSnapshot};
