//! Notes Module
//!
//! Plain-text notes on disk, each paired with a highlight sidecar.
//!
//! ## Usage
//! ```ignore
//! use clip_notes::notes::NoteStore;
//!
//! let store = NoteStore::open("/home/me/Documents/ClipNotes")?;
//! let handle = store.create("Reading list")?;
//! let note = store.load(&handle)?;
//! ```

mod model;
mod storage;

pub use model::{
    sanitize_note_name, sidecar_path, LoadedNote, NoteHandle, DEFAULT_NOTE_TITLE,
    NOTE_EXTENSION, SIDECAR_SUFFIX,
};
pub use storage::NoteStore;
