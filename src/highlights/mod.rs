//! Highlight (annotation) store
//!
//! Colored spans over a note's plain text, persisted beside the note as a
//! JSON sidecar.
//!
//! ## Module Structure
//! - `range`: `HighlightRange`, `RangeSet`, sanitize / add / clear / render resolution
//! - `sidecar`: lossless JSON encoding and forgiving decoding

mod range;
mod sidecar;

pub use range::{
    is_hex_color, sanitize, AddOutcome, HighlightRange, RangeSet, RenderSpan, TextSource,
};
pub use sidecar::{deserialize, serialize};
