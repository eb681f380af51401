//! Sidecar encoding of a [`RangeSet`].
//!
//! The sidecar is a pretty-printed JSON array of
//! `{"start": int, "length": int, "color"?: string, "text"?: string}` records.
//! Decoding never fails: a sidecar that is not a JSON array yields an empty
//! set, and individual records that do not have the right shape are skipped.
//! A broken sidecar must never keep a note body from opening.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::range::{HighlightRange, RangeSet};
use crate::error::{NotesError, Result};

/// Wire form of one record. Signed so negative offsets parse and get dropped.
#[derive(Debug, Deserialize)]
struct RawRange {
    start: i64,
    length: i64,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

impl RawRange {
    fn into_range(self) -> Option<HighlightRange> {
        let start = usize::try_from(self.start).ok()?;
        let length = usize::try_from(self.length).ok().filter(|l| *l > 0)?;
        Some(HighlightRange {
            start,
            length,
            color: self.color,
            snapshot: self.text,
        })
    }
}

/// Encode ranges as the sidecar JSON document.
pub fn serialize(ranges: &RangeSet) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(ranges.as_slice())
        .map_err(|e| NotesError::Data(format!("failed to encode highlights: {}", e)))
}

/// Decode a sidecar document, recovering from any malformation.
pub fn deserialize(bytes: &[u8]) -> RangeSet {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return RangeSet::new();
    }

    let records = match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Array(records)) => records,
        Ok(other) => {
            warn!(
                kind = value_kind(&other),
                "Highlight sidecar is not an array, ignoring"
            );
            return RangeSet::new();
        }
        Err(e) => {
            warn!(error = %e, "Highlight sidecar is not valid JSON, ignoring");
            return RangeSet::new();
        }
    };

    let total = records.len();
    let ranges: RangeSet = records
        .into_iter()
        .filter_map(|record| serde_json::from_value::<RawRange>(record).ok())
        .filter_map(RawRange::into_range)
        .collect();

    if ranges.len() < total {
        debug!(
            kept = ranges.len(),
            skipped = total - ranges.len(),
            "Skipped malformed highlight records"
        );
    }
    ranges
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
