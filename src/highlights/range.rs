//! Highlight ranges over a plain-text document.
//!
//! Offsets and lengths count characters (Unicode scalar values), not bytes.
//! The document text is authoritative: ranges that no longer fit are dropped
//! or truncated by [`sanitize`], and ranges whose remembered text no longer
//! matches the document are hidden by [`RangeSet::resolve_for_render`]
//! without being deleted, so an undo that restores the text brings them back.

use std::collections::HashSet;

use ropey::Rope;
use serde::{Deserialize, Serialize};

use crate::error::{NotesError, Result};

/// Character-indexed read access to document text.
pub trait TextSource {
    fn char_len(&self) -> usize;
    /// Characters in `[start, end)`. Callers keep `start <= end <= char_len()`.
    fn chars_between(&self, start: usize, end: usize) -> String;
}

impl TextSource for str {
    fn char_len(&self) -> usize {
        self.chars().count()
    }

    fn chars_between(&self, start: usize, end: usize) -> String {
        self.chars().skip(start).take(end.saturating_sub(start)).collect()
    }
}

impl TextSource for String {
    fn char_len(&self) -> usize {
        self.as_str().char_len()
    }

    fn chars_between(&self, start: usize, end: usize) -> String {
        self.as_str().chars_between(start, end)
    }
}

impl TextSource for Rope {
    fn char_len(&self) -> usize {
        self.len_chars()
    }

    fn chars_between(&self, start: usize, end: usize) -> String {
        self.slice(start..end).to_string()
    }
}

/// A colored span, plus the text it covered when it was created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HighlightRange {
    pub start: usize,
    pub length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Covered text at creation time; drift detection compares against it.
    #[serde(default, rename = "text", skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<String>,
}

impl HighlightRange {
    pub fn new(start: usize, length: usize, color: Option<&str>) -> Self {
        Self {
            start,
            length,
            color: color.map(str::to_string),
            snapshot: None,
        }
    }

    pub fn with_snapshot(mut self, snapshot: impl Into<String>) -> Self {
        self.snapshot = Some(snapshot.into());
        self
    }

    pub fn end(&self) -> usize {
        self.start.saturating_add(self.length)
    }

    /// Identity used for duplicate suppression: `(start, length, color)`.
    fn key(&self) -> (usize, usize, Option<&str>) {
        (self.start, self.length, self.color.as_deref())
    }

    /// Bounds after the clamp rule, or None when the range is dropped.
    ///
    /// A range starting at or past the end is dropped; one that only overruns
    /// at its tail is truncated to end at `doc_len`.
    pub fn clamped(&self, doc_len: usize) -> Option<(usize, usize)> {
        if self.length == 0 || self.start >= doc_len {
            return None;
        }
        let end = self.end().min(doc_len);
        Some((self.start, end))
    }

    /// Open-interval overlap with `[start, end)`. Touching is not overlapping.
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        start.max(self.start) < end.min(self.end())
    }
}

/// Result of [`RangeSet::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// An identical `(start, length, color)` entry already existed.
    AlreadyPresent,
}

/// A span ready for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSpan {
    pub start: usize,
    pub end: usize,
    pub color: Option<String>,
}

/// Apply the clamp/drop rules and remove exact duplicates.
///
/// Deterministic for a given input order; the first of a set of duplicates
/// survives. Idempotent: sanitizing a sanitized set changes nothing.
pub fn sanitize<'a>(
    ranges: impl IntoIterator<Item = &'a HighlightRange>,
    doc_len: usize,
) -> Vec<HighlightRange> {
    let mut seen = HashSet::new();
    let mut cleaned = Vec::new();

    for range in ranges {
        let Some((start, end)) = range.clamped(doc_len) else {
            continue;
        };
        let candidate = HighlightRange {
            start,
            length: end - start,
            color: range.color.clone(),
            snapshot: range.snapshot.clone(),
        };
        let key = (
            candidate.start,
            candidate.length,
            candidate.color.clone(),
        );
        if seen.insert(key) {
            cleaned.push(candidate);
        }
    }

    cleaned
}

/// Accept `#RGB` and `#RRGGBB`.
pub fn is_hex_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(digits) => {
            matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

/// The highlight ranges of one note. Order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeSet {
    ranges: Vec<HighlightRange>,
}

impl RangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HighlightRange> {
        self.ranges.iter()
    }

    pub fn as_slice(&self) -> &[HighlightRange] {
        &self.ranges
    }

    pub fn clear(&mut self) {
        self.ranges.clear();
    }

    /// A copy with the clamp/drop and duplicate rules applied for `doc_len`.
    pub fn sanitized(&self, doc_len: usize) -> RangeSet {
        RangeSet {
            ranges: sanitize(&self.ranges, doc_len),
        }
    }

    /// Highlight `[start, end)` of `text` with `color`.
    ///
    /// The selection is first clamped to the document. An empty selection is
    /// rejected with `NoSelection`; an identical existing entry makes this a
    /// no-op. The new range remembers the text it covers.
    pub fn add<T: TextSource + ?Sized>(
        &mut self,
        text: &T,
        start: usize,
        end: usize,
        color: &str,
    ) -> Result<AddOutcome> {
        let doc_len = text.char_len();
        let start = start.min(doc_len);
        let end = end.min(doc_len).max(start);
        if end <= start {
            return Err(NotesError::NoSelection);
        }
        if !is_hex_color(color) {
            return Err(NotesError::InvalidColor(color.to_string()));
        }

        let candidate = HighlightRange::new(start, end - start, Some(color));
        if self.ranges.iter().any(|r| r.key() == candidate.key()) {
            return Ok(AddOutcome::AlreadyPresent);
        }

        self.ranges
            .push(candidate.with_snapshot(text.chars_between(start, end)));
        Ok(AddOutcome::Added)
    }

    /// Remove every range overlapping `[start, end)`. Partially overlapped
    /// ranges are removed whole, never split. Returns how many were removed.
    pub fn clear_overlapping(&mut self, start: usize, end: usize) -> usize {
        let before = self.ranges.len();
        self.ranges.retain(|r| !r.overlaps(start, end));
        before - self.ranges.len()
    }

    /// Spans to paint for the current `text`, ordered by position.
    ///
    /// Ranges dropped by the clamp rule are skipped, and so are ranges whose
    /// snapshot differs from the text now at their (clamped) bounds. Nothing
    /// is removed from the set.
    pub fn resolve_for_render<T: TextSource + ?Sized>(&self, text: &T) -> Vec<RenderSpan> {
        let doc_len = text.char_len();
        let mut spans: Vec<RenderSpan> = self
            .ranges
            .iter()
            .filter_map(|range| {
                let (start, end) = range.clamped(doc_len)?;
                if let Some(expected) = &range.snapshot {
                    if text.chars_between(start, end) != *expected {
                        return None;
                    }
                }
                Some(RenderSpan {
                    start,
                    end,
                    color: range.color.clone(),
                })
            })
            .collect();

        spans.sort_by(|a, b| (a.start, a.end).cmp(&(b.start, b.end)));
        spans
    }
}

impl From<Vec<HighlightRange>> for RangeSet {
    fn from(ranges: Vec<HighlightRange>) -> Self {
        Self { ranges }
    }
}

impl FromIterator<HighlightRange> for RangeSet {
    fn from_iter<I: IntoIterator<Item = HighlightRange>>(iter: I) -> Self {
        Self {
            ranges: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RangeSet {
    type Item = &'a HighlightRange;
    type IntoIter = std::slice::Iter<'a, HighlightRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}

#[cfg(test)]
#[path = "range_tests.rs"]
mod tests;
