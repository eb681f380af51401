use super::*;

fn range(start: usize, length: usize, color: &str) -> HighlightRange {
    HighlightRange::new(start, length, Some(color))
}

// =============================================================================
// sanitize
// =============================================================================

#[test]
fn test_sanitize_truncates_tail_overrun() {
    let cleaned = sanitize(&[range(5, 10, "#fff")], 8);
    assert_eq!(cleaned.len(), 1);
    assert_eq!(cleaned[0].start, 5);
    assert_eq!(cleaned[0].length, 3);
}

#[test]
fn test_sanitize_drops_range_starting_at_end() {
    assert!(sanitize(&[range(5, 10, "#fff")], 5).is_empty());
    assert!(sanitize(&[range(9, 1, "#fff")], 5).is_empty());
}

#[test]
fn test_sanitize_drops_zero_length() {
    assert!(sanitize(&[range(0, 0, "#fff")], 10).is_empty());
}

#[test]
fn test_sanitize_removes_exact_duplicates() {
    let ranges = vec![range(1, 2, "#fff"), range(1, 2, "#fff"), range(1, 2, "#000")];
    let cleaned = sanitize(&ranges, 10);
    assert_eq!(cleaned.len(), 2);
}

#[test]
fn test_sanitize_dedups_after_clamping() {
    // Both clamp to (5, 3) in an 8-char document
    let ranges = vec![range(5, 10, "#fff"), range(5, 3, "#fff")];
    assert_eq!(sanitize(&ranges, 8).len(), 1);
}

#[test]
fn test_sanitize_keeps_snapshot_and_missing_color() {
    let ranges = vec![
        HighlightRange::new(0, 3, None).with_snapshot("abc"),
        range(0, 3, "#fff"),
    ];
    let cleaned = sanitize(&ranges, 3);
    assert_eq!(cleaned.len(), 2);
    assert_eq!(cleaned[0].color, None);
    assert_eq!(cleaned[0].snapshot.as_deref(), Some("abc"));
}

#[test]
fn test_sanitize_is_idempotent() {
    let ranges = vec![
        range(0, 4, "#fff"),
        range(3, 100, "#000"),
        range(3, 100, "#000"),
        range(50, 1, "#fff"),
        range(2, 0, "#fff"),
        range(7, 1, "#abc"),
        HighlightRange::new(1, 1, None),
    ];
    for doc_len in [0, 1, 4, 8, 20] {
        let once = sanitize(&ranges, doc_len);
        let twice = sanitize(&once, doc_len);
        assert_eq!(once, twice, "doc_len = {}", doc_len);
    }
}

#[test]
fn test_sanitize_handles_huge_lengths_without_overflow() {
    let cleaned = sanitize(&[range(2, usize::MAX, "#fff")], 6);
    assert_eq!(cleaned[0].length, 4);
}

// =============================================================================
// add
// =============================================================================

#[test]
fn test_add_rejects_empty_selection() {
    let mut set = RangeSet::new();
    let result = set.add("hello", 3, 3, "#FFD700");
    assert!(matches!(result, Err(NotesError::NoSelection)));

    let reversed = set.add("hello", 4, 2, "#FFD700");
    assert!(matches!(reversed, Err(NotesError::NoSelection)));
    assert!(set.is_empty());
}

#[test]
fn test_add_rejects_selection_past_end() {
    let mut set = RangeSet::new();
    // Clamped to [5, 5) in a 5-char document
    let result = set.add("hello", 7, 12, "#FFD700");
    assert!(matches!(result, Err(NotesError::NoSelection)));
}

#[test]
fn test_add_rejects_non_hex_color() {
    let mut set = RangeSet::new();
    let result = set.add("hello", 0, 2, "yellow");
    assert!(matches!(result, Err(NotesError::InvalidColor(_))));
    assert!(set.is_empty());
}

#[test]
fn test_add_twice_is_idempotent() {
    let mut set = RangeSet::new();
    assert_eq!(set.add("hello world", 0, 5, "#FFD700").unwrap(), AddOutcome::Added);
    assert_eq!(
        set.add("hello world", 0, 5, "#FFD700").unwrap(),
        AddOutcome::AlreadyPresent
    );
    assert_eq!(set.len(), 1);
}

#[test]
fn test_add_same_span_different_color_is_new_range() {
    let mut set = RangeSet::new();
    set.add("hello world", 0, 5, "#FFD700").unwrap();
    set.add("hello world", 0, 5, "#FF6B6B").unwrap();
    assert_eq!(set.len(), 2);
}

#[test]
fn test_add_records_covered_text() {
    let mut set = RangeSet::new();
    set.add("hello world", 6, 11, "#1E90FF").unwrap();
    let added = &set.as_slice()[0];
    assert_eq!(added.start, 6);
    assert_eq!(added.length, 5);
    assert_eq!(added.snapshot.as_deref(), Some("world"));
}

#[test]
fn test_add_clamps_tail_of_selection() {
    let mut set = RangeSet::new();
    set.add("hello", 3, 50, "#fff").unwrap();
    assert_eq!(set.as_slice()[0].length, 2);
    assert_eq!(set.as_slice()[0].snapshot.as_deref(), Some("lo"));
}

#[test]
fn test_add_counts_characters_not_bytes() {
    let mut set = RangeSet::new();
    set.add("çok güzel", 4, 9, "#fff").unwrap();
    assert_eq!(set.as_slice()[0].snapshot.as_deref(), Some("güzel"));
}

#[test]
fn test_is_hex_color() {
    assert!(is_hex_color("#fff"));
    assert!(is_hex_color("#FFD700"));
    assert!(!is_hex_color("FFD700"));
    assert!(!is_hex_color("#FFD70"));
    assert!(!is_hex_color("#GGGGGG"));
}

// =============================================================================
// clear
// =============================================================================

#[test]
fn test_clear_removes_partially_overlapping_range() {
    let mut set = RangeSet::from(vec![range(0, 10, "#fff")]);
    assert_eq!(set.clear_overlapping(5, 15), 1);
    assert!(set.is_empty());
}

#[test]
fn test_clear_leaves_touching_ranges() {
    let mut set = RangeSet::from(vec![range(0, 5, "#fff"), range(10, 5, "#000")]);
    assert_eq!(set.clear_overlapping(5, 10), 0);
    assert_eq!(set.len(), 2);
}

#[test]
fn test_clear_removes_only_overlapping() {
    let mut set = RangeSet::from(vec![
        range(0, 3, "#fff"),
        range(4, 3, "#000"),
        range(20, 3, "#abc"),
    ]);
    assert_eq!(set.clear_overlapping(2, 5), 2);
    assert_eq!(set.as_slice(), &[range(20, 3, "#abc")]);
}

#[test]
fn test_clear_with_empty_span_is_noop() {
    let mut set = RangeSet::from(vec![range(0, 10, "#fff")]);
    assert_eq!(set.clear_overlapping(4, 4), 0);
    assert_eq!(set.len(), 1);
}

// =============================================================================
// resolve_for_render
// =============================================================================

#[test]
fn test_resolve_hides_drifted_range_and_restores_it() {
    let set = RangeSet::from(vec![range(2, 3, "#fff").with_snapshot("abc")]);

    assert_eq!(
        set.resolve_for_render("xxabcxx"),
        vec![RenderSpan {
            start: 2,
            end: 5,
            color: Some("#fff".into())
        }]
    );

    // Text under the range changed: hidden, but still stored
    assert!(set.resolve_for_render("xxabZxx").is_empty());
    assert_eq!(set.len(), 1);

    // Original text back at the same offsets: visible again
    assert_eq!(set.resolve_for_render("yyabcyy").len(), 1);
}

#[test]
fn test_resolve_renders_ranges_without_snapshot() {
    let set = RangeSet::from(vec![range(0, 2, "#fff")]);
    assert_eq!(set.resolve_for_render("anything").len(), 1);
}

#[test]
fn test_resolve_skips_ranges_past_end() {
    let set = RangeSet::from(vec![range(10, 2, "#fff"), range(1, 2, "#000")]);
    let spans = set.resolve_for_render("abcd");
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].start, 1);
}

#[test]
fn test_resolve_truncated_snapshot_range_is_hidden() {
    // Clamped to "cd", which no longer equals the remembered "cdef"
    let set = RangeSet::from(vec![range(2, 4, "#fff").with_snapshot("cdef")]);
    assert!(set.resolve_for_render("abcd").is_empty());
}

#[test]
fn test_resolve_orders_by_position() {
    let set = RangeSet::from(vec![
        range(6, 2, "#fff"),
        range(0, 2, "#000"),
        range(3, 1, "#abc"),
    ]);
    let starts: Vec<usize> = set
        .resolve_for_render("0123456789")
        .iter()
        .map(|s| s.start)
        .collect();
    assert_eq!(starts, vec![0, 3, 6]);
}

#[test]
fn test_resolve_works_on_rope() {
    let rope = Rope::from_str("über alles");
    let mut set = RangeSet::new();
    set.add(&rope, 0, 4, "#fff").unwrap();
    assert_eq!(set.as_slice()[0].snapshot.as_deref(), Some("über"));
    assert_eq!(set.resolve_for_render(&rope).len(), 1);
}
