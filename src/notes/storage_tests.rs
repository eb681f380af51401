use super::*;
use crate::highlights::HighlightRange;
use tempfile::TempDir;

fn create_test_store() -> (NoteStore, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = NoteStore::open(dir.path().join("notes")).unwrap();
    (store, dir)
}

fn sample_ranges() -> RangeSet {
    let mut ranges = RangeSet::new();
    ranges.add("hello world", 0, 5, "#FFD700").unwrap();
    ranges.add("hello world", 6, 11, "#4ECDC4").unwrap();
    ranges
}

#[test]
fn test_open_creates_directory() {
    let (store, _dir) = create_test_store();
    assert!(store.dir().is_dir());
}

#[test]
fn test_create_writes_empty_body_and_sidecar() {
    let (store, _dir) = create_test_store();
    let handle = store.create("Ideas").unwrap();

    assert_eq!(handle.file_name(), "Ideas.txt");
    assert_eq!(fs::read_to_string(handle.path()).unwrap(), "");
    assert_eq!(fs::read_to_string(handle.sidecar_path()).unwrap(), "[]");
}

#[test]
fn test_create_rejects_existing_name() {
    let (store, _dir) = create_test_store();
    store.create("Ideas").unwrap();
    let again = store.create("Ideas.txt");
    assert!(matches!(again, Err(NotesError::NoteExists(name)) if name == "Ideas.txt"));
}

#[test]
fn test_list_is_sorted_case_insensitively_and_skips_sidecars() {
    let (store, _dir) = create_test_store();
    store.create("banana").unwrap();
    store.create("Apple").unwrap();
    store.create("cherry").unwrap();
    fs::write(store.dir().join("stray.json"), "{}").unwrap();

    let names: Vec<String> = store
        .list()
        .unwrap()
        .iter()
        .map(|h| h.file_name().to_string())
        .collect();
    assert_eq!(names, vec!["Apple.txt", "banana.txt", "cherry.txt"]);
}

#[test]
fn test_save_then_load_round_trip() {
    let (store, _dir) = create_test_store();
    let handle = store.create("Journal").unwrap();
    let ranges = sample_ranges();

    store.save(&handle, "hello world", &ranges).unwrap();
    let loaded = store.load(&handle).unwrap();

    assert_eq!(loaded.text, "hello world");
    assert_eq!(loaded.ranges, ranges);
}

#[test]
fn test_save_leaves_no_temp_files() {
    let (store, _dir) = create_test_store();
    let handle = store.create("Journal").unwrap();
    store.save(&handle, "text", &RangeSet::new()).unwrap();

    let leftovers: Vec<_> = fs::read_dir(store.dir())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_load_missing_sidecar_is_empty() {
    let (store, _dir) = create_test_store();
    let handle = store.handle("Plain");
    fs::write(handle.path(), "just text").unwrap();

    let loaded = store.load(&handle).unwrap();
    assert_eq!(loaded.text, "just text");
    assert!(loaded.ranges.is_empty());
}

#[test]
fn test_load_malformed_sidecar_still_opens_body() {
    let (store, _dir) = create_test_store();
    let handle = store.handle("Broken");
    fs::write(handle.path(), "body survives").unwrap();
    fs::write(handle.sidecar_path(), "[{\"start\": 0, \"len").unwrap();

    let loaded = store.load(&handle).unwrap();
    assert_eq!(loaded.text, "body survives");
    assert!(loaded.ranges.is_empty());
}

#[test]
fn test_load_sanitizes_against_body() {
    let (store, _dir) = create_test_store();
    let handle = store.handle("Short");
    fs::write(handle.path(), "12345678").unwrap();
    let stale = RangeSet::from(vec![
        HighlightRange::new(5, 10, Some("#fff")),
        HighlightRange::new(9, 2, Some("#fff")),
    ]);
    fs::write(handle.sidecar_path(), highlights::serialize(&stale).unwrap()).unwrap();

    let loaded = store.load(&handle).unwrap();
    assert_eq!(loaded.ranges.len(), 1);
    assert_eq!(loaded.ranges.as_slice()[0].length, 3);
}

#[test]
fn test_load_missing_note_is_not_found() {
    let (store, _dir) = create_test_store();
    let result = store.load(&store.handle("ghost"));
    assert!(matches!(result, Err(NotesError::NoteNotFound(_))));
}

#[test]
fn test_delete_removes_both_files() {
    let (store, _dir) = create_test_store();
    let handle = store.create("Temp").unwrap();

    store.delete(&handle).unwrap();
    assert!(!handle.path().exists());
    assert!(!handle.sidecar_path().exists());
}

#[test]
fn test_delete_without_sidecar() {
    let (store, _dir) = create_test_store();
    let handle = store.handle("Bare");
    fs::write(handle.path(), "x").unwrap();

    store.delete(&handle).unwrap();
    assert!(!handle.path().exists());
}

#[test]
fn test_delete_missing_note_is_not_found() {
    let (store, _dir) = create_test_store();
    let result = store.delete(&store.handle("ghost"));
    assert!(matches!(result, Err(NotesError::NoteNotFound(_))));
}

#[test]
fn test_rename_moves_body_and_sidecar_together() {
    let (store, _dir) = create_test_store();
    let handle = store.create("Before").unwrap();
    let ranges = sample_ranges();
    store.save(&handle, "hello world", &ranges).unwrap();
    let before = store.load(&handle).unwrap();

    let renamed = store.rename(&handle, "After").unwrap();
    assert_eq!(renamed.file_name(), "After.txt");
    assert!(!handle.path().exists());
    assert!(!handle.sidecar_path().exists());

    let after = store.load(&renamed).unwrap();
    assert_eq!(after.text, before.text);
    assert_eq!(after.ranges, before.ranges);
}

#[test]
fn test_rename_without_sidecar() {
    let (store, _dir) = create_test_store();
    let handle = store.handle("Lonely");
    fs::write(handle.path(), "no highlights").unwrap();

    let renamed = store.rename(&handle, "Still Lonely").unwrap();
    assert!(renamed.path().exists());
    assert!(!renamed.sidecar_path().exists());
}

#[test]
fn test_rename_drops_orphaned_target_sidecar() {
    let (store, _dir) = create_test_store();
    let handle = store.handle("Source");
    fs::write(handle.path(), "abc").unwrap();
    let orphan = store.handle("Target").sidecar_path();
    fs::write(&orphan, r##"[{"start":0,"length":1,"color":"#fff"}]"##).unwrap();

    let renamed = store.rename(&handle, "Target").unwrap();
    assert!(store.load(&renamed).unwrap().ranges.is_empty());
}

#[test]
fn test_rename_rejects_taken_name() {
    let (store, _dir) = create_test_store();
    let first = store.create("One").unwrap();
    store.create("Two").unwrap();

    let result = store.rename(&first, "Two");
    assert!(matches!(result, Err(NotesError::NoteExists(_))));
    assert!(first.path().exists());
}

#[test]
fn test_rename_to_same_name_is_noop() {
    let (store, _dir) = create_test_store();
    let handle = store.create("Same").unwrap();
    let renamed = store.rename(&handle, "Same.txt").unwrap();
    assert_eq!(renamed, handle);
    assert!(handle.path().exists());
}

#[test]
fn test_failed_sidecar_write_leaves_previous_pair() {
    let (store, _dir) = create_test_store();
    let handle = store.create("Journal").unwrap();
    let ranges = sample_ranges();
    store.save(&handle, "hello world", &ranges).unwrap();

    let mut blocker = handle.sidecar_path().into_os_string();
    blocker.push(".tmp");
    fs::create_dir(&blocker).unwrap();

    let result = store.save(&handle, "rewritten", &RangeSet::new());
    assert!(matches!(result, Err(NotesError::Io { .. })));

    fs::remove_dir(&blocker).unwrap();
    let loaded = store.load(&handle).unwrap();
    assert_eq!(loaded.text, "hello world");
    assert_eq!(loaded.ranges, ranges);

    let mut body_tmp = handle.path().as_os_str().to_owned();
    body_tmp.push(".tmp");
    assert!(!PathBuf::from(body_tmp).exists());
}
