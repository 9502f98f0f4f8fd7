use super::*;

fn exercise_store(store: &dyn LocalStore) {
    let a = Uuid::new_v4();
    store.set(&layout_key(a, 2), "two").unwrap();
    store.set(&layout_key(a, 1), "one").unwrap();
    store.set("unrelated", "x").unwrap();

    assert_eq!(store.get(&layout_key(a, 1)).unwrap().as_deref(), Some("one"));
    assert_eq!(store.get(&layout_key(a, 3)).unwrap(), None);
    assert_eq!(store.scan_prefix(&facility_prefix(a)).unwrap(), vec![layout_key(a, 1), layout_key(a, 2)]);

    store.set(&layout_key(a, 1), "uno").unwrap();
    assert_eq!(store.get(&layout_key(a, 1)).unwrap().as_deref(), Some("uno"));

    store.remove(&layout_key(a, 1)).unwrap();
    store.remove(&layout_key(a, 1)).unwrap();
    assert_eq!(store.scan_prefix(LAYOUT_KEY_PREFIX).unwrap(), vec![layout_key(a, 2)]);
}

// =============================================================================
// KEYS
// =============================================================================

#[test]
fn layout_key_format() {
    let id = Uuid::nil();
    assert_eq!(layout_key(id, 3), "layout:00000000-0000-0000-0000-000000000000:3");
}

#[test]
fn parse_layout_key_round_trips() {
    let id = Uuid::new_v4();
    assert_eq!(parse_layout_key(&layout_key(id, 12)), Some((id, 12)));
}

#[test]
fn parse_layout_key_rejects_foreign_keys() {
    assert_eq!(parse_layout_key("theme:dark"), None);
    assert_eq!(parse_layout_key("layout:not-a-uuid:1"), None);
    assert_eq!(parse_layout_key(&format!("layout:{}:first", Uuid::new_v4())), None);
}

#[test]
fn facility_prefix_does_not_match_other_facilities() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    assert!(layout_key(a, 1).starts_with(&facility_prefix(a)));
    assert!(!layout_key(b, 1).starts_with(&facility_prefix(a)));
}

// =============================================================================
// MEMORY STORE
// =============================================================================

#[test]
fn memory_store_contract() {
    exercise_store(&MemoryStore::new());
}

// =============================================================================
// FILE STORE
// =============================================================================

#[test]
fn file_store_contract() {
    let dir = tempfile::tempdir().unwrap();
    exercise_store(&FileStore::open(dir.path().join("cache.json")).unwrap());
}

#[test]
fn file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    let id = Uuid::new_v4();
    {
        let store = FileStore::open(&path).unwrap();
        store.set(&layout_key(id, 1), r#"{"floor":1}"#).unwrap();
    }
    let reopened = FileStore::open(&path).unwrap();
    assert_eq!(reopened.get(&layout_key(id, 1)).unwrap().as_deref(), Some(r#"{"floor":1}"#));
    assert_eq!(reopened.path(), path.as_path());
}

#[test]
fn file_store_missing_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path().join("absent.json")).unwrap();
    assert!(store.scan_prefix("").unwrap().is_empty());
    assert!(!dir.path().join("absent.json").exists());
}

#[test]
fn file_store_rejects_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(FileStore::open(&path), Err(LocalStoreError::Json(_))));
}

#[test]
fn file_store_write_failure_leaves_memory_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("cache.json");
    let store = FileStore::open(&path).unwrap();
    assert!(matches!(store.set("k", "v"), Err(LocalStoreError::Io(_))));
    assert_eq!(store.get("k").unwrap(), None);
}
