use super::*;

// ── Addressing ────────────────────────────────────────────────────────────

#[test]
fn test_location_resolve_joins_prefix() {
    let location = StoreLocation::new("raw", "incoming");
    assert_eq!(
        location.resolve("batch.csv"),
        ObjectRef::new("raw", "incoming/batch.csv")
    );

    let bare = StoreLocation::new("raw", "");
    assert_eq!(bare.resolve("batch.csv"), ObjectRef::new("raw", "batch.csv"));
}

#[test]
fn test_location_trims_prefix_slashes() {
    let location = StoreLocation::new("raw", "/incoming/");
    assert_eq!(location.prefix, "incoming");
}

#[test]
fn test_location_contains_requires_prefix_boundary() {
    let location = StoreLocation::new("raw", "in");
    assert!(location.contains(&ObjectRef::new("raw", "in/batch.csv")));
    // "inbox/..." shares the string prefix but not the path segment.
    assert!(!location.contains(&ObjectRef::new("raw", "inbox/batch.csv")));
    assert!(!location.contains(&ObjectRef::new("other", "in/batch.csv")));
}

#[test]
fn test_object_name_is_last_segment() {
    assert_eq!(ObjectRef::new("raw", "a/b/batch.csv").name(), "batch.csv");
    assert_eq!(ObjectRef::new("raw", "batch.csv").name(), "batch.csv");
}

// ── InMemoryStore ─────────────────────────────────────────────────────────

#[test]
fn test_memory_put_get_round_trip() {
    let store = InMemoryStore::new();
    let location = ObjectRef::new("raw", "batch.csv");

    store.put(&location, b"hello".to_vec()).unwrap();
    assert_eq!(store.get(&location).unwrap(), b"hello");

    // Overwrite replaces the previous version.
    store.put(&location, b"world".to_vec()).unwrap();
    assert_eq!(store.get(&location).unwrap(), b"world");
}

#[test]
fn test_memory_get_missing_is_not_found() {
    let store = InMemoryStore::new();
    let err = store.get(&ObjectRef::new("raw", "absent.csv")).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn test_memory_list_filters_and_sorts() {
    let store = InMemoryStore::new();
    store.put(&ObjectRef::new("raw", "in/b.csv"), vec![]).unwrap();
    store.put(&ObjectRef::new("raw", "in/a.csv"), vec![]).unwrap();
    store.put(&ObjectRef::new("raw", "out/c.csv"), vec![]).unwrap();
    store.put(&ObjectRef::new("other", "in/d.csv"), vec![]).unwrap();

    let keys: Vec<String> = store
        .list(&StoreLocation::new("raw", "in"))
        .unwrap()
        .into_iter()
        .map(|object| object.key)
        .collect();
    assert_eq!(keys, vec!["in/a.csv", "in/b.csv"]);
}

// ── FsStore ───────────────────────────────────────────────────────────────

#[test]
fn test_fs_put_get_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStore::new(dir.path()).unwrap();
    let location = ObjectRef::new("raw", "nested/dir/batch.csv");

    store.put(&location, b"payload".to_vec()).unwrap();
    assert_eq!(store.get(&location).unwrap(), b"payload");
}

#[test]
fn test_fs_get_missing_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStore::new(dir.path()).unwrap();

    let err = store.get(&ObjectRef::new("raw", "absent.csv")).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn test_fs_list_walks_nested_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStore::new(dir.path()).unwrap();
    store.put(&ObjectRef::new("raw", "in/2024/b.csv"), vec![]).unwrap();
    store.put(&ObjectRef::new("raw", "in/a.csv"), vec![]).unwrap();
    store.put(&ObjectRef::new("raw", "other.csv"), vec![]).unwrap();

    let keys: Vec<String> = store
        .list(&StoreLocation::new("raw", "in"))
        .unwrap()
        .into_iter()
        .map(|object| object.key)
        .collect();
    assert_eq!(keys, vec!["in/2024/b.csv", "in/a.csv"]);
}

#[test]
fn test_fs_list_missing_bucket_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStore::new(dir.path()).unwrap();
    assert!(store.list(&StoreLocation::new("nowhere", "")).unwrap().is_empty());
}
