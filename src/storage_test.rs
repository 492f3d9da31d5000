use super::*;

// =============================================================================
// MemoryStorage
// =============================================================================

#[test]
fn memory_get_missing_is_none() {
    let storage = MemoryStorage::new();
    assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    assert!(storage.is_empty());
}

#[test]
fn memory_set_then_get() {
    let storage = MemoryStorage::new();
    storage.set(TOKEN_KEY, "tok123").unwrap();
    assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("tok123"));
    assert_eq!(storage.len(), 1);
}

#[test]
fn memory_set_overwrites() {
    let storage = MemoryStorage::new();
    storage.set(ROLE_KEY, "ADMIN").unwrap();
    storage.set(ROLE_KEY, "STUDENT").unwrap();
    assert_eq!(storage.get(ROLE_KEY).unwrap().as_deref(), Some("STUDENT"));
}

#[test]
fn memory_remove_missing_is_ok() {
    let storage = MemoryStorage::new();
    storage.remove(USERNAME_KEY).unwrap();
    assert!(storage.is_empty());
}

#[test]
fn arc_storage_shares_entries() {
    let shared = std::sync::Arc::new(MemoryStorage::new());
    let handle = std::sync::Arc::clone(&shared);
    handle.set(TOKEN_KEY, "abc").unwrap();
    assert_eq!(shared.get(TOKEN_KEY).unwrap().as_deref(), Some("abc"));
}

// =============================================================================
// FileStorage
// =============================================================================

#[test]
fn file_missing_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path().join("session.json"));
    assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
}

#[test]
fn file_set_creates_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("session.json");
    let storage = FileStorage::new(&path);
    storage.set(TOKEN_KEY, "tok").unwrap();
    assert!(path.exists());
}

#[test]
fn file_values_survive_new_instance() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    FileStorage::new(&path).set(ROLE_KEY, "STUDENT").unwrap();

    let reopened = FileStorage::new(&path);
    assert_eq!(reopened.get(ROLE_KEY).unwrap().as_deref(), Some("STUDENT"));
}

#[test]
fn file_contents_are_flat_json_object() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let storage = FileStorage::new(&path);
    storage.set(TOKEN_KEY, "tok123").unwrap();
    storage.set(ROLE_KEY, "ADMIN").unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value, serde_json::json!({ "token": "tok123", "role": "ADMIN" }));
}

#[test]
fn file_remove_deletes_only_that_key() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path().join("session.json"));
    storage.set(TOKEN_KEY, "tok").unwrap();
    storage.set(USERNAME_KEY, "alice").unwrap();
    storage.remove(TOKEN_KEY).unwrap();

    assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    assert_eq!(storage.get(USERNAME_KEY).unwrap().as_deref(), Some("alice"));
}

#[test]
fn file_remove_missing_does_not_create_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    FileStorage::new(&path).remove(TOKEN_KEY).unwrap();
    assert!(!path.exists());
}

#[test]
fn file_no_temp_file_left_behind() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    FileStorage::new(&path).set(TOKEN_KEY, "tok").unwrap();
    let names: Vec<_> = std::fs::read_dir(dir.path()).unwrap().map(|entry| entry.unwrap().file_name()).collect();
    assert_eq!(names, ["session.json"]);
}

#[test]
fn file_empty_file_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "  \n").unwrap();
    assert_eq!(FileStorage::new(&path).get(TOKEN_KEY).unwrap(), None);
}

#[test]
fn file_corrupt_contents_report_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "not json").unwrap();
    let err = FileStorage::new(&path).get(TOKEN_KEY).unwrap_err();
    assert!(matches!(err, StorageError::Corrupt(_)));
}

#[test]
fn file_path_is_directory_reports_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = FileStorage::new(dir.path()).get(TOKEN_KEY).unwrap_err();
    assert!(matches!(err, StorageError::Io { .. }));
}

#[test]
fn file_write_replaces_corrupt_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, r#"{"token": "tok", "role": "#).unwrap();
    let storage = FileStorage::new(&path);

    storage.set(ROLE_KEY, "ADMIN").unwrap();
    assert_eq!(storage.get(ROLE_KEY).unwrap().as_deref(), Some("ADMIN"));
    assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
}

#[test]
fn file_remove_on_corrupt_contents_rewrites_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "not json").unwrap();

    FileStorage::new(&path).remove(TOKEN_KEY).unwrap();
    let raw = std::fs::read_to_string(&path).unwrap();
    let parsed: BTreeMap<String, String> = serde_json::from_str(&raw).unwrap();
    assert!(parsed.is_empty());
}

#[test]
fn file_handles_on_same_path_write_concurrently() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let writers: Vec<_> = ["a", "b"]
        .into_iter()
        .map(|tag| {
            let storage = FileStorage::new(&path);
            std::thread::spawn(move || {
                for i in 0..100 {
                    storage.set(TOKEN_KEY, &format!("{tag}{i}")).unwrap();
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    let last = FileStorage::new(&path).get(TOKEN_KEY).unwrap().unwrap();
    assert!(last == "a99" || last == "b99", "unexpected final value {last}");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn temp_path_is_unique_sibling() {
    let path = Path::new("/a/b/session.json");
    let first = temp_path(path);
    let second = temp_path(path);
    assert_ne!(first, second);
    assert_eq!(first.parent(), Some(Path::new("/a/b")));
    let name = first.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("session.json."));
    assert!(name.ends_with(".tmp"));
}
