use super::*;

fn temp_storage() -> (FileStorage, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path().join("nested").join("storage.json"));
    (storage, dir)
}

// =============================================================
// FileStorage
// =============================================================

#[test]
fn file_storage_missing_file_reads_absent() {
    let (storage, _dir) = temp_storage();
    assert_eq!(storage.get_item(TOKEN_KEY), None);
}

#[test]
fn file_storage_persists_batch_across_instances() {
    let (storage, _dir) = temp_storage();
    storage
        .apply(&[StorageOp::set(TOKEN_KEY, "abc"), StorageOp::set(USER_KEY, "{}")])
        .unwrap();

    let reopened = FileStorage::new(storage.path());
    assert_eq!(reopened.get_item(TOKEN_KEY).as_deref(), Some("abc"));
    assert_eq!(reopened.get_item(USER_KEY).as_deref(), Some("{}"));
}

#[test]
fn file_storage_remove_deletes_keys() {
    let (storage, _dir) = temp_storage();
    storage
        .apply(&[StorageOp::set(TOKEN_KEY, "abc"), StorageOp::set("theme", "dark")])
        .unwrap();
    storage.apply(&[StorageOp::remove(TOKEN_KEY)]).unwrap();

    assert_eq!(storage.get_item(TOKEN_KEY), None);
    assert_eq!(storage.get_item("theme").as_deref(), Some("dark"));
}

#[test]
fn file_storage_malformed_file_reads_absent_and_is_replaced() {
    let (storage, _dir) = temp_storage();
    std::fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
    std::fs::write(storage.path(), "{ not json").unwrap();

    assert_eq!(storage.get_item(TOKEN_KEY), None);

    storage.apply(&[StorageOp::set(TOKEN_KEY, "fresh")]).unwrap();
    assert_eq!(storage.get_item(TOKEN_KEY).as_deref(), Some("fresh"));
}

#[test]
fn file_storage_leaves_no_temp_file() {
    let (storage, _dir) = temp_storage();
    storage.apply(&[StorageOp::set(TOKEN_KEY, "abc")]).unwrap();

    let parent = storage.path().parent().unwrap();
    let names: Vec<String> = std::fs::read_dir(parent)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["storage.json".to_owned()]);
}

// =============================================================
// MemoryStorage
// =============================================================

#[test]
fn memory_storage_applies_ops_in_order() {
    let storage = MemoryStorage::new();
    storage
        .apply(&[
            StorageOp::set(TOKEN_KEY, "one"),
            StorageOp::set(TOKEN_KEY, "two"),
            StorageOp::set(USER_KEY, "u"),
            StorageOp::remove(USER_KEY),
        ])
        .unwrap();

    assert_eq!(storage.get_item(TOKEN_KEY).as_deref(), Some("two"));
    assert_eq!(storage.get_item(USER_KEY), None);
    assert_eq!(storage.len(), 1);
}

#[test]
fn memory_storage_starts_empty() {
    assert!(MemoryStorage::new().is_empty());
}
