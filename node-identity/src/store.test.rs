use super::*;
use crate::error::ErrorKind;
use crate::id::NodeId;
use crate::test_utils::TestDir;

use assert_matches::assert_matches;

fn identity(id: u64, servers: &[&str]) -> NodeIdentity {
    let mut identity = NodeIdentity::with_meta_servers(servers.iter().copied());
    identity.assign_id(id).unwrap();
    identity
}

#[test_log::test]
fn test_first_boot_creates_nothing() {
    let dir = TestDir::new();
    let store = dir.store();

    let loaded = store.load_or_migrate(["10.0.0.1:8088"]).unwrap();

    assert!(!loaded.id().is_set());
    assert!(loaded.meta_servers().is_empty());
    assert!(dir.files().is_empty());
}

#[test_log::test]
fn test_save_then_load_round_trips() {
    let dir = TestDir::new();
    let store = dir.store();
    let saved = identity(12, &["c:3", "a:1", "b:2"]);

    store.save(&saved).unwrap();
    let loaded = store.load().unwrap();

    assert_eq!(loaded, saved);
    assert_eq!(loaded.meta_servers().as_slice(), &["c:3", "a:1", "b:2"]);
    assert_eq!(dir.files(), vec![NODE_FILE.to_string()]);
}

#[test_log::test]
fn test_save_unassigned_identity() {
    let dir = TestDir::new();
    let store = dir.store();

    store.save(&NodeIdentity::with_meta_servers(["a:1"])).unwrap();
    let loaded = store.load().unwrap();

    assert!(!loaded.id().is_set());
    assert_eq!(loaded.meta_servers().as_slice(), &["a:1"]);
}

#[test_log::test]
fn test_save_replaces_existing_file() {
    let dir = TestDir::new();
    let store = dir.store();

    let mut current = identity(3, &["a:1"]);
    store.save(&current).unwrap();
    current.add_meta_servers(["b:2"]);
    store.save(&current).unwrap();

    assert_eq!(store.load().unwrap(), current);
    assert!(dir.temp_files().is_empty());
}

#[test_log::test]
fn test_saved_file_is_readable_json() {
    let dir = TestDir::new();
    dir.store().save(&identity(42, &["10.0.0.1:8088"])).unwrap();

    let raw = dir.read(NODE_FILE).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value, serde_json::json!({"id": 42, "metaServers": ["10.0.0.1:8088"]}));
    assert!(raw.ends_with('\n'));
}

#[test_log::test]
fn test_crash_before_rename_keeps_previous_file() {
    let dir = TestDir::new();
    let store = dir.store();
    let previous = identity(1, &["a:1"]);
    store.save(&previous).unwrap();

    let staged = store.stage(&identity(1, &["a:1", "b:2"])).unwrap();
    assert!(staged.temp_path().exists());
    // Simulate the process dying between write and rename.
    std::mem::forget(staged);

    assert_eq!(dir.temp_files().len(), 1);
    assert_eq!(store.load().unwrap(), previous);
}

#[test_log::test]
fn test_crash_before_rename_on_first_save_leaves_no_identity() {
    let dir = TestDir::new();
    let store = dir.store();

    std::mem::forget(store.stage(&identity(8, &[])).unwrap());

    assert!(!dir.exists(NODE_FILE));
    assert!(!store.load().unwrap().id().is_set());
}

#[test_log::test]
fn test_dropped_stage_removes_temp_file() {
    let dir = TestDir::new();
    let store = dir.store();

    let staged = store.stage(&identity(4, &[])).unwrap();
    let temp = staged.temp_path().to_path_buf();
    drop(staged);

    assert!(!temp.exists());
    assert!(dir.files().is_empty());
}

#[test_log::test]
fn test_stage_uses_unique_temp_names() {
    let dir = TestDir::new();
    let store = dir.store();

    let first = store.stage(&identity(1, &[])).unwrap();
    let second = store.stage(&identity(2, &[])).unwrap();
    assert_ne!(first.temp_path(), second.temp_path());

    second.commit().unwrap();
    first.commit().unwrap();
    assert_eq!(store.load().unwrap().id(), NodeId::new(1));
    assert!(dir.temp_files().is_empty());
}

#[test_log::test]
fn test_save_into_missing_dir_fails_cleanly() {
    let dir = TestDir::new();
    let store = IdentityStore::open(dir.path().join("missing"));

    let err = store.save(&identity(1, &[])).unwrap_err();

    assert_matches!(err, IdentityError::Io { op: IoOp::CreateTemp, .. });
    assert!(err.is_retriable());
    assert!(dir.files().is_empty());
}

#[test_log::test]
fn test_failed_rename_keeps_previous_file() {
    let dir = TestDir::new();
    let store = dir.store();
    let previous = identity(1, &["a:1"]);
    store.save(&previous).unwrap();

    let staged = store.stage(&identity(2, &[])).unwrap();
    fs::remove_file(staged.temp_path()).unwrap();
    let err = staged.commit().unwrap_err();

    assert_matches!(err, IdentityError::Io { op: IoOp::Rename, .. });
    assert_eq!(store.load().unwrap(), previous);
}

#[test_log::test]
fn test_load_ignores_leftover_temp_files() {
    let dir = TestDir::new();
    let store = dir.store();
    store.save(&identity(5, &[])).unwrap();
    dir.write(".node.json.0000.tmp", "{\"id\": 6, \"meta");

    assert_eq!(store.load().unwrap().id(), NodeId::new(5));
}

#[test_log::test]
fn test_corrupt_identity_file() {
    let dir = TestDir::new();
    dir.write(NODE_FILE, "{\"id\": 5, \"metaServ");

    let err = dir.store().load_or_migrate(Vec::<String>::new()).unwrap_err();

    assert_matches!(err, IdentityError::Corrupt { .. });
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(!err.is_retriable());
}

#[test_log::test]
fn test_empty_identity_file_is_corrupt() {
    let dir = TestDir::new();
    dir.write(NODE_FILE, "");

    assert_matches!(dir.store().load(), Err(IdentityError::Corrupt { .. }));
}

#[test_log::test]
fn test_loads_file_with_null_meta_servers() {
    let dir = TestDir::new();
    dir.write(NODE_FILE, "{\"ID\":5,\"MetaServers\":null}\n");

    let loaded = dir.store().load().unwrap();

    assert_eq!(loaded.id(), NodeId::new(5));
    assert!(loaded.meta_servers().is_empty());
}

#[test_log::test]
fn test_existing_file_ignores_seed() {
    let dir = TestDir::new();
    let store = dir.store();
    store.save(&identity(9, &["a:1"])).unwrap();

    let loaded = store.load_or_migrate(["z:26"]).unwrap();

    assert_eq!(loaded.meta_servers().as_slice(), &["a:1"]);
}

#[test_log::test]
fn test_unsynced_store_still_saves_atomically() {
    let dir = TestDir::new();
    let store = IdentityStore::new(Config::new(dir.path()).with_sync(false));

    store.save(&identity(77, &["a:1"])).unwrap();

    assert_eq!(store.load().unwrap().id(), NodeId::new(77));
    assert!(dir.temp_files().is_empty());
}
