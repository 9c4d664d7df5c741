use super::*;
use crate::config::{LEGACY_ID_FILE, LEGACY_PEERS_FILE, NODE_FILE};
use crate::error::ErrorKind;
use crate::test_utils::TestDir;

use assert_matches::assert_matches;

#[test_log::test]
fn test_migrates_single_node_marker() {
    let dir = TestDir::new();
    dir.write(LEGACY_ID_FILE, "42");

    let identity = dir.store().load_or_migrate(["10.0.0.1:8088"]).unwrap();

    assert_eq!(identity.id(), NodeId::new(42));
    assert_eq!(identity.meta_servers().as_slice(), &["10.0.0.1:8088"]);
    assert!(!dir.exists(LEGACY_ID_FILE));

    let on_disk: serde_json::Value = serde_json::from_str(&dir.read(NODE_FILE).unwrap()).unwrap();
    assert_eq!(on_disk, serde_json::json!({"id": 42, "metaServers": ["10.0.0.1:8088"]}));
}

#[test_log::test]
fn test_migration_is_idempotent() {
    let dir = TestDir::new();
    dir.write(LEGACY_ID_FILE, "42");
    dir.write(LEGACY_PEERS_FILE, r#"["10.0.0.9:8088"]"#);
    let store = dir.store();

    let first = store.load_or_migrate(["10.0.0.1:8088"]).unwrap();
    assert!(!dir.exists(LEGACY_ID_FILE));
    let second = store.load_or_migrate(["10.0.0.2:8088"]).unwrap();

    assert_eq!(first.id(), NodeId::new(42));
    assert_eq!(first, second);
    // The peer list is only consulted, never touched.
    assert!(dir.exists(LEGACY_PEERS_FILE));
}

#[test_log::test]
fn test_multi_peer_cluster_is_blocked() {
    let dir = TestDir::new();
    dir.write(LEGACY_ID_FILE, "7");
    dir.write(LEGACY_PEERS_FILE, r#"["a:1","b:2"]"#);

    let err = dir.store().load_or_migrate(["10.0.0.1:8088"]).unwrap_err();

    assert_matches!(&err, IdentityError::MigrationConflict { peers } if peers.len() == 2);
    assert_eq!(err.kind(), ErrorKind::MigrationConflict);
    assert!(!err.is_retriable());
    assert!(!dir.exists(NODE_FILE));
    assert_eq!(dir.read(LEGACY_ID_FILE).as_deref(), Some("7"));
}

#[test_log::test]
fn test_conflict_checked_before_id_is_parsed() {
    let dir = TestDir::new();
    dir.write(LEGACY_ID_FILE, "not-a-number");
    dir.write(LEGACY_PEERS_FILE, r#"["a:1","b:2","c:3"]"#);

    assert_matches!(
        dir.store().detect_legacy(),
        Ok(LegacyState::Blocked { peers }) if peers.len() == 3
    );
}

#[test_log::test]
fn test_empty_marker_is_ignored() {
    let dir = TestDir::new();
    dir.write(LEGACY_ID_FILE, "");

    let identity = dir.store().load_or_migrate(["a:1"]).unwrap();

    assert!(!identity.id().is_set());
    assert!(!dir.exists(NODE_FILE));
    assert!(dir.exists(LEGACY_ID_FILE));
}

#[test_log::test]
fn test_empty_marker_with_current_file_loads_current() {
    let dir = TestDir::new();
    let store = dir.store();
    let mut saved = NodeIdentity::with_meta_servers(["a:1"]);
    saved.assign_id(11u64).unwrap();
    store.save(&saved).unwrap();
    dir.write(LEGACY_ID_FILE, "");

    assert_eq!(store.load_or_migrate(["b:2"]).unwrap(), saved);
}

#[test_log::test]
fn test_marker_with_trailing_newline() {
    let dir = TestDir::new();
    dir.write(LEGACY_ID_FILE, "1234\n");

    let identity = dir.store().load_or_migrate(Vec::<String>::new()).unwrap();

    assert_eq!(identity.id(), NodeId::new(1234));
    assert!(identity.meta_servers().is_empty());
}

#[test_log::test]
fn test_invalid_marker_is_format_error() {
    let dir = TestDir::new();
    dir.write(LEGACY_ID_FILE, "forty-two");

    let err = dir.store().load_or_migrate(["a:1"]).unwrap_err();

    assert_matches!(err, IdentityError::InvalidLegacyId { .. });
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(dir.exists(LEGACY_ID_FILE));
    assert!(!dir.exists(NODE_FILE));
}

#[test_log::test]
fn test_zero_marker_is_rejected() {
    let dir = TestDir::new();
    dir.write(LEGACY_ID_FILE, "0");

    assert_matches!(
        dir.store().load_or_migrate(["a:1"]),
        Err(IdentityError::InvalidLegacyId { .. })
    );
}

#[test_log::test]
fn test_undecodable_peers_file() {
    let dir = TestDir::new();
    dir.write(LEGACY_ID_FILE, "5");
    dir.write(LEGACY_PEERS_FILE, "[\"a:1\",");

    let err = dir.store().load_or_migrate(["a:1"]).unwrap_err();

    assert_matches!(err, IdentityError::InvalidPeers { .. });
    assert!(dir.exists(LEGACY_ID_FILE));
    assert!(!dir.exists(NODE_FILE));
}

#[test_log::test]
fn test_empty_peers_file_counts_as_no_peers() {
    let dir = TestDir::new();
    dir.write(LEGACY_ID_FILE, "5");
    dir.write(LEGACY_PEERS_FILE, "");

    assert_eq!(dir.store().load_or_migrate(["a:1"]).unwrap().id(), NodeId::new(5));
}

#[test_log::test]
fn test_null_peers_file_counts_as_no_peers() {
    let dir = TestDir::new();
    dir.write(LEGACY_ID_FILE, "5");
    dir.write(LEGACY_PEERS_FILE, "null");

    let identity = dir.store().load_or_migrate(["a:1"]).unwrap();

    assert_eq!(identity.id(), NodeId::new(5));
    assert_eq!(identity.meta_servers().as_slice(), &["a:1"]);
    assert!(!dir.exists(LEGACY_ID_FILE));
}

#[test_log::test]
fn test_detect_does_not_write() {
    let dir = TestDir::new();
    dir.write(LEGACY_ID_FILE, "42");
    dir.write(LEGACY_PEERS_FILE, r#"["a:1"]"#);
    let before = dir.files();

    let state = dir.store().detect_legacy().unwrap();

    let legacy = assert_matches!(state, LegacyState::Pending(legacy) => legacy);
    assert_eq!(legacy.id(), NodeId::new(42));
    assert_eq!(legacy.peers(), &["a:1".to_string()]);
    assert_eq!(legacy.marker(), dir.path().join(LEGACY_ID_FILE));
    assert_eq!(dir.files(), before);
}

#[test_log::test]
fn test_detect_without_marker() {
    let dir = TestDir::new();
    dir.write(LEGACY_PEERS_FILE, r#"["a:1","b:2"]"#);

    assert_eq!(dir.store().detect_legacy().unwrap(), LegacyState::Absent);
}

#[test_log::test]
fn test_stale_marker_keeps_persisted_identity() {
    let dir = TestDir::new();
    let store = dir.store();
    let mut saved = NodeIdentity::with_meta_servers(["a:1"]);
    saved.assign_id(42u64).unwrap();
    store.save(&saved).unwrap();
    // A previous migration saved node.json but died before removing the marker.
    dir.write(LEGACY_ID_FILE, "99");

    let loaded = store.load_or_migrate(["b:2"]).unwrap();

    assert_eq!(loaded, saved);
    assert!(!dir.exists(LEGACY_ID_FILE));
    assert_eq!(store.load().unwrap().id(), NodeId::new(42));
}

#[test_log::test]
fn test_migrate_deduplicates_seed() {
    let dir = TestDir::new();
    dir.write(LEGACY_ID_FILE, "3");

    let identity = dir.store().load_or_migrate(["a:1", "b:2", "a:1"]).unwrap();

    assert_eq!(identity.meta_servers().as_slice(), &["a:1", "b:2"]);
}

#[test]
fn test_marker_removal_error_carries_identity() {
    let mut identity = NodeIdentity::with_meta_servers(["a:1"]);
    identity.assign_id(42u64).unwrap();
    let err = IdentityError::MarkerRemoval {
        identity: Box::new(identity.clone()),
        path: PathBuf::from("id"),
        source: io::Error::from(io::ErrorKind::PermissionDenied),
    };

    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(err.to_string().contains("42"));
    assert_eq!(err.recovered_identity(), Some(identity));
}

#[test_log::test]
fn test_migrate_reports_unremovable_marker() {
    let dir = TestDir::new();
    let store = dir.store();
    // A non-empty directory in place of the marker cannot be removed as a file.
    let marker = dir.path().join(LEGACY_ID_FILE);
    fs::create_dir(&marker).unwrap();
    fs::write(marker.join("keep"), "x").unwrap();
    let legacy = LegacyIdentity {
        id: NodeId::new(42),
        marker: marker.clone(),
        peers: Vec::new(),
    };

    let err = store.migrate(legacy, ["10.0.0.1:8088"]).unwrap_err();

    assert_matches!(&err, IdentityError::MarkerRemoval { path, .. } if *path == marker);
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(err.is_retriable());

    let saved = store.load().unwrap();
    assert_eq!(saved.id(), NodeId::new(42));
    assert_eq!(saved.meta_servers().as_slice(), &["10.0.0.1:8088"]);
    assert_eq!(err.recovered_identity(), Some(saved));
    assert!(marker.is_dir());
}
