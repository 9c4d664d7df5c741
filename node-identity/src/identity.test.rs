use super::*;
use crate::error::ErrorKind;
use assert_matches::assert_matches;

#[test]
fn test_new_identity_is_unassigned() {
    let identity = NodeIdentity::new();
    assert!(!identity.id().is_set());
    assert!(identity.meta_servers().is_empty());
}

#[test]
fn test_add_meta_servers_on_empty_identity() {
    let mut identity = NodeIdentity::new();
    identity.add_meta_servers(["a:1", "b:2", "a:1", "c:3", "b:2"]);

    assert_eq!(identity.meta_servers().as_slice(), &["a:1", "b:2", "c:3"]);
}

#[test]
fn test_add_meta_servers_merges_with_seed() {
    let mut identity = NodeIdentity::with_meta_servers(["10.0.0.1:8088"]);
    identity.add_meta_servers(vec!["10.0.0.2:8088".to_string(), "10.0.0.1:8088".to_string()]);

    assert_eq!(
        identity.meta_servers().as_slice(),
        &["10.0.0.1:8088", "10.0.0.2:8088"]
    );
}

#[test]
fn test_assign_id_once() {
    let mut identity = NodeIdentity::new();
    identity.assign_id(5u64).unwrap();
    assert_eq!(identity.id(), NodeId::new(5));

    let err = identity.assign_id(6u64).unwrap_err();
    assert_matches!(err, IdentityError::IdAlreadyAssigned { current } if current == NodeId::new(5));
    assert_eq!(identity.id(), NodeId::new(5));
}

#[test]
fn test_assign_zero_is_rejected() {
    let mut identity = NodeIdentity::new();
    let err = identity.assign_id(NodeId::UNSET).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Usage);
    assert!(!identity.id().is_set());
}

#[test]
fn test_json_field_names() {
    let identity = NodeIdentity::migrated(NodeId::new(42), ["10.0.0.1:8088"].into_iter().collect());
    let json: serde_json::Value = serde_json::to_value(&identity).unwrap();

    assert_eq!(json, serde_json::json!({"id": 42, "metaServers": ["10.0.0.1:8088"]}));
}

#[test]
fn test_decodes_legacy_field_names() {
    let identity: NodeIdentity =
        serde_json::from_str(r#"{"ID":3,"MetaServers":["a:1","a:1","b:2"]}"#).unwrap();

    assert_eq!(identity.id(), NodeId::new(3));
    assert_eq!(identity.meta_servers().as_slice(), &["a:1", "b:2"]);
}

#[test]
fn test_null_meta_servers_decodes_empty() {
    let identity: NodeIdentity = serde_json::from_str("{\"ID\":5,\"MetaServers\":null}\n").unwrap();
    assert_eq!(identity.id(), NodeId::new(5));
    assert!(identity.meta_servers().is_empty());
}

#[test]
fn test_missing_meta_servers_decodes_empty() {
    let identity: NodeIdentity = serde_json::from_str(r#"{"id":9}"#).unwrap();
    assert_eq!(identity.id(), NodeId::new(9));
    assert!(identity.meta_servers().is_empty());
}
