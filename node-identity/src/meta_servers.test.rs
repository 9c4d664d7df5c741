use super::*;

#[test]
fn test_extend_deduplicates_input() {
    let mut servers = MetaServers::new();
    let added = servers.extend(["10.0.0.1:8088", "10.0.0.2:8088", "10.0.0.1:8088", "10.0.0.2:8088"]);

    assert_eq!(added, 2);
    assert_eq!(servers.as_slice(), &["10.0.0.1:8088", "10.0.0.2:8088"]);
}

#[test]
fn test_extend_keeps_existing_order() {
    let mut servers: MetaServers = ["b:2", "a:1"].into_iter().collect();
    let added = servers.extend(["c:3", "a:1"]);

    assert_eq!(added, 1);
    assert_eq!(servers.as_slice(), &["b:2", "a:1", "c:3"]);
    assert!(servers.contains("c:3"));
    assert!(!servers.contains("d:4"));
}

#[test]
fn test_extend_with_nothing() {
    let mut servers = MetaServers::from(vec!["a:1".to_string()]);
    assert_eq!(servers.extend(Vec::<String>::new()), 0);
    assert_eq!(servers.len(), 1);
}

#[test]
fn test_deserialize_collapses_duplicates() {
    let servers: MetaServers = serde_json::from_str(r#"["a:1","b:2","a:1"]"#).unwrap();
    assert_eq!(servers.as_slice(), &["a:1", "b:2"]);
}

#[test]
fn test_deserialize_null_as_empty() {
    let servers: MetaServers = serde_json::from_str("null").unwrap();
    assert!(servers.is_empty());
}

#[test]
fn test_serializes_as_plain_list() {
    let servers: MetaServers = ["a:1", "b:2"].into_iter().collect();
    assert_eq!(serde_json::to_string(&servers).unwrap(), r#"["a:1","b:2"]"#);
}
