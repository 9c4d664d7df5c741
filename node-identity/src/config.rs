use std::path::{Path, PathBuf};

/// Name of the current-format identity file.
pub const NODE_FILE: &str = "node.json";
/// Name of the legacy single-value identity marker.
pub const LEGACY_ID_FILE: &str = "id";
/// Name of the legacy peer list consulted during migration.
pub const LEGACY_PEERS_FILE: &str = "peers.json";

/// Where and how an [`IdentityStore`](crate::store::IdentityStore) keeps its state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the identity files. Must exist and be writable.
    pub data_dir: PathBuf,
    /// Flush file contents and the directory entry to stable storage on save.
    /// Turning this off keeps the rename atomicity but not power-loss durability.
    pub sync: bool,
}

impl Config {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            sync: true,
        }
    }

    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// Per-user data directory for node state, if the platform has one.
    pub fn default_data_dir() -> Option<PathBuf> {
        directories_next::ProjectDirs::from("com", "paxson", "node-identity")
            .map(|dirs| dirs.data_dir().join("meta"))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::default_data_dir().unwrap_or_else(|| PathBuf::from("data")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_syncs_by_default() {
        let config = Config::new("/var/lib/node");
        assert!(config.sync);
        assert_eq!(config.data_dir(), Path::new("/var/lib/node"));
        assert!(!config.with_sync(false).sync);
    }

    #[test]
    fn test_default_uses_project_data_dir() {
        let config = Config::default();
        match Config::default_data_dir() {
            Some(dir) => assert_eq!(config.data_dir, dir),
            None => assert_eq!(config.data_dir, PathBuf::from("data")),
        }
    }
}
