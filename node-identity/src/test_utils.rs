//! Fixtures for tests that need a real data directory

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use crate::config::Config;
use crate::store::IdentityStore;

/// A throwaway data directory, removed when dropped.
pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn store(&self) -> IdentityStore {
        IdentityStore::new(Config::new(self.path()))
    }

    pub fn write(&self, name: &str, contents: &str) {
        fs::write(self.path().join(name), contents).expect("failed to write test file");
    }

    pub fn read(&self, name: &str) -> Option<String> {
        fs::read_to_string(self.path().join(name)).ok()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path().join(name).exists()
    }

    /// File names in the directory, sorted.
    pub fn files(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.path())
            .expect("failed to list temp dir")
            .map(|entry| {
                entry
                    .expect("failed to read dir entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        names.sort();
        names
    }

    pub fn temp_files(&self) -> Vec<String> {
        self.files()
            .into_iter()
            .filter(|name| name.ends_with(".tmp"))
            .collect()
    }
}
