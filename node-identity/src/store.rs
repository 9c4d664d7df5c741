//! # Identity Store
//!
//! Owns the on-disk representation of a node's identity inside a single data
//! directory.
//!
//! ## Files
//!
//! ```text
//! <data_dir>/node.json               current format, written by save()
//! <data_dir>/.node.json.<uuid>.tmp   in-flight save, renamed over node.json
//! <data_dir>/id                      legacy marker, removed after migration
//! <data_dir>/peers.json              legacy peer list, only ever read
//! ```
//!
//! ## Saving
//!
//! A save never touches `node.json` until the new content is complete. The
//! identity is encoded, written to a uniquely named temp file in the same
//! directory, synced and closed, and only then renamed over `node.json`.
//! A crash at any point leaves either the previous file or the new one.
//!
//! ## Loading
//!
//! [`IdentityStore::load_or_migrate`] is the startup entry point. It may write
//! `node.json` and delete the legacy marker as a side effect. The two halves
//! are available separately as [`IdentityStore::detect_legacy`] (read only)
//! and [`IdentityStore::migrate`].

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::config::{Config, LEGACY_ID_FILE, LEGACY_PEERS_FILE, NODE_FILE};
use crate::error::{IdentityError, IoOp};
use crate::identity::NodeIdentity;
use crate::legacy::LegacyState;

#[cfg(test)]
#[path = "store.test.rs"]
mod tests;

/// Loads, migrates and atomically saves a [`NodeIdentity`] in one directory.
#[derive(Debug, Clone)]
pub struct IdentityStore {
    config: Config,
}

impl IdentityStore {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// A store over `data_dir` with default settings.
    pub fn open(data_dir: impl Into<PathBuf>) -> Self {
        Self::new(Config::new(data_dir))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn dir(&self) -> &Path {
        self.config.data_dir()
    }

    pub fn node_file(&self) -> PathBuf {
        self.dir().join(NODE_FILE)
    }

    pub fn legacy_id_file(&self) -> PathBuf {
        self.dir().join(LEGACY_ID_FILE)
    }

    pub fn legacy_peers_file(&self) -> PathBuf {
        self.dir().join(LEGACY_PEERS_FILE)
    }

    /// Load the node identity, migrating a legacy marker first if one exists.
    ///
    /// `seed` are the metadata-server addresses known at startup. They only
    /// become part of the identity when a migration happens; an existing
    /// `node.json` is returned as stored.
    ///
    /// With no state on disk this is a first boot and an unsaved identity with
    /// no id is returned. Nothing is written in that case.
    #[tracing::instrument(skip(self, seed), fields(dir = %self.dir().display()))]
    pub fn load_or_migrate<I, S>(&self, seed: I) -> Result<NodeIdentity, IdentityError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self.detect_legacy()? {
            LegacyState::Absent => self.load(),
            LegacyState::Pending(legacy) => self.migrate(legacy, seed),
            LegacyState::Blocked { peers } => {
                tracing::debug!(?peers, "legacy cluster has multiple peers, refusing to migrate");
                Err(IdentityError::MigrationConflict { peers })
            }
        }
    }

    /// Load `node.json` without looking at legacy files.
    pub fn load(&self) -> Result<NodeIdentity, IdentityError> {
        match self.load_existing()? {
            Some(identity) => Ok(identity),
            None => {
                tracing::debug!("no identity file found, starting fresh");
                Ok(NodeIdentity::new())
            }
        }
    }

    pub(crate) fn load_existing(&self) -> Result<Option<NodeIdentity>, IdentityError> {
        let path = self.node_file();
        let Some(bytes) = read_optional(&path)? else {
            return Ok(None);
        };
        let identity: NodeIdentity = serde_json::from_slice(&bytes)
            .map_err(|source| IdentityError::Corrupt { path, source })?;
        tracing::debug!(id = %identity.id(), meta_servers = identity.meta_servers().len(), "loaded node identity");
        Ok(Some(identity))
    }

    /// Atomically replace `node.json` with `identity`.
    ///
    /// On error the previous `node.json`, or its absence, is left untouched.
    #[tracing::instrument(skip(self, identity), fields(dir = %self.dir().display(), id = %identity.id()))]
    pub fn save(&self, identity: &NodeIdentity) -> Result<(), IdentityError> {
        self.stage(identity)?.commit()
    }

    /// Write `identity` to a temp file next to `node.json` without replacing it.
    ///
    /// The returned [`StagedWrite`] must be committed to take effect. Dropping
    /// it instead discards the temp file.
    pub fn stage(&self, identity: &NodeIdentity) -> Result<StagedWrite, IdentityError> {
        let mut bytes = serde_json::to_vec_pretty(identity).map_err(IdentityError::Encode)?;
        bytes.push(b'\n');

        let temp_path = self
            .dir()
            .join(format!(".{}.{}.tmp", NODE_FILE, Uuid::new_v4()));
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
            .map_err(|e| IdentityError::io(IoOp::CreateTemp, &temp_path, e))?;

        // From here on the temp file is removed on any early return.
        let staged = StagedWrite {
            temp_path,
            target: self.node_file(),
            dir: self.dir().to_path_buf(),
            sync: self.config.sync,
            committed: false,
        };

        write_temp(file, &bytes, &staged.temp_path, staged.sync)?;
        tracing::debug!(temp = %staged.temp_path.display(), len = bytes.len(), "staged identity");
        Ok(staged)
    }
}

/// A fully written temp file waiting to be renamed over `node.json`.
#[derive(Debug)]
#[must_use = "a staged write does nothing until committed"]
pub struct StagedWrite {
    temp_path: PathBuf,
    target: PathBuf,
    dir: PathBuf,
    sync: bool,
    committed: bool,
}

impl StagedWrite {
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Rename the temp file over the target. This is the commit point.
    pub fn commit(mut self) -> Result<(), IdentityError> {
        fs::rename(&self.temp_path, &self.target)
            .map_err(|e| IdentityError::io(IoOp::Rename, &self.temp_path, e))?;
        self.committed = true;

        if self.sync {
            sync_dir(&self.dir).map_err(|e| IdentityError::io(IoOp::SyncDir, &self.dir, e))?;
        }
        tracing::debug!(path = %self.target.display(), "identity saved");
        Ok(())
    }
}

impl Drop for StagedWrite {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        // Best-effort cleanup, failures are only logged.
        match fs::remove_file(&self.temp_path) {
            Ok(()) => tracing::debug!(temp = %self.temp_path.display(), "discarded staged identity"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(error = %e, temp = %self.temp_path.display(), "failed to remove temp identity file")
            }
        }
    }
}

/// Write and close the temp file. The handle is closed before returning either way.
fn write_temp(mut file: File, bytes: &[u8], path: &Path, sync: bool) -> Result<(), IdentityError> {
    file.write_all(bytes)
        .map_err(|e| IdentityError::io(IoOp::Write, path, e))?;
    if sync {
        file.sync_all()
            .map_err(|e| IdentityError::io(IoOp::Sync, path, e))?;
    }
    Ok(())
}

/// Read a whole file, mapping a missing file to `None`.
pub(crate) fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, IdentityError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(IdentityError::io(IoOp::Read, path, e)),
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
