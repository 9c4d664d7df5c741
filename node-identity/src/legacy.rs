//! Migration from the single-value `id` marker to `node.json`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::IdentityError;
use crate::id::NodeId;
use crate::identity::NodeIdentity;
use crate::meta_servers::MetaServers;
use crate::store::{IdentityStore, read_optional};

#[cfg(test)]
#[path = "legacy.test.rs"]
mod tests;

/// What [`IdentityStore::detect_legacy`] found in the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegacyState {
    /// No marker, or an empty one. Nothing to migrate.
    Absent,
    /// A valid single-node legacy identity that can be migrated.
    Pending(LegacyIdentity),
    /// The legacy cluster had several peers. Needs an operator; never migrated.
    Blocked { peers: Vec<String> },
}

/// A legacy identity read from the `id` marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyIdentity {
    id: NodeId,
    marker: PathBuf,
    peers: Vec<String>,
}

impl LegacyIdentity {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn marker(&self) -> &Path {
        &self.marker
    }

    /// Peers listed in the legacy peer file. At most one.
    pub fn peers(&self) -> &[String] {
        &self.peers
    }
}

impl IdentityStore {
    /// Inspect the data directory for legacy identity files. Never writes.
    pub fn detect_legacy(&self) -> Result<LegacyState, IdentityError> {
        let marker = self.legacy_id_file();
        let Some(raw) = read_optional(&marker)? else {
            tracing::debug!("no legacy id marker");
            return Ok(LegacyState::Absent);
        };

        let text = String::from_utf8_lossy(&raw);
        let text = text.trim();
        if text.is_empty() {
            tracing::warn!(path = %marker.display(), "ignoring empty legacy id marker");
            return Ok(LegacyState::Absent);
        }

        let peers = self.read_legacy_peers()?;
        if peers.len() > 1 {
            return Ok(LegacyState::Blocked { peers });
        }

        let id = parse_legacy_id(text).map_err(|reason| IdentityError::InvalidLegacyId {
            path: marker.clone(),
            reason,
        })?;
        tracing::debug!(%id, peers = peers.len(), "found legacy identity");
        Ok(LegacyState::Pending(LegacyIdentity { id, marker, peers }))
    }

    /// Persist `legacy` as `node.json` with `seed` as its metadata servers and
    /// remove the legacy marker.
    ///
    /// If `node.json` already exists an earlier migration got as far as saving
    /// it. That file is kept as is and only the marker is removed, so the
    /// persisted id never changes.
    #[tracing::instrument(skip(self, legacy, seed), fields(dir = %self.dir().display(), id = %legacy.id))]
    pub fn migrate<I, S>(&self, legacy: LegacyIdentity, seed: I) -> Result<NodeIdentity, IdentityError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let identity = match self.load_existing()? {
            Some(existing) => {
                if existing.id() != legacy.id {
                    tracing::warn!(
                        persisted = %existing.id(),
                        marker = %legacy.id,
                        "stale legacy marker disagrees with node.json, keeping node.json"
                    );
                } else {
                    tracing::debug!("node.json already migrated, removing stale marker");
                }
                existing
            }
            None => {
                let meta_servers: MetaServers = seed.into_iter().collect();
                let identity = NodeIdentity::migrated(legacy.id, meta_servers);
                self.save(&identity)?;
                identity
            }
        };

        if let Err(source) = fs::remove_file(&legacy.marker) {
            if source.kind() != io::ErrorKind::NotFound {
                tracing::debug!(error = %source, "identity saved but legacy marker could not be removed");
                return Err(IdentityError::MarkerRemoval {
                    identity: Box::new(identity),
                    path: legacy.marker,
                    source,
                });
            }
        }

        tracing::info!(
            id = %identity.id(),
            meta_servers = identity.meta_servers().len(),
            "migrated legacy node identity"
        );
        Ok(identity)
    }

    fn read_legacy_peers(&self) -> Result<Vec<String>, IdentityError> {
        let path = self.legacy_peers_file();
        match read_optional(&path)? {
            Some(raw) if !raw.trim_ascii().is_empty() => {
                serde_json::from_slice::<Option<Vec<String>>>(&raw)
                    .map(Option::unwrap_or_default)
                    .map_err(|source| IdentityError::InvalidPeers { path, source })
            }
            _ => Ok(Vec::new()),
        }
    }
}

fn parse_legacy_id(text: &str) -> Result<NodeId, String> {
    let id: NodeId = text.parse().map_err(|e: std::num::ParseIntError| e.to_string())?;
    if !id.is_set() {
        return Err("id 0 is reserved for an unassigned node".to_string());
    }
    Ok(id)
}
