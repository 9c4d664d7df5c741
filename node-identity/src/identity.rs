use serde::{Deserialize, Serialize};

use crate::error::IdentityError;
use crate::id::NodeId;
use crate::meta_servers::MetaServers;

#[cfg(test)]
#[path = "identity.test.rs"]
mod tests;

/// A node's identity: its cluster-wide id and the metadata servers it knows.
///
/// This is plain data. Where it lives on disk is decided by the
/// [`IdentityStore`](crate::store::IdentityStore) that loads and saves it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeIdentity {
    #[serde(alias = "ID")]
    id: NodeId,
    #[serde(rename = "metaServers", alias = "MetaServers", default)]
    meta_servers: MetaServers,
}

impl NodeIdentity {
    /// A fresh identity with no id and no known metadata servers.
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh identity seeded with the metadata servers known at startup.
    pub fn with_meta_servers<I, S>(addrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: NodeId::UNSET,
            meta_servers: addrs.into_iter().collect(),
        }
    }

    pub(crate) fn migrated(id: NodeId, meta_servers: MetaServers) -> Self {
        Self { id, meta_servers }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn meta_servers(&self) -> &MetaServers {
        &self.meta_servers
    }

    /// Merge newly discovered metadata-server addresses into the known set.
    ///
    /// Nothing is persisted; call [`IdentityStore::save`](crate::store::IdentityStore::save)
    /// for that.
    pub fn add_meta_servers<I, S>(&mut self, addrs: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let added = self.meta_servers.extend(addrs);
        tracing::trace!(added, total = self.meta_servers.len(), "merged meta servers");
    }

    /// Give an unassigned identity its id. An id can be assigned only once.
    pub fn assign_id(&mut self, id: impl Into<NodeId>) -> Result<(), IdentityError> {
        let id = id.into();
        if !id.is_set() {
            return Err(IdentityError::InvalidId);
        }
        if self.id.is_set() {
            return Err(IdentityError::IdAlreadyAssigned { current: self.id });
        }
        self.id = id;
        Ok(())
    }
}
