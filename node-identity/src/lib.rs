//! # node-identity
//!
//! Durable storage for a cluster node's identity: its `u64` id and the set of
//! metadata-service addresses it knows about.
//!
//! ```no_run
//! use node_identity::prelude::*;
//!
//! let store = IdentityStore::open("/var/lib/node/meta");
//! let mut identity = store.load_or_migrate(["10.0.0.1:8088"])?;
//! identity.add_meta_servers(["10.0.0.2:8088"]);
//! store.save(&identity)?;
//! # Ok::<(), IdentityError>(())
//! ```
//!
//! Nodes created by older releases kept only a bare `id` file. The first
//! [`IdentityStore::load_or_migrate`] on such a directory rewrites it as
//! `node.json` and removes the old marker. Legacy clusters with more than one
//! peer are refused with [`IdentityError::MigrationConflict`].

mod config;
mod error;
mod id;
mod identity;
mod legacy;
mod meta_servers;
pub mod prelude;
mod store;
#[cfg(test)]
mod test_utils;

pub use config::{Config, LEGACY_ID_FILE, LEGACY_PEERS_FILE, NODE_FILE};
pub use error::{ErrorKind, IdentityError, IoOp};
pub use id::NodeId;
pub use identity::NodeIdentity;
pub use legacy::{LegacyIdentity, LegacyState};
pub use meta_servers::MetaServers;
pub use store::{IdentityStore, StagedWrite};
