//! Error types for identity persistence

use std::fmt;
use std::path::PathBuf;

use crate::id::NodeId;
use crate::identity::NodeIdentity;

/// The filesystem step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    Read,
    CreateTemp,
    Write,
    Sync,
    Rename,
    SyncDir,
}

impl fmt::Display for IoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            IoOp::Read => "read",
            IoOp::CreateTemp => "create temp file",
            IoOp::Write => "write",
            IoOp::Sync => "sync",
            IoOp::Rename => "rename",
            IoOp::SyncDir => "sync directory",
        };
        f.write_str(op)
    }
}

/// Coarse classification callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Stored content could not be parsed or decoded. Not retriable.
    Format,
    /// A multi-peer legacy cluster was found. Requires an operator.
    MigrationConflict,
    /// A filesystem operation failed. The whole load or save may be retried.
    Io,
    /// The caller misused the API, e.g. assigning an id twice.
    Usage,
}

/// Errors that can occur while loading, migrating or saving a node identity
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("failed to {op} {}: {source}", path.display())]
    Io {
        op: IoOp,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("legacy id marker {} is not a valid node id: {reason}", path.display())]
    InvalidLegacyId { path: PathBuf, reason: String },

    #[error("legacy peers file {} could not be decoded: {source}", path.display())]
    InvalidPeers {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("identity file {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode node identity: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("legacy cluster has {} peers and cannot be migrated automatically", peers.len())]
    MigrationConflict { peers: Vec<String> },

    #[error("identity {} was saved but the legacy marker {} could not be removed: {source}", identity.id(), path.display())]
    MarkerRemoval {
        identity: Box<NodeIdentity>,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("node id is already assigned ({current})")]
    IdAlreadyAssigned { current: NodeId },

    #[error("node id 0 is reserved for an unassigned node")]
    InvalidId,
}

impl IdentityError {
    pub(crate) fn io(op: IoOp, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IdentityError::Io {
            op,
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            IdentityError::Io { .. } | IdentityError::MarkerRemoval { .. } => ErrorKind::Io,
            IdentityError::InvalidLegacyId { .. }
            | IdentityError::InvalidPeers { .. }
            | IdentityError::Corrupt { .. }
            | IdentityError::Encode(_) => ErrorKind::Format,
            IdentityError::MigrationConflict { .. } => ErrorKind::MigrationConflict,
            IdentityError::IdAlreadyAssigned { .. } | IdentityError::InvalidId => ErrorKind::Usage,
        }
    }

    /// Whether repeating the whole load or save can succeed without operator action.
    pub fn is_retriable(&self) -> bool {
        self.kind() == ErrorKind::Io
    }

    /// The durably saved identity carried by a failed marker removal.
    ///
    /// Callers that only need the identity to continue booting can take it
    /// from here after reporting the error.
    pub fn recovered_identity(self) -> Option<NodeIdentity> {
        match self {
            IdentityError::MarkerRemoval { identity, .. } => Some(*identity),
            _ => None,
        }
    }
}
