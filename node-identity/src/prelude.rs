//! Commonly used identity store types.
//!
//! Import this module to load, migrate and save a node identity.

pub use super::config::Config; // Store configuration
pub use super::error::{ErrorKind, IdentityError}; // Errors and their classification
pub use super::id::NodeId; // Node identifier, zero when unassigned
pub use super::identity::NodeIdentity; // The persisted identity
pub use super::store::IdentityStore; // Load, migrate and save
