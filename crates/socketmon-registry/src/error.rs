//! Error types for the registry layer.

use socketmon_protocol::ConnectionId;

/// Errors that can occur while tracking connections.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The id is already registered. Ids are never reused, so this means
    /// a handler registered itself twice.
    #[error("connection {0} is already registered")]
    AlreadyRegistered(ConnectionId),

    /// No live connection has this id.
    #[error("connection {0} not found")]
    NotFound(ConnectionId),
}
