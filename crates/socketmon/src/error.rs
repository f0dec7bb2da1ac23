//! Unified error type for the Socketmon server.

use socketmon_protocol::ProtocolError;
use socketmon_registry::RegistryError;
use socketmon_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// Game rule violations are not here: they are answered with an `error`
/// event to the offending client and never end a connection.
#[derive(Debug, thiserror::Error)]
pub enum SocketmonError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A registry error (double registration, unknown connection).
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
