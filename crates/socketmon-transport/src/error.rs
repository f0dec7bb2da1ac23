/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding or accepting connections failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),
}

/// A connection id string that isn't of the form `conn-<n>`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed connection id: {0:?}")]
pub struct ParseConnectionIdError(pub String);
