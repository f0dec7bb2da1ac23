//! Error types for the protocol layer.
//!
//! Each crate in Socketmon defines its own error enum, so a
//! `ProtocolError` always means the problem is in (de)serialization, not
//! in networking or game rules.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning an event into text).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning a frame into an event).
    ///
    /// Common causes: malformed JSON, an unknown `event` tag, missing
    /// fields, or a connection id that isn't of the `conn-<n>` form.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame is unusable before parsing starts (e.g. empty).
    #[error("{0}")]
    InvalidMessage(String),
}
