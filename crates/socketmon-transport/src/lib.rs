//! Transport abstraction layer for Socketmon.
//!
//! Provides the [`Transport`] and [`Connection`] traits that abstract over
//! the network protocol, and the [`ConnectionId`] every other layer uses to
//! address a connected client.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::{ParseConnectionIdError, TransportError};
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Opaque identifier for a connection.
///
/// Assigned once at accept time and never reused within a process. On the
/// wire it travels as the string `"conn-<n>"`, so clients can treat it as
/// an opaque token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

impl FromStr for ConnectionId {
    type Err = ParseConnectionIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("conn-")
            .and_then(|n| n.parse::<u64>().ok())
            .map(ConnectionId)
            .ok_or_else(|| ParseConnectionIdError(s.to_string()))
    }
}

impl Serialize for ConnectionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ConnectionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One inbound frame, as seen by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Application data from a text or binary frame.
    Data(Vec<u8>),
    /// A ping or pong. Carries nothing, but proves the peer is alive.
    Heartbeat,
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;
}

/// A single connection that can send and receive text frames.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends one text frame to the remote peer.
    async fn send(&self, text: &str) -> Result<(), Self::Error>;

    /// Receives the next frame from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Inbound>, Self::Error>;

    /// Sends a liveness probe; the peer is expected to answer on its own.
    async fn ping(&self) -> Result<(), Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_display() {
        let id = ConnectionId::new(7);
        assert_eq!(id.to_string(), "conn-7");
    }

    #[test]
    fn test_connection_id_parses_its_display_form() {
        let id: ConnectionId = "conn-42".parse().unwrap();
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_connection_id_rejects_foreign_strings() {
        assert!("42".parse::<ConnectionId>().is_err());
        assert!("conn-".parse::<ConnectionId>().is_err());
        assert!("conn-abc".parse::<ConnectionId>().is_err());
        assert!("socket-3".parse::<ConnectionId>().is_err());
    }

    #[test]
    fn test_connection_id_serializes_as_string() {
        let json = serde_json::to_string(&ConnectionId::new(3)).unwrap();
        assert_eq!(json, "\"conn-3\"");
    }

    #[test]
    fn test_connection_id_deserialize_rejects_numbers() {
        // Clients only ever see the string form.
        let result: Result<ConnectionId, _> = serde_json::from_str("3");
        assert!(result.is_err());
    }

    #[test]
    fn test_connection_id_hash_works_as_map_key() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(ConnectionId::new(1), "ash");
        map.insert(ConnectionId::new(2), "pikachu");
        assert_eq!(map[&ConnectionId::new(1)], "ash");
    }
}
