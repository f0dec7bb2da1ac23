//! The connection registry: tracks every live connection.
//!
//! # Concurrency note
//!
//! `ConnectionRegistry` is NOT thread-safe by itself; it uses a plain
//! `HashMap`. The server wraps it in a mutex next to the orchestrator, so
//! every mutation happens under a lock at a higher level.

use std::collections::HashMap;

use socketmon_protocol::{ConnectionId, ServerEvent};
use tokio::sync::mpsc;

use crate::RegistryError;

/// Channel sender for delivering outbound events to one connection.
pub type OutboundSender = mpsc::UnboundedSender<ServerEvent>;

/// The matching receiver, drained by the connection's handler task.
pub type OutboundReceiver = mpsc::UnboundedReceiver<ServerEvent>;

/// Knows every connection that is currently online.
///
/// ## Lifecycle
///
/// ```text
/// accept ──→ register() ──→ send()* ──→ unregister() ──→ (id is dead)
/// ```
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, OutboundSender>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a newly accepted connection and its outbound channel.
    ///
    /// # Errors
    /// Returns [`RegistryError::AlreadyRegistered`] if the id is live.
    pub fn register(
        &mut self,
        id: ConnectionId,
        sender: OutboundSender,
    ) -> Result<(), RegistryError> {
        if self.connections.contains_key(&id) {
            return Err(RegistryError::AlreadyRegistered(id));
        }
        self.connections.insert(id, sender);
        tracing::info!(conn_id = %id, total = self.connections.len(), "connection registered");
        Ok(())
    }

    /// Forgets a connection. Its id is never handed out again.
    ///
    /// # Errors
    /// Returns [`RegistryError::NotFound`] if the id isn't registered.
    pub fn unregister(&mut self, id: ConnectionId) -> Result<(), RegistryError> {
        self.connections
            .remove(&id)
            .ok_or(RegistryError::NotFound(id))?;
        tracing::info!(conn_id = %id, total = self.connections.len(), "connection unregistered");
        Ok(())
    }

    /// Queues an event for a connection.
    ///
    /// Best-effort, at most once: returns `false` if the target is offline
    /// or its handler has already stopped draining.
    pub fn send(&self, id: ConnectionId, event: ServerEvent) -> bool {
        match self.connections.get(&id) {
            Some(sender) => sender.send(event).is_ok(),
            None => {
                tracing::debug!(conn_id = %id, "dropping event for offline connection");
                false
            }
        }
    }

    /// Returns `true` if the id belongs to a live connection.
    pub fn is_connected(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    /// Number of live connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Returns `true` if nobody is connected.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
