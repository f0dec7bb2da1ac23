//! Connection registry for Socketmon.
//!
//! Tracks every live connection and the channel its handler task drains
//! to the socket. Other layers address clients only by [`ConnectionId`];
//! this crate turns an id into an actual delivery.
//!
//! # How it fits in the stack
//!
//! ```text
//! Server (above)    ← registers on accept, unregisters on close
//!     ↕
//! Registry (this crate)  ← id → outbound channel
//!     ↕
//! Protocol (below)  ← provides ConnectionId, ServerEvent
//! ```
//!
//! [`ConnectionId`]: socketmon_protocol::ConnectionId

mod error;
mod registry;

pub use error::RegistryError;
pub use registry::{ConnectionRegistry, OutboundReceiver, OutboundSender};
