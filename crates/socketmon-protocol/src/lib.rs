//! Wire protocol for Socketmon.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`Role`], [`Cell`], etc.):
//!   the events that travel on the wire, one JSON object per frame.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those events are
//!   converted to/from text.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! ```text
//! Transport (frames) → Protocol (events) → Game (queues, sessions)
//! ```
//!
//! The protocol layer knows nothing about queues or game rules. It only
//! knows the shape of each event.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{Cell, ClientEvent, EndReason, GameResult, Role, ServerEvent};

/// Re-exported so downstream crates can name connection ids without a
/// direct dependency on the transport crate.
pub use socketmon_transport::ConnectionId;
