//! # Socketmon
//!
//! Server for a two-player hide-and-seek game. Anonymous WebSocket
//! clients declare a role, get paired with the longest-waiting player of
//! the other role, and take turns: the pokemon hides in a grid cell, the
//! trainer guesses.
//!
//! The layers underneath are re-exported here, so a binary only needs
//! this crate:
//!
//! ```text
//! transport → protocol → registry / game → server (this crate)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use socketmon::prelude::*;
//!
//! # async fn run() -> Result<(), SocketmonError> {
//! let server = SocketmonServerBuilder::new()
//!     .bind("0.0.0.0:3001")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod dispatch;
mod error;
mod handler;
mod server;

pub use error::SocketmonError;
pub use server::{SocketmonServer, SocketmonServerBuilder, DEFAULT_IDLE_TIMEOUT};

pub use socketmon_game as game;
pub use socketmon_protocol as protocol;
pub use socketmon_registry as registry;
pub use socketmon_transport as transport;

/// Everything needed to start a server or talk to one in tests.
pub mod prelude {
    pub use crate::{SocketmonError, SocketmonServer, SocketmonServerBuilder};
    pub use socketmon_game::{GameError, GridConfig};
    pub use socketmon_protocol::{
        Cell, ClientEvent, Codec, ConnectionId, EndReason, GameResult, JsonCodec, Role,
        ServerEvent,
    };
}
