//! Session orchestration for Socketmon.
//!
//! Pairs waiting players into two-player games and referees each game's
//! turns. Everything here is synchronous and transport-agnostic: methods
//! take a [`ConnectionId`] and return the events to deliver, and the
//! server layer decides how they reach the wire.
//!
//! # Key types
//!
//! - [`Orchestrator`]: the single owner of all matchmaking and game state
//! - [`RoleQueues`]: FIFO waiting lists, one per role
//! - [`GameSession`]: one game's turn state machine
//! - [`SessionDirectory`]: connection → queue slot or game, O(1)
//! - [`GridConfig`]: grid size and the escape threshold derived from it
//!
//! [`ConnectionId`]: socketmon_protocol::ConnectionId

mod config;
mod directory;
mod error;
mod orchestrator;
mod queue;
mod session;

pub use config::GridConfig;
pub use directory::{GameId, Membership, SessionDirectory};
pub use error::GameError;
pub use orchestrator::Orchestrator;
pub use queue::{RoleQueues, WaitingPlayer};
pub use session::{Delivery, GameSession, Outcome, Seat, TurnState};
