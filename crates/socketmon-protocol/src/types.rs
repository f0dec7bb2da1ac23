//! Event types for Socketmon's wire format.
//!
//! Every frame on the wire is a single JSON object whose `event` field
//! names the variant. Event names are kebab-case and field names are
//! camelCase, which is what browser clients expect:
//!
//! ```text
//! { "event": "guess", "cell": 5 }
//! { "event": "wrong-guess", "guessedCell": 5, "eliminatedCells": [5], ... }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use socketmon_transport::ConnectionId;

// ---------------------------------------------------------------------------
// Roles and cells
// ---------------------------------------------------------------------------

/// The two sides of a game.
///
/// The pokemon hides, the trainer seeks. Serialized as `"pokemon"` and
/// `"trainer"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The hider. Picks a cell every round.
    Pokemon,
    /// The seeker. Guesses where the pokemon is.
    Trainer,
}

impl Role {
    /// Returns the role on the other side of the board.
    pub fn opponent(self) -> Self {
        match self {
            Self::Pokemon => Self::Trainer,
            Self::Trainer => Self::Pokemon,
        }
    }

    /// The display name a player gets when they don't type one.
    pub fn default_name(self) -> &'static str {
        match self {
            Self::Pokemon => "Pokémon",
            Self::Trainer => "Treinador",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pokemon => write!(f, "pokemon"),
            Self::Trainer => write!(f, "trainer"),
        }
    }
}

/// One cell of the grid, numbered from 1.
///
/// The protocol doesn't know the grid size; range checks happen in the
/// game layer against its configured grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cell(pub u8);

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a finished game turned out for the receiving player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameResult {
    Win,
    Lose,
}

/// Why a game was torn down without a winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndReason {
    OpponentDisconnected,
}

// ---------------------------------------------------------------------------
// ClientEvent: connection → server
// ---------------------------------------------------------------------------

/// Everything a client can send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// "Put me in the queue for this role."
    DeclareRole { name: String, role: Role },

    /// Pokemon only: "I'm hiding here."
    SelectPosition { cell: Cell },

    /// Trainer only: "Is it here?"
    Guess { cell: Cell },

    /// Relay a chat line to another connection.
    ChatMessage {
        text: String,
        sender_name: String,
        target_connection_id: ConnectionId,
    },

    /// A free-form line. The server only logs it.
    Message { text: String },
}

// ---------------------------------------------------------------------------
// ServerEvent: server → connection
// ---------------------------------------------------------------------------

/// Everything the server can send to a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Sent once, right after the connection is accepted.
    AssignedId { connection_id: ConnectionId },

    /// A match was found. `current_turn` is always the pokemon's.
    GameStarted {
        role: Role,
        opponent_name: String,
        opponent_connection_id: ConnectionId,
        current_turn: Role,
        message: String,
    },

    /// It's the receiver's move.
    YourTurn {
        message: String,
        eliminated_cells: Vec<Cell>,
        attempt_count: u32,
    },

    /// The receiver has to wait for the opponent.
    WaitTurn { message: String },

    /// The pokemon's hiding spot was recorded.
    PositionAccepted {},

    /// The trainer missed.
    WrongGuess {
        guessed_cell: Cell,
        eliminated_cells: Vec<Cell>,
        attempt_count: u32,
        message: String,
    },

    /// The game has a winner.
    GameOver {
        result: GameResult,
        attempt_count: u32,
        revealed_position: Cell,
        message: String,
    },

    /// The game was torn down without a winner.
    GameEnded { reason: EndReason },

    /// A rejected action. Only the offending sender gets this.
    Error { message: String },

    /// A relayed chat line.
    ChatMessage { sender_name: String, text: String },
}

impl ServerEvent {
    /// Shorthand for an [`ServerEvent::Error`] with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
