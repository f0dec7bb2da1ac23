//! Error types for the game layer.
//!
//! Apart from [`GameError::InvalidGrid`], every variant is a protocol
//! violation by one client. The `Display` text is what that client
//! receives in its `error` event, and the game state is untouched.

/// Errors that can occur while matchmaking or refereeing a move.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// Move sent by the wrong role, or in the wrong phase.
    #[error("not your turn")]
    NotYourTurn,

    /// The cell was already guessed wrong this game.
    #[error("cell already eliminated")]
    CellEliminated,

    /// The cell is outside the grid.
    #[error("invalid cell")]
    InvalidCell,

    /// The sender has no game (never matched, or it already ended).
    #[error("no active game")]
    NoActiveGame,

    /// `declare-role` from a connection that is mid-game.
    #[error("already in game")]
    AlreadyInGame,

    /// `declare-role` from a connection that is already queued.
    #[error("already waiting for an opponent")]
    AlreadyQueued,

    /// A grid needs at least two cells for hiding to mean anything.
    #[error("grid needs at least 2 cells, got {0}")]
    InvalidGrid(u8),
}
