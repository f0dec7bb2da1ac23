//! Grid configuration.

use socketmon_protocol::Cell;

use crate::GameError;

/// The shape of the board every game is played on.
///
/// Cells are numbered `1..=size`. The pokemon escapes once
/// [`escape_threshold`](Self::escape_threshold) cells are eliminated,
/// i.e. when a single unguessed cell is left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridConfig {
    size: u8,
}

impl GridConfig {
    /// Number of cells in the classic board.
    pub const DEFAULT_SIZE: u8 = 8;

    /// Creates a grid with `size` cells.
    ///
    /// # Errors
    /// Returns [`GameError::InvalidGrid`] if `size < 2`.
    pub fn new(size: u8) -> Result<Self, GameError> {
        if size < 2 {
            return Err(GameError::InvalidGrid(size));
        }
        Ok(Self { size })
    }

    /// Number of cells.
    pub fn size(&self) -> u8 {
        self.size
    }

    /// Eliminated-cell count at which the pokemon has escaped.
    pub fn escape_threshold(&self) -> usize {
        usize::from(self.size) - 1
    }

    /// Returns `true` if `cell` is on the board.
    pub fn contains(&self, cell: Cell) -> bool {
        (1..=self.size).contains(&cell.0)
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: Self::DEFAULT_SIZE,
        }
    }
}
