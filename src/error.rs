//! Error types for the board engine.
//!
//! Two kinds of failure leave the engine: a full grid when spawning
//! (`BoardError::NoSpace`, an expected end-of-game) and broken invariants
//! (`BoardError::Invariant`, a defect the host must treat as fatal).

use crate::arena::TileId;

/// Error type for board operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("there is no space to add a new tile on a {size}x{size} board")]
    NoSpace { size: usize },
    #[error("board size {size} is outside 1..={max}")]
    InvalidSize { size: usize, max: usize },
    #[error("board invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
}

impl BoardError {
    /// True for the expected "grid is full" outcome
    pub fn is_game_over(&self) -> bool {
        matches!(self, Self::NoSpace { .. })
    }

    /// True for broken invariants (never recoverable)
    pub fn is_defect(&self) -> bool {
        matches!(self, Self::Invariant(_))
    }
}

/// A structural invariant of the tile set that did not hold
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("two tiles occupy cell ({x}, {y})")]
    DuplicateTile { x: usize, y: usize },
    #[error("cell ({x}, {y}) is outside a {size}x{size} board")]
    OutOfBounds { x: usize, y: usize, size: usize },
    #[error("tile at ({x}, {y}) has pending state when none is expected")]
    StalePending { x: usize, y: usize },
    #[error("tile at ({x}, {y}) is still sliding")]
    StillMoving { x: usize, y: usize },
    #[error("unknown tile handle {0:?}")]
    UnknownTile(TileId),
}
