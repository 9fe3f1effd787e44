//! Error types. An invalid (non-matching) swap is not an error; see `cascade::InteractionOutcome`.

use crate::board::Position;
use thiserror::Error;

/// Interaction requests rejected before any board mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("position {0} is outside the grid")]
    OutOfBounds(Position),
    #[error("positions {0} and {1} are not adjacent")]
    NotAdjacent(Position, Position),
    #[error("previous interaction is still playing back")]
    Busy,
    #[error("level is already over")]
    LevelOver,
}

/// Failure reading or writing the progress file. Absorbed by the store's `load`.
#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed progress file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Malformed text layout passed to `Board::from_rows`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("expected {expected} rows, got {found}")]
    RowCount { expected: usize, found: usize },
    #[error("row {row} has {found} cells, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown tile symbol {symbol:?} at ({row}, {col})")]
    Symbol { symbol: char, row: usize, col: usize },
}
