//! Error types for puzzle construction and move application.

/// Errors raised by the puzzle core.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PuzzleError {
    /// The input grid is not a permutation of `0..rows*cols` in the declared shape.
    ///
    /// Only ever returned while constructing a [`Puzzle`](crate::Puzzle).
    #[display("invalid board: {defect}")]
    InvalidBoard {
        /// What exactly is wrong with the grid.
        defect: BoardDefect,
    },
    /// An internal invariant broke while manipulating a well-formed board.
    ///
    /// This is a defect in the crate, not a user error.
    #[display("invariant violation: {detail}")]
    InvariantViolation {
        /// Which invariant failed.
        detail: &'static str,
    },
}

impl From<BoardDefect> for PuzzleError {
    fn from(defect: BoardDefect) -> Self {
        Self::InvalidBoard { defect }
    }
}

/// The reason a grid was rejected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum BoardDefect {
    #[display("dimension must have at least one row and one column")]
    EmptyDimension,
    #[display("expected {expected} rows, found {found}")]
    RowCountMismatch { expected: usize, found: usize },
    #[display("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[display("value {value} is out of range 0..={max}")]
    ValueOutOfRange { value: u32, max: u32 },
    #[display("value {value} appears more than once")]
    DuplicateValue { value: u32 },
    #[display("a {rows}x{cols} board has more cells than tile values can number")]
    TooLarge { rows: usize, cols: usize },
}

/// Returned when a heuristic name does not match any [`HeuristicMode`](crate::HeuristicMode).
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown heuristic `{input}` (expected manhattan, misplaced, combined or linear-conflict)")]
pub struct ParseHeuristicModeError {
    pub input: String,
}
