//! Sliding-tile puzzle core for best-first search.
//!
//! This crate defines what an N-puzzle state is, how to enumerate its legal
//! successors, how to estimate its distance to the goal and whether it can
//! reach the goal at all. Ordering and bounding the search is left to the
//! driver that consumes these primitives.

pub mod config;
pub mod error;
pub mod heuristic;
pub mod puzzle;
pub mod solvability;

// Re-export main types
pub use config::SearchConfig;
pub use error::{BoardDefect, ParseHeuristicModeError, PuzzleError};
pub use heuristic::{goal_position, HeuristicMode};
pub use puzzle::{Dimension, Move, Puzzle};
pub use solvability::inversion_count;
