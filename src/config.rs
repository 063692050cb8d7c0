//! Configuration held by a search driver.

use crate::heuristic::HeuristicMode;
use crate::puzzle::Puzzle;

/// Settings a driver threads through every cost evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchConfig {
    /// Estimate used to prioritise the frontier.
    pub heuristic: HeuristicMode,
}

impl SearchConfig {
    pub fn new(heuristic: HeuristicMode) -> Self {
        Self { heuristic }
    }

    /// Cost of `puzzle` under the configured heuristic.
    pub fn cost(&self, puzzle: &Puzzle) -> usize {
        puzzle.cost(self.heuristic)
    }
}
