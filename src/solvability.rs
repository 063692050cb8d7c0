//! Permutation-parity test for whether a board can reach the goal layout.

use log::debug;

use crate::puzzle::{Dimension, Puzzle};

/// Pairs `(i, j)` with `i < j` and `flattened[i] > flattened[j]`.
///
/// The blank counts as the value `0`, so it forms an inversion with every
/// tile that precedes it.
pub fn inversion_count(flattened: &[u32]) -> usize {
    flattened
        .iter()
        .enumerate()
        .map(|(i, &val)| flattened[i + 1..].iter().filter(|&&next| next < val).count())
        .sum()
}

impl Puzzle {
    /// Whether some sequence of moves turns this board into the goal layout.
    ///
    /// With an odd number of columns a vertical move shifts a tile past an
    /// even number of others, so the tile inversion parity is invariant and
    /// must be even. With an even number of columns every vertical move flips
    /// that parity and moves the blank one row, so the tile inversions plus
    /// the blank's distance from the bottom row must be even. A single row or
    /// column never reorders its tiles, so they must already be in order.
    pub fn is_solvable(&self) -> bool {
        let Dimension { rows, cols } = self.dimension();
        let flattened = self.flatten();
        let Some(blank_index) = flattened.iter().position(|&v| v == 0) else {
            return false;
        };

        // Every cell ahead of the blank holds a larger value.
        let tile_inversions = inversion_count(&flattened) - blank_index;

        let solvable = if rows == 1 || cols == 1 {
            tile_inversions == 0
        } else if cols % 2 == 1 {
            tile_inversions % 2 == 0
        } else {
            let rows_below_blank = rows - 1 - blank_index / cols;
            (tile_inversions + rows_below_blank) % 2 == 0
        };

        debug!(
            "{} board with {} tile inversions is {}",
            self.dimension(),
            tile_inversions,
            if solvable { "solvable" } else { "unsolvable" }
        );
        solvable
    }
}
