//! Goal test and distance-to-goal estimates.
//!
//! Tile `v` belongs at row `(v - 1) / cols`, column `(v - 1) % cols`. Both
//! coordinates divide by the column count, which keeps the arithmetic right
//! on non-square boards.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseHeuristicModeError;
use crate::puzzle::{Dimension, Puzzle};

/// Which estimate [`Puzzle::cost`] returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HeuristicMode {
    /// Sum of tile distances to their goal cells.
    #[default]
    Manhattan,
    /// Number of tiles off their goal cell.
    Misplaced,
    /// Manhattan distance plus misplaced count. Not admissible.
    Combined,
    /// Manhattan distance plus two moves for every tile that has to step out
    /// of its goal row or column to let another tile past.
    LinearConflict,
}

impl HeuristicMode {
    pub const ALL: [Self; 4] = [
        Self::Manhattan,
        Self::Misplaced,
        Self::Combined,
        Self::LinearConflict,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Manhattan => "manhattan",
            Self::Misplaced => "misplaced",
            Self::Combined => "combined",
            Self::LinearConflict => "linear-conflict",
        }
    }

    /// Whether the estimate never exceeds the true number of remaining moves.
    pub fn is_admissible(self) -> bool {
        !matches!(self, Self::Combined)
    }
}

impl fmt::Display for HeuristicMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HeuristicMode {
    type Err = ParseHeuristicModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseHeuristicModeError {
                input: s.to_owned(),
            })
    }
}

/// Goal cell of tile `value` on a board with `cols` columns; `None` for the blank.
pub fn goal_position(value: u32, cols: usize) -> Option<(usize, usize)> {
    if value == 0 || cols == 0 {
        return None;
    }
    let index = value as usize - 1;
    Some((index / cols, index % cols))
}

impl Puzzle {
    /// `(current cell, goal cell)` of every non-blank tile.
    fn placements(&self) -> impl Iterator<Item = ((usize, usize), (usize, usize))> + '_ {
        let cols = self.dimension().cols;
        self.board().iter().enumerate().flat_map(move |(row, cells)| {
            cells.iter().enumerate().filter_map(move |(col, &value)| {
                goal_position(value, cols).map(|goal| ((row, col), goal))
            })
        })
    }

    /// True iff every tile sits on its goal cell.
    pub fn is_goal_state(&self) -> bool {
        self.placements().all(|(at, goal)| at == goal)
    }

    pub fn manhattan_distance(&self) -> usize {
        self.placements()
            .map(|((row, col), (goal_row, goal_col))| row.abs_diff(goal_row) + col.abs_diff(goal_col))
            .sum()
    }

    pub fn misplaced_count(&self) -> usize {
        self.placements().filter(|(at, goal)| at != goal).count()
    }

    /// Tiles that must leave their goal row or column so the others in that
    /// line can reach their goal order.
    ///
    /// For each line this is the number of tiles already in their goal line
    /// minus the longest run of them that is in increasing order.
    pub fn linear_conflicts(&self) -> usize {
        let Dimension { rows, cols } = self.dimension();
        let board = self.board();
        let mut conflicts = 0;

        for row in 0..rows {
            let line: Vec<u32> = (0..cols)
                .map(|col| board[row][col])
                .filter(|&value| goal_position(value, cols).is_some_and(|(goal_row, _)| goal_row == row))
                .collect();
            conflicts += line.len() - longest_increasing_subsequence(&line);
        }

        for col in 0..cols {
            let line: Vec<u32> = (0..rows)
                .map(|row| board[row][col])
                .filter(|&value| goal_position(value, cols).is_some_and(|(_, goal_col)| goal_col == col))
                .collect();
            conflicts += line.len() - longest_increasing_subsequence(&line);
        }

        conflicts
    }

    /// Distance-to-goal estimate under `mode`.
    pub fn cost(&self, mode: HeuristicMode) -> usize {
        match mode {
            HeuristicMode::Manhattan => self.manhattan_distance(),
            HeuristicMode::Misplaced => self.misplaced_count(),
            HeuristicMode::Combined => self.manhattan_distance() + self.misplaced_count(),
            HeuristicMode::LinearConflict => self.manhattan_distance() + 2 * self.linear_conflicts(),
        }
    }
}

fn longest_increasing_subsequence(values: &[u32]) -> usize {
    let mut tails: Vec<u32> = Vec::with_capacity(values.len());
    for &value in values {
        let at = tails.partition_point(|&tail| tail < value);
        if at == tails.len() {
            tails.push(value);
        } else {
            tails[at] = value;
        }
    }
    tails.len()
}
