use log::{debug, trace};
use rand::{seq::SliceRandom, Rng};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{BoardDefect, PuzzleError};
use crate::heuristic::HeuristicMode;

/// Direction the blank travels when it swaps with a neighbouring tile.
///
/// Directions are always blank-relative: `Up` moves the blank one row up,
/// which slides the tile that was above it one row down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Up,
    Left,
    Down,
    Right,
}

impl Move {
    /// Visits the blank's neighbours in row-major order of the cells they reach.
    pub const ROW_MAJOR: [Move; 4] = [Move::Up, Move::Left, Move::Right, Move::Down];

    /// `(row, col)` offset of the blank for this move.
    pub fn as_offset(&self) -> (isize, isize) {
        match self {
            Move::Up => (-1, 0),
            Move::Left => (0, -1),
            Move::Down => (1, 0),
            Move::Right => (0, 1),
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Move::Up => Move::Down,
            Move::Down => Move::Up,
            Move::Left => Move::Right,
            Move::Right => Move::Left,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            Move::Up => "Up",
            Move::Left => "Left",
            Move::Down => "Down",
            Move::Right => "Right",
        };
        write!(f, "{}", s)
    }
}

/// Shape of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimension {
    pub rows: usize,
    pub cols: usize,
}

impl Dimension {
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    pub const fn square(size: usize) -> Self {
        Self::new(size, size)
    }

    /// Number of cells, blank included. Saturates at `usize::MAX`.
    pub const fn len(&self) -> usize {
        self.rows.saturating_mul(self.cols)
    }

    /// Number of cells, or `None` if it overflows `usize`.
    pub const fn checked_len(&self) -> Option<usize> {
        self.rows.checked_mul(self.cols)
    }

    pub const fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Cell reached from `(row, col)` by `movement`, or `None` past the border.
    pub fn step(&self, (row, col): (usize, usize), movement: Move) -> Option<(usize, usize)> {
        let (dr, dc) = movement.as_offset();
        let row = row.checked_add_signed(dr)?;
        let col = col.checked_add_signed(dc)?;
        (row < self.rows && col < self.cols).then_some((row, col))
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// A sliding puzzle board together with the moves that produced it.
///
/// Every value in `0..rows*cols` appears exactly once and `0` is the blank.
/// Boards are only built through [`Puzzle::new`] (and the helpers layered on
/// it), so a `Puzzle` in hand is always well-formed. Successors are
/// independent deep copies and never share storage with their parent.
///
/// Equality and hashing cover the dimension, board and history but not the
/// cached cost.
#[derive(Debug, Clone)]
pub struct Puzzle {
    dimension: Dimension,
    board: Vec<Vec<u32>>,
    path: Vec<u32>,
    last_move: Option<u32>,
    cost: Option<usize>,
}

impl Puzzle {
    /// Builds an initial state from a `rows x cols` grid.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::InvalidBoard`] if the grid does not have the
    /// declared shape or is not a permutation of `0..rows*cols`.
    pub fn new(board: Vec<Vec<u32>>, dimension: Dimension) -> Result<Self, PuzzleError> {
        validate(&board, dimension)?;
        debug!("constructed {} puzzle", dimension);

        Ok(Self {
            dimension,
            board,
            path: Vec::new(),
            last_move: None,
            cost: None,
        })
    }

    /// Like [`Puzzle::new`], taking the dimension from the grid itself.
    pub fn from_rows(board: Vec<Vec<u32>>) -> Result<Self, PuzzleError> {
        let dimension = Dimension::new(board.len(), board.first().map_or(0, Vec::len));
        Self::new(board, dimension)
    }

    /// The solved layout: tiles `1..rows*cols` in row-major order, blank last.
    pub fn goal(dimension: Dimension) -> Result<Self, PuzzleError> {
        let len = check_dimension(dimension)?;
        let board = (0..dimension.rows)
            .map(|row| {
                (0..dimension.cols)
                    .map(|col| {
                        let index = row * dimension.cols + col;
                        if index + 1 == len {
                            0
                        } else {
                            index as u32 + 1
                        }
                    })
                    .collect()
            })
            .collect();

        Self::new(board, dimension)
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn board(&self) -> &[Vec<u32>] {
        &self.board
    }

    /// Tiles moved, in order, since the initial state.
    pub fn path(&self) -> &[u32] {
        &self.path
    }

    /// Tile moved to reach this state, `None` for an initial state.
    pub fn last_move(&self) -> Option<u32> {
        self.last_move
    }

    /// Heuristic value stored by the last [`Puzzle::evaluate`], if any.
    pub fn cached_cost(&self) -> Option<usize> {
        self.cost
    }

    /// Computes the cost under `mode` and keeps it in the cache.
    pub fn evaluate(&mut self, mode: HeuristicMode) -> usize {
        let cost = self.cost(mode);
        self.cost = Some(cost);
        cost
    }

    pub fn tile(&self, row: usize, col: usize) -> Option<u32> {
        self.board.get(row)?.get(col).copied()
    }

    /// Board values in row-major order.
    pub fn flatten(&self) -> Vec<u32> {
        self.board.iter().flat_map(|row| row.iter()).copied().collect()
    }

    /// Position of the blank.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::InvariantViolation`] if no cell holds `0`.
    pub fn locate_blank(&self) -> Result<(usize, usize), PuzzleError> {
        self.board
            .iter()
            .enumerate()
            .find_map(|(row, cells)| cells.iter().position(|&v| v == 0).map(|col| (row, col)))
            .ok_or(PuzzleError::InvariantViolation {
                detail: "board has no blank",
            })
    }

    /// Direction the blank would travel to swap with `tile`, or `None` if
    /// `tile` is not orthogonally adjacent to the blank.
    pub fn legal_move_for(&self, tile: u32) -> Option<Move> {
        let blank = self.locate_blank().ok()?;
        self.resolve(blank, tile).map(|(movement, _)| movement)
    }

    /// Tiles adjacent to the blank, in row-major order.
    pub fn legal_tiles(&self) -> Result<Vec<u32>, PuzzleError> {
        let blank = self.locate_blank()?;
        Ok(Move::ROW_MAJOR
            .into_iter()
            .filter_map(|movement| self.dimension.step(blank, movement))
            .map(|(row, col)| self.board[row][col])
            .collect())
    }

    /// Slides `tile` into the blank and returns the direction the blank took,
    /// or `None` if the move is not legal.
    ///
    /// Only the board changes: `path` and `last_move` are left alone and the
    /// cached cost is dropped.
    pub fn apply_move(&mut self, tile: u32) -> Result<Option<Move>, PuzzleError> {
        let (row, col) = self.locate_blank()?;
        let Some((movement, (tile_row, tile_col))) = self.resolve((row, col), tile) else {
            return Ok(None);
        };

        self.board[row][col] = self.board[tile_row][tile_col];
        self.board[tile_row][tile_col] = 0;
        self.cost = None;

        Ok(Some(movement))
    }

    /// Children for every legal move except the one undoing `last_move`.
    ///
    /// Each child is an independent copy with the moved tile appended to its
    /// path. A board whose only neighbour of the blank was just moved (a
    /// `1 x N` strip, say) yields no children.
    pub fn successors(&self) -> Result<Vec<Self>, PuzzleError> {
        let tiles = self.legal_tiles()?;
        let mut children = Vec::with_capacity(tiles.len());

        for tile in tiles {
            if Some(tile) == self.last_move {
                continue;
            }

            let mut path = Vec::with_capacity(self.path.len() + 1);
            path.extend_from_slice(&self.path);
            path.push(tile);

            let mut child = Self {
                dimension: self.dimension,
                board: self.board.clone(),
                path,
                last_move: Some(tile),
                cost: None,
            };
            if child.apply_move(tile)?.is_none() {
                return Err(PuzzleError::InvariantViolation {
                    detail: "tile adjacent to the blank was rejected as a move",
                });
            }
            children.push(child);
        }

        trace!(
            "expanded state at depth {} into {} children",
            self.path.len(),
            children.len()
        );
        Ok(children)
    }

    /// Replaces the board with a uniformly random solvable permutation.
    ///
    /// The result is a fresh initial state. Tiles on a single row or column
    /// can never pass each other, so there they are laid out in order around
    /// a randomly placed blank instead of being redrawn until solvable.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let Dimension { rows, cols } = self.dimension;
        let mut flattened = self.flatten();

        if rows == 1 || cols == 1 {
            let blank = rng.gen_range(0..flattened.len());
            let mut tiles = 1..;
            for (index, cell) in flattened.iter_mut().enumerate() {
                *cell = if index == blank { 0 } else { tiles.next().unwrap_or(0) };
            }
            self.fill(&flattened);
        } else {
            loop {
                flattened.shuffle(rng);
                self.fill(&flattened);

                if self.is_solvable() {
                    break;
                }
            }
        }

        self.reset_history();
    }

    /// Walks `moves` random steps from the current board without ever
    /// undoing the previous step. The result is a fresh initial state and is
    /// always solvable when the current board is.
    pub fn scramble<R: Rng + ?Sized>(&mut self, moves: usize, rng: &mut R) -> Result<(), PuzzleError> {
        let mut previous = None;

        for _ in 0..moves {
            let candidates: Vec<u32> = self
                .legal_tiles()?
                .into_iter()
                .filter(|&tile| Some(tile) != previous)
                .collect();
            let Some(&tile) = candidates.choose(rng) else {
                break;
            };

            self.apply_move(tile)?;
            previous = Some(tile);
        }

        self.reset_history();
        Ok(())
    }

    fn fill(&mut self, flattened: &[u32]) {
        let cols = self.dimension.cols;
        for (row, chunk) in self.board.iter_mut().zip(flattened.chunks(cols)) {
            row.copy_from_slice(chunk);
        }
    }

    fn reset_history(&mut self) {
        self.path.clear();
        self.last_move = None;
        self.cost = None;
    }

    /// Move and tile cell for sliding `tile` into the blank at `blank`.
    fn resolve(&self, blank: (usize, usize), tile: u32) -> Option<(Move, (usize, usize))> {
        if tile == 0 {
            return None;
        }

        Move::ROW_MAJOR.into_iter().find_map(|movement| {
            let (row, col) = self.dimension.step(blank, movement)?;
            (self.board[row][col] == tile).then_some((movement, (row, col)))
        })
    }
}

impl PartialEq for Puzzle {
    fn eq(&self, other: &Self) -> bool {
        self.dimension == other.dimension
            && self.board == other.board
            && self.path == other.path
            && self.last_move == other.last_move
    }
}

impl Eq for Puzzle {}

impl Hash for Puzzle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dimension.hash(state);
        self.board.hash(state);
        self.path.hash(state);
        self.last_move.hash(state);
    }
}

/// Cell count of `dimension`, provided it is non-empty and every tile value
/// fits in a `u32`.
fn check_dimension(dimension: Dimension) -> Result<usize, BoardDefect> {
    if dimension.is_empty() {
        return Err(BoardDefect::EmptyDimension);
    }
    dimension
        .checked_len()
        .filter(|&len| u32::try_from(len - 1).is_ok())
        .ok_or(BoardDefect::TooLarge {
            rows: dimension.rows,
            cols: dimension.cols,
        })
}

fn validate(board: &[Vec<u32>], dimension: Dimension) -> Result<(), BoardDefect> {
    let len = check_dimension(dimension)?;
    if board.len() != dimension.rows {
        return Err(BoardDefect::RowCountMismatch {
            expected: dimension.rows,
            found: board.len(),
        });
    }

    let max = (len - 1) as u32;
    let mut seen = vec![false; len];

    for (row, cells) in board.iter().enumerate() {
        if cells.len() != dimension.cols {
            return Err(BoardDefect::RaggedRow {
                row,
                expected: dimension.cols,
                found: cells.len(),
            });
        }
        for &value in cells {
            if value > max {
                return Err(BoardDefect::ValueOutOfRange { value, max });
            }
            let slot = &mut seen[value as usize];
            if *slot {
                return Err(BoardDefect::DuplicateValue { value });
            }
            *slot = true;
        }
    }

    // Right count, no duplicates, all in range: a permutation, so the blank is present.
    Ok(())
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = (self.dimension.len() - 1).to_string().len();
        for row in &self.board {
            for &val in row {
                write!(f, "{:>width$} ", val)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::hash_map::DefaultHasher;

    fn near_goal() -> Puzzle {
        Puzzle::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 0, 8]]).unwrap()
    }

    #[test]
    fn goal_layout_puts_blank_last() {
        let puzzle = Puzzle::goal(Dimension::new(2, 3)).unwrap();
        assert_eq!(puzzle.board(), &[vec![1, 2, 3], vec![4, 5, 0]]);
        assert_eq!(puzzle.locate_blank().unwrap(), (1, 2));
        assert!(puzzle.path().is_empty());
        assert_eq!(puzzle.last_move(), None);
    }

    #[test]
    fn rejects_malformed_boards() {
        let err = |board: Vec<Vec<u32>>, dimension| match Puzzle::new(board, dimension) {
            Err(PuzzleError::InvalidBoard { defect }) => defect,
            other => panic!("expected InvalidBoard, got {other:?}"),
        };

        assert_eq!(err(vec![], Dimension::new(0, 3)), BoardDefect::EmptyDimension);
        assert_eq!(
            err(vec![vec![1, 0]], Dimension::new(2, 2)),
            BoardDefect::RowCountMismatch { expected: 2, found: 1 }
        );
        assert_eq!(
            err(vec![vec![1, 2], vec![0]], Dimension::new(2, 2)),
            BoardDefect::RaggedRow { row: 1, expected: 2, found: 1 }
        );
        assert_eq!(
            err(vec![vec![1, 2], vec![4, 0]], Dimension::new(2, 2)),
            BoardDefect::ValueOutOfRange { value: 4, max: 3 }
        );
        assert_eq!(
            err(vec![vec![1, 1], vec![2, 3]], Dimension::new(2, 2)),
            BoardDefect::DuplicateValue { value: 1 }
        );
    }

    #[test]
    fn oversized_dimensions_are_rejected_before_allocating() {
        let too_large = |dimension: Dimension| BoardDefect::TooLarge {
            rows: dimension.rows,
            cols: dimension.cols,
        };

        let overflowing = Dimension::new(usize::MAX, 2);
        assert_eq!(overflowing.checked_len(), None);
        assert_eq!(overflowing.len(), usize::MAX);
        assert_eq!(
            Puzzle::new(vec![], overflowing).unwrap_err(),
            PuzzleError::InvalidBoard { defect: too_large(overflowing) }
        );

        let beyond_u32 = Dimension::new(1 << 20, 1 << 20);
        assert_eq!(
            Puzzle::goal(beyond_u32).unwrap_err(),
            PuzzleError::InvalidBoard { defect: too_large(beyond_u32) }
        );
        assert_eq!(
            Puzzle::goal(Dimension::new(0, usize::MAX)).unwrap_err(),
            PuzzleError::InvalidBoard { defect: BoardDefect::EmptyDimension }
        );
    }

    #[test]
    fn shuffled_strips_keep_tiles_in_order() {
        let mut rng = StdRng::seed_from_u64(1);

        for dimension in [Dimension::new(1, 20), Dimension::new(20, 1), Dimension::new(1, 1)] {
            let mut strip = Puzzle::goal(dimension).unwrap();
            for _ in 0..10 {
                strip.shuffle(&mut rng);
                assert!(strip.is_solvable());

                let flattened = strip.flatten();
                let tiles: Vec<u32> = flattened.iter().copied().filter(|&v| v != 0).collect();
                assert_eq!(tiles, (1..dimension.len() as u32).collect::<Vec<_>>());
                assert_eq!(flattened.iter().filter(|&&v| v == 0).count(), 1);
                assert!(strip.path().is_empty());
            }
        }
    }

    #[test]
    fn equality_ignores_the_cost_cache() {
        let hash = |puzzle: &Puzzle| {
            let mut hasher = DefaultHasher::new();
            puzzle.hash(&mut hasher);
            hasher.finish()
        };

        let plain = near_goal();
        let mut evaluated = near_goal();
        evaluated.evaluate(HeuristicMode::LinearConflict);
        assert_eq!(plain, evaluated);
        assert_eq!(hash(&plain), hash(&evaluated));

        let children = plain.successors().unwrap();
        assert!(children.iter().all(|child| *child != plain));

        // Same board reached by a different history is a different state.
        let mut moved_back = children[0].clone();
        moved_back.apply_move(5).unwrap();
        assert_eq!(moved_back.board(), plain.board());
        assert_ne!(moved_back, plain);
    }

    #[test]
    fn legal_moves_are_blank_relative() {
        let puzzle = near_goal();
        assert_eq!(puzzle.legal_move_for(5), Some(Move::Up));
        assert_eq!(puzzle.legal_move_for(7), Some(Move::Left));
        assert_eq!(puzzle.legal_move_for(8), Some(Move::Right));
        assert_eq!(puzzle.legal_move_for(1), None);
        assert_eq!(puzzle.legal_move_for(0), None);
        assert_eq!(puzzle.legal_move_for(42), None);
    }

    #[test]
    fn no_wraparound_at_the_border() {
        let puzzle = Puzzle::from_rows(vec![vec![1, 2, 3], vec![0, 4, 5]]).unwrap();
        // 3 directly precedes the blank in row-major order but is on the row above.
        assert_eq!(puzzle.legal_move_for(3), None);
        assert_eq!(puzzle.legal_tiles().unwrap(), vec![1, 4]);
    }

    #[test]
    fn apply_move_swaps_blank_and_tile() {
        let mut puzzle = near_goal();
        assert_eq!(puzzle.apply_move(5).unwrap(), Some(Move::Up));
        assert_eq!(puzzle.board(), &[vec![1, 2, 3], vec![4, 0, 6], vec![7, 5, 8]]);
        assert!(puzzle.path().is_empty());

        assert_eq!(puzzle.apply_move(8).unwrap(), None);
        assert_eq!(puzzle.board(), &[vec![1, 2, 3], vec![4, 0, 6], vec![7, 5, 8]]);

        assert_eq!(puzzle.apply_move(5).unwrap(), Some(Move::Up.opposite()));
        assert_eq!(puzzle.board(), near_goal().board());
    }

    #[test]
    fn successors_cover_every_neighbour_in_row_major_order() {
        let puzzle = near_goal();
        let children = puzzle.successors().unwrap();

        let moved: Vec<u32> = children.iter().filter_map(Puzzle::last_move).collect();
        assert_eq!(moved, vec![5, 7, 8]);
        for child in &children {
            assert_eq!(child.path().len(), 1);
            assert_eq!(child.path(), &[child.last_move().unwrap()]);
        }
        assert_eq!(puzzle.board(), near_goal().board());
    }

    #[test]
    fn successors_skip_the_reversing_move() {
        let child = near_goal()
            .successors()
            .unwrap()
            .into_iter()
            .find(|c| c.last_move() == Some(8))
            .unwrap();

        let grandchildren = child.successors().unwrap();
        assert!(grandchildren.iter().all(|g| g.last_move() != Some(8)));
        assert!(grandchildren.iter().all(|g| g.path()[0] == 8 && g.path().len() == 2));
        assert_eq!(grandchildren.len(), 1);
    }

    #[test]
    fn strip_with_single_neighbour_has_no_successors() {
        let start = Puzzle::from_rows(vec![vec![1, 0]]).unwrap();
        let children = start.successors().unwrap();
        assert_eq!(children.len(), 1);
        assert!(children[0].successors().unwrap().is_empty());
    }

    #[test]
    fn evaluate_caches_until_the_board_moves() {
        let mut puzzle = near_goal();
        assert_eq!(puzzle.cached_cost(), None);
        assert_eq!(puzzle.evaluate(HeuristicMode::Manhattan), 1);
        assert_eq!(puzzle.cached_cost(), Some(1));

        let children = puzzle.successors().unwrap();
        assert!(children.iter().all(|c| c.cached_cost().is_none()));

        puzzle.apply_move(8).unwrap();
        assert_eq!(puzzle.cached_cost(), None);
    }

    #[test]
    fn display_pads_to_widest_value() {
        let puzzle = Puzzle::goal(Dimension::new(2, 2)).unwrap();
        assert_eq!(puzzle.to_string(), "1 2 \n3 0 \n");

        let puzzle = Puzzle::goal(Dimension::square(4)).unwrap();
        assert!(puzzle.to_string().starts_with(" 1  2  3  4 \n"));
    }
}
