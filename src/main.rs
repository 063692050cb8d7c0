//! Demonstration driver: scrambles a board, checks it can be solved and runs
//! a bounded best-first search over its successors.
//!
//! Usage:
//!   n-puzzle [--rows 3] [--cols 3] [--heuristic manhattan] [--scramble 30]
//!            [--shuffle] [--seed N] [--max-expansions N]
//!
//! Set `RUST_LOG=debug` (or `trace`) to see what the core is doing.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::process::ExitCode;

use clap::Parser;
use crossterm::style::{style, Stylize};
use log::info;
use rand::{rngs::StdRng, SeedableRng};

use n_puzzle::{goal_position, Dimension, HeuristicMode, Puzzle, PuzzleError, SearchConfig};

#[derive(Parser)]
#[command(name = "n-puzzle")]
#[command(about = "Scramble a sliding-tile puzzle and search for a solution")]
#[command(version)]
struct Cli {
    /// Number of rows
    #[arg(long, default_value = "3")]
    rows: usize,

    /// Number of columns
    #[arg(long, default_value = "3")]
    cols: usize,

    /// Heuristic used to order the frontier
    #[arg(long, default_value = "manhattan")]
    heuristic: HeuristicMode,

    /// Random moves applied to the goal board
    #[arg(long, default_value = "30")]
    scramble: usize,

    /// Use a uniformly random solvable permutation instead of a random walk
    #[arg(long)]
    shuffle: bool,

    /// Seed for the random number generator
    #[arg(long)]
    seed: Option<u64>,

    /// Give up after expanding this many states
    #[arg(long, default_value = "2000000")]
    max_expansions: usize,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, PuzzleError> {
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut puzzle = Puzzle::goal(Dimension::new(cli.rows, cli.cols))?;
    if cli.shuffle {
        puzzle.shuffle(&mut rng);
    } else {
        puzzle.scramble(cli.scramble, &mut rng)?;
    }

    println!("Initial puzzle:\n{}", render(&puzzle));

    if !puzzle.is_solvable() {
        println!("No solution: the board cannot reach the goal layout");
        return Ok(ExitCode::FAILURE);
    }

    let config = SearchConfig::new(cli.heuristic);
    let Some(solved) = best_first(puzzle.clone(), &config, cli.max_expansions)? else {
        println!("No solution found within {} expansions", cli.max_expansions);
        return Ok(ExitCode::FAILURE);
    };

    println!(
        "Found solution with {} moves using {} heuristic",
        solved.path().len(),
        config.heuristic
    );

    for &tile in solved.path() {
        if let Some(movement) = puzzle.apply_move(tile)? {
            println!("{} {}\n{}", tile, movement.opposite(), render(&puzzle));
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Frontier entry ordered so the heap pops the lowest priority first, and
/// the earliest pushed among equal priorities.
struct Candidate {
    priority: usize,
    order: usize,
    state: Puzzle,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.order.cmp(&self.order))
    }
}

/// Expands states in order of moves so far plus heuristic cost.
fn best_first(
    start: Puzzle,
    config: &SearchConfig,
    max_expansions: usize,
) -> Result<Option<Puzzle>, PuzzleError> {
    let mut frontier = BinaryHeap::new();
    let mut visited: HashSet<Vec<Vec<u32>>> = HashSet::new();
    let mut pushed = 0;
    let mut expansions = 0;

    frontier.push(Candidate {
        priority: config.cost(&start),
        order: pushed,
        state: start,
    });

    while let Some(Candidate { state, .. }) = frontier.pop() {
        if state.is_goal_state() {
            info!("goal reached after {} expansions", expansions);
            return Ok(Some(state));
        }
        if !visited.insert(state.board().to_vec()) {
            continue;
        }

        expansions += 1;
        if expansions > max_expansions {
            info!("giving up with {} states on the frontier", frontier.len());
            return Ok(None);
        }

        for child in state.successors()? {
            if visited.contains(child.board()) {
                continue;
            }
            pushed += 1;
            frontier.push(Candidate {
                priority: child.path().len() + config.cost(&child),
                order: pushed,
                state: child,
            });
        }
    }

    Ok(None)
}

/// Board as text, with tiles on their goal cell in green.
fn render(puzzle: &Puzzle) -> String {
    let cols = puzzle.dimension().cols;
    let width = (puzzle.dimension().len() - 1).to_string().len();
    let mut out = String::new();

    for (row, cells) in puzzle.board().iter().enumerate() {
        for (col, &value) in cells.iter().enumerate() {
            let text = if value == 0 {
                format!("{:>width$}", "")
            } else {
                format!("{:>width$}", value)
            };
            let cell = if goal_position(value, cols) == Some((row, col)) {
                style(text).green()
            } else {
                style(text).yellow()
            };
            out.push_str(&format!("{} ", cell));
        }
        out.push('\n');
    }

    out
}
