//! The common contract implemented by every algorithm.
//!
//! Each puzzle has one algorithm enum (`TicTacToeAlgorithm`, `TspAlgorithm`,
//! ...) that implements [`Strategy`]. The host picks a variant and calls
//! [`Strategy::solve`], usually through [`crate::timing::run_timed`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::error::Result;

/// The five puzzles the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Puzzle {
    TicTacToe,
    TravelingSalesman,
    TowerOfHanoi,
    EightQueens,
    KnightsTour,
}

impl Puzzle {
    /// Identifier used as the prefix of algorithm names in performance records.
    pub fn key(self) -> &'static str {
        match self {
            Puzzle::TicTacToe => "tic_tac_toe",
            Puzzle::TravelingSalesman => "tsp",
            Puzzle::TowerOfHanoi => "tower_of_hanoi",
            Puzzle::EightQueens => "eight_queens",
            Puzzle::KnightsTour => "knights_tour",
        }
    }
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A puzzle-solving algorithm.
///
/// Implementations are stateless: anything a search needs (tree, population,
/// visited set) lives only for the duration of one `solve` call.
pub trait Strategy {
    /// The puzzle state the algorithm reads.
    type State;
    /// A move, a full solution, or a verdict.
    type Output;

    fn puzzle(&self) -> Puzzle;

    /// Short algorithm name, e.g. `"minimax"`.
    fn name(&self) -> &'static str;

    fn solve(&self, state: &Self::State, config: &SolverConfig) -> Result<Self::Output>;

    /// Name under which timings are recorded, e.g. `"tic_tac_toe_minimax"`.
    fn record_name(&self) -> String {
        format!("{}_{}", self.puzzle().key(), self.name())
    }
}
