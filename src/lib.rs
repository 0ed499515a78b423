//! # Puzzle Engine Library
//!
//! Board models and solving algorithms for five classic puzzles:
//!
//! - `tictactoe`: 5×5 Tic-Tac-Toe with four in a row, played by Minimax with
//!   alpha-beta pruning or by Monte Carlo Tree Search.
//! - `tsp`: the Traveling Salesman problem, solved by nearest neighbour,
//!   exact subset dynamic programming, or a genetic algorithm.
//! - `hanoi`: the Tower of Hanoi, solved recursively or iteratively, with
//!   verification of player-entered move lists.
//! - `queens`: Eight Queens by backtracking or a genetic algorithm, plus
//!   canonical strings for tracking recognized solutions.
//! - `knights`: Knight's Tour by backtracking, Warnsdorff's rule, or a
//!   fixed-weight move ranker.
//!
//! Every algorithm implements [`strategy::Strategy`]; `timing` wraps a call
//! with a wall-clock measurement and builds the [`timing::PerformanceRecord`]
//! a host can store. Solvers are pure functions of their input state and
//! [`config::SolverConfig`]; randomized ones are reproducible under a seed.
//!
//! It is used by three binaries:
//! - `puzzle_solver`: solves one puzzle instance from the command line.
//! - `algorithm_benchmark`: times every algorithm over seeded instances.
//! - `play_tictactoe`: interactive game against an engine strategy.
//!
//! Logging goes through the `log` facade; the binaries install `env_logger`.

pub mod config;
pub mod error;
pub mod hanoi;
pub mod knights;
pub mod queens;
pub mod strategy;
pub mod tictactoe;
pub mod timing;
pub mod tsp;
pub mod utils;

pub use error::{Error, Result};
