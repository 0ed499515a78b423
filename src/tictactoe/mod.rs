//! 5×5 Tic-Tac-Toe (four in a row): board model and adversarial search.

mod board;
mod mcts;
mod minimax;

pub use board::{winning_lines, Cell, GameStatus, GridMove, GridState, Player, GRID_SIZE, WIN_LENGTH};
pub use mcts::{mcts_move, MctsDecision, DEFAULT_ITERATIONS, EXPLORATION};
pub use minimax::{evaluate, minimax_move, MinimaxDecision, DEFAULT_DEPTH_LIMIT, WIN_SCORE};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::config::{Budget, SolverConfig};
use crate::error::Result;
use crate::strategy::{Puzzle, Strategy};

/// Algorithms that pick the next Tic-Tac-Toe move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TicTacToeAlgorithm {
    /// Negamax with alpha-beta pruning, bounded by `depth_limit`
    Minimax,
    /// Monte Carlo Tree Search, bounded by `budget`
    Mcts,
}

impl Strategy for TicTacToeAlgorithm {
    type State = GridState;
    type Output = GridMove;

    fn puzzle(&self) -> Puzzle {
        Puzzle::TicTacToe
    }

    fn name(&self) -> &'static str {
        match self {
            TicTacToeAlgorithm::Minimax => "minimax",
            TicTacToeAlgorithm::Mcts => "mcts",
        }
    }

    fn solve(&self, state: &GridState, config: &SolverConfig) -> Result<GridMove> {
        config.validate()?;
        match self {
            TicTacToeAlgorithm::Minimax => {
                minimax_move(state, config.depth_limit_or(DEFAULT_DEPTH_LIMIT)).map(|d| d.mv)
            }
            TicTacToeAlgorithm::Mcts => {
                let budget = config.budget_or(Budget::Iterations(DEFAULT_ITERATIONS));
                mcts_move(state, budget, &mut config.rng()).map(|d| d.mv)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_both_algorithms_play_a_full_game() {
        let config = SolverConfig::new()
            .with_seed(5)
            .with_depth_limit(2)
            .with_budget(Budget::Iterations(200));
        let mut state = GridState::new();
        let mut turn = 0;
        while !state.status().is_terminal() {
            let algorithm = if turn % 2 == 0 {
                TicTacToeAlgorithm::Minimax
            } else {
                TicTacToeAlgorithm::Mcts
            };
            let mv = algorithm.solve(&state, &config).unwrap();
            state = state.apply(mv).unwrap();
            turn += 1;
        }
        assert!(turn <= 25);
        assert!(matches!(
            TicTacToeAlgorithm::Minimax.solve(&state, &config),
            Err(Error::NoMovesAvailable)
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SolverConfig::new().with_budget(Budget::Iterations(0));
        assert!(matches!(
            TicTacToeAlgorithm::Mcts.solve(&GridState::new(), &config),
            Err(Error::InvalidConfiguration { .. })
        ));
    }
}
