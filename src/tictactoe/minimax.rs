//! Depth-bounded negamax search with alpha-beta pruning.

use log::debug;

use super::board::{winning_lines, Cell, GameStatus, GridMove, GridState, Player};
use crate::error::{Error, Result};

/// Score of a won position, reduced by the ply at which the win happens so
/// faster wins (and slower losses) are preferred.
pub const WIN_SCORE: i32 = 1000;

/// Plies searched when the caller does not set a depth limit.
pub const DEFAULT_DEPTH_LIMIT: u32 = 4;

const INFINITY: i32 = WIN_SCORE * 2;

/// The move chosen by [`minimax_move`] and what the search saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinimaxDecision {
    pub mv: GridMove,
    /// Negamax score for the side to move
    pub score: i32,
    /// Number of positions visited
    pub nodes: u64,
}

/// Picks the best move for the side to move, searching `depth_limit` plies.
///
/// Moves are tried in row-major order and the first one reaching the best
/// score wins ties, so the result is deterministic. Positions at the depth
/// horizon are scored with [`evaluate`].
///
/// # Errors
/// [`Error::NoMovesAvailable`] if the game is already decided or the board is
/// full. [`Error::InvalidConfiguration`] if `depth_limit` is zero.
///
/// # Examples
/// ```
/// use puzzle_engine::tictactoe::{minimax_move, GridState};
///
/// let state = GridState::new();
/// let decision = minimax_move(&state, 2).unwrap();
/// assert!(state.apply(decision.mv).is_ok());
/// ```
pub fn minimax_move(state: &GridState, depth_limit: u32) -> Result<MinimaxDecision> {
    if depth_limit == 0 {
        return Err(Error::config("depth limit must be at least 1"));
    }
    let moves = state.legal_moves();
    if moves.is_empty() {
        return Err(Error::NoMovesAvailable);
    }

    let mut nodes = 0;
    let mut alpha = -INFINITY;
    let mut best: Option<(GridMove, i32)> = None;

    for mv in moves {
        let child = state.play_unchecked(mv);
        let score = -negamax(&child, depth_limit - 1, 1, -INFINITY, -alpha, &mut nodes);
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((mv, score));
        }
        alpha = alpha.max(score);
    }

    let (mv, score) = best.ok_or(Error::NoMovesAvailable)?;
    debug!(
        "minimax chose {:?} with score {} after {} nodes (depth {})",
        mv, score, nodes, depth_limit
    );
    Ok(MinimaxDecision { mv, score, nodes })
}

fn negamax(
    state: &GridState,
    depth: u32,
    ply: i32,
    mut alpha: i32,
    beta: i32,
    nodes: &mut u64,
) -> i32 {
    *nodes += 1;
    match state.status() {
        GameStatus::Win(winner) if winner == state.to_move() => return WIN_SCORE - ply,
        GameStatus::Win(_) => return -(WIN_SCORE - ply),
        GameStatus::Draw => return 0,
        GameStatus::InProgress => {}
    }
    if depth == 0 {
        return evaluate(state, state.to_move());
    }

    let mut best = -INFINITY;
    for mv in state.empty_squares() {
        let child = state.play_unchecked(mv);
        let score = -negamax(&child, depth - 1, ply + 1, -beta, -alpha, nodes);
        best = best.max(score);
        alpha = alpha.max(score);
        if alpha >= beta {
            break;
        }
    }
    best
}

/// Static evaluation of a non-terminal position from `player`'s point of view.
///
/// Each 4-cell window holding three of a player's marks and one empty square
/// is worth 5, two marks and two empties is worth 2. The opponent's windows
/// count against. The result never reaches the magnitude of a win score.
pub fn evaluate(state: &GridState, player: Player) -> i32 {
    let own = player.to_cell();
    let theirs = player.opponent().to_cell();
    let mut score = 0;
    for line in winning_lines() {
        let mut mine = 0;
        let mut other = 0;
        let mut empty = 0;
        for &(r, c) in line {
            match state.cell(r, c) {
                cell if cell == own => mine += 1,
                cell if cell == theirs => other += 1,
                Cell::Empty => empty += 1,
                _ => {}
            }
        }
        score += window_score(mine, empty) - window_score(other, empty);
    }
    score
}

fn window_score(marks: u32, empty: u32) -> i32 {
    match (marks, empty) {
        (3, 1) => 5,
        (2, 2) => 2,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::grid_from_str_array;
    use rand::rngs::SmallRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    /// Exhaustive game value (+1 win, 0 draw, -1 loss) for the side to move.
    fn game_value(state: &GridState) -> i32 {
        match state.status() {
            GameStatus::Win(winner) if winner == state.to_move() => 1,
            GameStatus::Win(_) => -1,
            GameStatus::Draw => 0,
            GameStatus::InProgress => state
                .empty_squares()
                .into_iter()
                .map(|mv| -game_value(&state.play_unchecked(mv)))
                .max()
                .unwrap_or(0),
        }
    }

    /// Plays random moves from the empty board until `empties` squares remain,
    /// restarting whenever the game ends early.
    fn random_position(seed: u64, empties: usize) -> GridState {
        let mut rng = SmallRng::seed_from_u64(seed);
        loop {
            let mut state = GridState::new();
            while state.empty_count() > empties && !state.status().is_terminal() {
                let moves = state.legal_moves();
                let mv = *moves.choose(&mut rng).unwrap();
                state = state.apply(mv).unwrap();
            }
            if !state.status().is_terminal() {
                return state;
            }
        }
    }

    #[test]
    fn test_takes_immediate_win() {
        let state = grid_from_str_array(&["XXX..", "OO...", "O....", ".....", "....."]).unwrap();
        let decision = minimax_move(&state, DEFAULT_DEPTH_LIMIT).unwrap();
        assert_eq!(decision.mv, (0, 3));
        assert_eq!(decision.score, WIN_SCORE - 1);
    }

    #[test]
    fn test_blocks_opponent_threat() {
        let state = grid_from_str_array(&["XXX..", "O....", "O....", ".....", "....."]).unwrap();
        assert_eq!(state.to_move(), Player::O);
        let decision = minimax_move(&state, DEFAULT_DEPTH_LIMIT).unwrap();
        assert_eq!(decision.mv, (0, 3));
    }

    #[test]
    fn test_no_moves_on_finished_game() {
        let state = grid_from_str_array(&["XXXX.", "OOO..", ".....", ".....", "....."]).unwrap();
        assert!(matches!(minimax_move(&state, 3), Err(Error::NoMovesAvailable)));
    }

    #[test]
    fn test_zero_depth_rejected() {
        assert!(matches!(
            minimax_move(&GridState::new(), 0),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_deterministic_choice() {
        let state = GridState::new().apply((2, 2)).unwrap();
        let first = minimax_move(&state, 3).unwrap();
        let second = minimax_move(&state, 3).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_full_depth_choice_is_optimal() {
        for seed in 0..12 {
            let state = random_position(seed, 7);
            let decision = minimax_move(&state, 25).unwrap();
            let chosen = -game_value(&state.apply(decision.mv).unwrap());
            for mv in state.legal_moves() {
                let alternative = -game_value(&state.apply(mv).unwrap());
                assert!(
                    chosen >= alternative,
                    "seed {}: chose {:?} (value {}) but {:?} has value {}\n{}",
                    seed,
                    decision.mv,
                    chosen,
                    mv,
                    alternative,
                    state
                );
            }
        }
    }

    #[test]
    fn test_evaluate_is_antisymmetric() {
        let state = grid_from_str_array(&["XX...", ".O...", "..X..", ".O...", "....."]).unwrap();
        assert_eq!(evaluate(&state, Player::X), -evaluate(&state, Player::O));
    }
}
