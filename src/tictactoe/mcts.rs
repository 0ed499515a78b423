//! Monte Carlo Tree Search for the 5×5 board.
//!
//! The tree is stored as an arena (`Vec<Node>`) indexed by `usize`, and lives
//! only for the duration of a single [`mcts_move`] call.

use log::{debug, trace};
use rand::seq::SliceRandom;
use rand::Rng;

use super::board::{GameStatus, GridMove, GridState, Player};
use crate::config::{Budget, Deadline};
use crate::error::{Error, Result};

/// Iterations run when the caller does not set a budget.
pub const DEFAULT_ITERATIONS: u64 = 1000;

/// UCB1 exploration constant.
pub const EXPLORATION: f64 = 1.4;

#[derive(Debug)]
struct Node {
    state: GridState,
    parent: Option<usize>,
    mv: Option<GridMove>,
    /// The player whose move led to this node
    mover: Player,
    children: Vec<usize>,
    untried: Vec<GridMove>,
    visits: u32,
    /// Wins for `mover`; draws count half
    reward: f64,
}

impl Node {
    fn new(state: GridState, parent: Option<usize>, mv: Option<GridMove>) -> Self {
        Node {
            state,
            parent,
            mv,
            mover: state.to_move().opponent(),
            children: Vec::new(),
            untried: state.legal_moves(),
            visits: 0,
            reward: 0.0,
        }
    }

    fn ucb1(&self, parent_visits: u32) -> f64 {
        let visits = self.visits as f64;
        self.reward / visits + EXPLORATION * ((parent_visits as f64).ln() / visits).sqrt()
    }
}

/// Summary of a finished search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MctsDecision {
    pub mv: GridMove,
    /// Visits of the chosen child
    pub visits: u32,
    /// Mean reward of the chosen child for the side to move
    pub win_rate: f64,
    pub iterations: u64,
}

/// Chooses a move by Monte Carlo Tree Search.
///
/// Each iteration descends the tree by UCB1, expands one untried move,
/// plays a uniformly random game to the end and backs the result up the
/// path. The move returned is the root child with the most visits (the
/// earliest expanded child wins ties).
///
/// # Errors
/// [`Error::NoMovesAvailable`] if the game is already decided.
pub fn mcts_move<R: Rng>(state: &GridState, budget: Budget, rng: &mut R) -> Result<MctsDecision> {
    if state.legal_moves().is_empty() {
        return Err(Error::NoMovesAvailable);
    }

    let mut tree = vec![Node::new(*state, None, None)];
    let mut deadline = Deadline::start(budget);
    let mut iterations = 0;

    while deadline.tick() {
        iterations += 1;
        let leaf = select(&tree);
        let node = expand(&mut tree, leaf, rng);
        let winner = simulate(&tree[node].state, rng);
        backpropagate(&mut tree, node, winner);
    }

    let root = &tree[0];
    let mut best: Option<usize> = None;
    for &child in &root.children {
        if best.map_or(true, |b| tree[child].visits > tree[b].visits) {
            best = Some(child);
        }
    }
    // The budget allows at least one iteration, which expands a root child.
    let best = best.ok_or(Error::NoMovesAvailable)?;
    let chosen = &tree[best];
    let mv = chosen.mv.ok_or(Error::NoMovesAvailable)?;

    debug!(
        "mcts chose {:?} ({} visits, win rate {:.3}) after {} iterations, {} nodes",
        mv,
        chosen.visits,
        chosen.reward / chosen.visits.max(1) as f64,
        iterations,
        tree.len()
    );
    Ok(MctsDecision {
        mv,
        visits: chosen.visits,
        win_rate: chosen.reward / chosen.visits.max(1) as f64,
        iterations,
    })
}

/// Descends from the root while the current node is fully expanded and has
/// children, following the child with the highest UCB1 value.
fn select(tree: &[Node]) -> usize {
    let mut current = 0;
    loop {
        let node = &tree[current];
        if !node.untried.is_empty() || node.children.is_empty() {
            return current;
        }
        let parent_visits = node.visits;
        let mut best = node.children[0];
        let mut best_value = f64::NEG_INFINITY;
        for &child in &node.children {
            let value = tree[child].ucb1(parent_visits);
            if value > best_value {
                best_value = value;
                best = child;
            }
        }
        current = best;
    }
}

fn expand<R: Rng>(tree: &mut Vec<Node>, index: usize, rng: &mut R) -> usize {
    if tree[index].untried.is_empty() {
        // Terminal node
        return index;
    }
    let pick = rng.gen_range(0..tree[index].untried.len());
    let mv = tree[index].untried.swap_remove(pick);
    let state = tree[index].state.play_unchecked(mv);
    let child = tree.len();
    tree.push(Node::new(state, Some(index), Some(mv)));
    tree[index].children.push(child);
    trace!("expanded {:?} under node {}", mv, index);
    child
}

/// Plays uniformly random moves to the end and returns the winner, if any.
fn simulate<R: Rng>(state: &GridState, rng: &mut R) -> Option<Player> {
    let mut current = *state;
    loop {
        match current.status() {
            GameStatus::Win(winner) => return Some(winner),
            GameStatus::Draw => return None,
            GameStatus::InProgress => {}
        }
        let moves = current.empty_squares();
        match moves.choose(rng) {
            Some(&mv) => current = current.play_unchecked(mv),
            None => return None,
        }
    }
}

fn backpropagate(tree: &mut [Node], mut index: usize, winner: Option<Player>) {
    loop {
        let node = &mut tree[index];
        node.visits += 1;
        node.reward += match winner {
            Some(player) if player == node.mover => 1.0,
            Some(_) => 0.0,
            None => 0.5,
        };
        match node.parent {
            Some(parent) => index = parent,
            None => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::grid_from_str_array;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_finds_immediate_win() {
        let state = grid_from_str_array(&["XXX..", "OO...", "O....", ".....", "....."]).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        let decision = mcts_move(&state, Budget::Iterations(3000), &mut rng).unwrap();
        assert_eq!(decision.mv, (0, 3));
        assert_eq!(decision.iterations, 3000);
    }

    #[test]
    fn test_seeded_search_is_reproducible() {
        let state = GridState::new().apply((2, 2)).unwrap();
        let a = mcts_move(&state, Budget::Iterations(300), &mut SmallRng::seed_from_u64(9)).unwrap();
        let b = mcts_move(&state, Budget::Iterations(300), &mut SmallRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_returns_legal_move_with_single_iteration() {
        let state = GridState::new();
        let mut rng = SmallRng::seed_from_u64(0);
        let decision = mcts_move(&state, Budget::Iterations(1), &mut rng).unwrap();
        assert!(state.apply(decision.mv).is_ok());
        assert_eq!(decision.visits, 1);
    }

    #[test]
    fn test_time_budget() {
        let state = GridState::new();
        let mut rng = SmallRng::seed_from_u64(0);
        let decision = mcts_move(&state, Budget::Millis(20), &mut rng).unwrap();
        assert!(decision.iterations > 0);
    }

    #[test]
    fn test_finished_game_rejected() {
        let state = grid_from_str_array(&["XXXX.", "OOO..", ".....", ".....", "....."]).unwrap();
        let mut rng = SmallRng::seed_from_u64(0);
        assert!(matches!(
            mcts_move(&state, Budget::Iterations(10), &mut rng),
            Err(Error::NoMovesAvailable)
        ));
    }
}
