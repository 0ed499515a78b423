//! Knight's Tour on an 8×8 board.

use std::fmt;

use clap::ValueEnum;
use log::{debug, trace};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{Budget, Deadline, SolverConfig};
use crate::error::{Error, Result};
use crate::strategy::{Puzzle, Strategy};

pub const BOARD_SIZE: usize = 8;
pub const CELLS: usize = BOARD_SIZE * BOARD_SIZE;

/// Search nodes the backtracking solver may expand by default.
pub const DEFAULT_NODE_BUDGET: u64 = 5_000_000;

/// `(row, col)`, 0-based.
pub type Square = (usize, usize);

/// Knight offsets in the order candidates are enumerated.
pub const KNIGHT_MOVES: [(isize, isize); 8] = [
    (2, 1),
    (1, 2),
    (-1, 2),
    (-2, 1),
    (-2, -1),
    (-1, -2),
    (1, -2),
    (2, -1),
];

fn bit(square: Square) -> u64 {
    1 << (square.0 * BOARD_SIZE + square.1)
}

fn on_board(square: Square) -> bool {
    square.0 < BOARD_SIZE && square.1 < BOARD_SIZE
}

/// Squares a knight on `from` can reach, in [`KNIGHT_MOVES`] order.
fn targets(from: Square) -> impl Iterator<Item = Square> {
    KNIGHT_MOVES.iter().filter_map(move |&(dr, dc)| {
        let row = from.0.checked_add_signed(dr)?;
        let col = from.1.checked_add_signed(dc)?;
        on_board((row, col)).then_some((row, col))
    })
}

fn unvisited_targets(visited: u64, from: Square) -> impl Iterator<Item = Square> {
    targets(from).filter(move |&sq| visited & bit(sq) == 0)
}

/// Number of unvisited squares reachable from `square`.
fn onward_degree(visited: u64, square: Square) -> usize {
    unvisited_targets(visited, square).count()
}

pub fn is_knight_move(from: Square, to: Square) -> bool {
    let dr = from.0.abs_diff(to.0);
    let dc = from.1.abs_diff(to.1);
    (dr == 1 && dc == 2) || (dr == 2 && dc == 1)
}

/// Uniformly random starting square.
pub fn random_start<R: Rng>(rng: &mut R) -> Square {
    (rng.gen_range(0..BOARD_SIZE), rng.gen_range(0..BOARD_SIZE))
}

/// The knight's position plus every square visited so far.
///
/// Deserializing replays `path` from its first square, so a stored board is
/// accepted only if it could have been reached by legal moves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "KnightRecord")]
pub struct KnightBoard {
    visited: u64,
    path: Vec<Square>,
}

#[derive(Deserialize)]
struct KnightRecord {
    visited: u64,
    path: Vec<Square>,
}

impl TryFrom<KnightRecord> for KnightBoard {
    type Error = Error;

    fn try_from(record: KnightRecord) -> Result<Self> {
        let (&start, rest) = record
            .path
            .split_first()
            .ok_or_else(|| Error::board("a knight board needs a starting square"))?;
        let mut board = KnightBoard::new(start)?;
        for &square in rest {
            board = board.apply(square)?;
        }
        if board.visited != record.visited {
            return Err(Error::board(format!(
                "visited mask {:#x} does not match the path",
                record.visited
            )));
        }
        Ok(board)
    }
}

impl KnightBoard {
    pub fn new(start: Square) -> Result<Self> {
        if !on_board(start) {
            return Err(Error::board(format!("start {:?} is off the board", start)));
        }
        Ok(KnightBoard {
            visited: bit(start),
            path: vec![start],
        })
    }

    pub fn position(&self) -> Square {
        // A board always holds at least its start square.
        self.path[self.path.len() - 1]
    }

    pub fn start(&self) -> Square {
        self.path[0]
    }

    pub fn path(&self) -> &[Square] {
        &self.path
    }

    pub fn is_visited(&self, square: Square) -> bool {
        on_board(square) && self.visited & bit(square) != 0
    }

    pub fn visited_count(&self) -> usize {
        self.path.len()
    }

    pub fn is_complete(&self) -> bool {
        self.path.len() == CELLS
    }

    /// Unvisited squares one knight move away.
    pub fn legal_moves(&self) -> Vec<Square> {
        unvisited_targets(self.visited, self.position()).collect()
    }

    pub fn apply(&self, to: Square) -> Result<KnightBoard> {
        let from = self.position();
        if !on_board(to) {
            return Err(Error::illegal(format!("{:?} is off the board", to)));
        }
        if !is_knight_move(from, to) {
            return Err(Error::illegal(format!(
                "{:?} -> {:?} is not a knight move",
                from, to
            )));
        }
        if self.is_visited(to) {
            return Err(Error::illegal(format!("{:?} was already visited", to)));
        }
        let mut next = self.clone();
        next.visited |= bit(to);
        next.path.push(to);
        Ok(next)
    }
}

impl fmt::Display for KnightBoard {
    /// Move numbers, 1-based, with `.` for unvisited squares.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut order = [[0usize; BOARD_SIZE]; BOARD_SIZE];
        for (i, &(r, c)) in self.path.iter().enumerate() {
            order[r][c] = i + 1;
        }
        for (r, row) in order.iter().enumerate() {
            let cells: Vec<String> = row
                .iter()
                .map(|&n| if n == 0 { " .".to_string() } else { format!("{:2}", n) })
                .collect();
            write!(f, "{}", cells.join(" "))?;
            if r + 1 < BOARD_SIZE {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TourKind {
    Open,
    /// The last square is a knight move from the first
    Closed,
}

/// Checks that `path` is a full tour starting at `start`.
///
/// # Errors
/// [`Error::IllegalMove`] for a wrong start, an off-board square, a repeated
/// square or a non-knight step; [`Error::IncompleteTour`] if fewer than 64
/// squares are listed.
pub fn verify_tour(start: Square, path: &[Square]) -> Result<TourKind> {
    match path.first() {
        Some(&first) if first == start => {}
        Some(&first) => {
            return Err(Error::illegal(format!(
                "tour starts at {:?}, expected {:?}",
                first, start
            )))
        }
        None => return Err(Error::IncompleteTour { visited: 0 }),
    }
    let mut board = KnightBoard::new(start)?;
    for (i, &square) in path.iter().enumerate().skip(1) {
        board = board.apply(square).map_err(|err| match err {
            Error::IllegalMove { reason } => Error::illegal(format!("step {}: {}", i, reason)),
            other => other,
        })?;
    }
    if !board.is_complete() {
        return Err(Error::IncompleteTour {
            visited: board.visited_count(),
        });
    }
    if is_knight_move(board.position(), start) {
        Ok(TourKind::Closed)
    } else {
        Ok(TourKind::Open)
    }
}

enum Search {
    Found,
    Exhausted,
    OutOfBudget,
}

/// Depth-first search for a full tour continuing from `board`.
///
/// Candidates are tried in order of increasing onward degree, which makes a
/// tour from most squares turn up almost immediately; the budget bounds the
/// pathological cases.
///
/// # Errors
/// [`Error::NoTourFound`] when the budget runs out or no tour exists.
pub fn backtracking(board: &KnightBoard, budget: Budget) -> Result<Vec<Square>> {
    fn search(visited: &mut u64, path: &mut Vec<Square>, deadline: &mut Deadline) -> Search {
        if path.len() == CELLS {
            return Search::Found;
        }
        if !deadline.tick() {
            return Search::OutOfBudget;
        }
        let from = path[path.len() - 1];
        let mut candidates: Vec<(usize, Square)> = unvisited_targets(*visited, from)
            .map(|sq| (onward_degree(*visited | bit(sq), sq), sq))
            .collect();
        candidates.sort_by_key(|&(degree, _)| degree);
        for (_, square) in candidates {
            *visited |= bit(square);
            path.push(square);
            match search(visited, path, deadline) {
                Search::Exhausted => {}
                done => return done,
            }
            path.pop();
            *visited &= !bit(square);
        }
        Search::Exhausted
    }

    let mut visited = board.visited;
    let mut path = board.path.clone();
    let mut deadline = Deadline::start(budget);
    let outcome = search(&mut visited, &mut path, &mut deadline);
    debug!("knight backtracking: {} nodes", deadline.spent());
    match outcome {
        Search::Found => Ok(path),
        Search::Exhausted | Search::OutOfBudget => Err(Error::NoTourFound {
            nodes: deadline.spent(),
        }),
    }
}

/// Greedy walk that always picks the highest-scoring next square, scanning
/// candidates in [`KNIGHT_MOVES`] order and keeping the first on ties.
fn greedy_walk(board: &KnightBoard, score: impl Fn(u64, Square) -> f64) -> Result<Vec<Square>> {
    let mut visited = board.visited;
    let mut path = board.path.clone();
    while path.len() < CELLS {
        let from = path[path.len() - 1];
        let mut best: Option<(Square, f64)> = None;
        for square in unvisited_targets(visited, from) {
            let value = score(visited | bit(square), square);
            if best.map_or(true, |(_, b)| value > b) {
                best = Some((square, value));
            }
        }
        match best {
            Some((square, value)) => {
                trace!("step {} -> {:?} (score {:.2})", path.len(), square, value);
                visited |= bit(square);
                path.push(square);
            }
            None => {
                debug!("dead end at {:?} after {} squares", from, path.len());
                return Err(Error::IncompleteTour {
                    visited: path.len(),
                });
            }
        }
    }
    Ok(path)
}

/// Warnsdorff's rule: move to the square with the fewest onward moves.
///
/// # Errors
/// [`Error::IncompleteTour`] on a dead end.
pub fn warnsdorff(board: &KnightBoard) -> Result<Vec<Square>> {
    greedy_walk(board, |visited, square| -(onward_degree(visited, square) as f64))
}

const DEGREE_WEIGHT: f64 = 0.7;
const CENTER_WEIGHT: f64 = 0.3;
const EDGE_WEIGHT: f64 = 0.1;

/// Fixed-weight move score, higher is better:
///
/// `-0.7 * onward_moves - 0.3 * centre_distance² - 0.1 * edge_distance`
///
/// where `centre_distance` is measured from (3.5, 3.5) and `edge_distance`
/// counts squares to the nearest edge. `visited` must already include `square`.
pub fn ranker_score(visited: u64, square: Square) -> f64 {
    let center = (BOARD_SIZE as f64 - 1.0) / 2.0;
    let (r, c) = (square.0 as f64, square.1 as f64);
    let center_distance = (r - center).powi(2) + (c - center).powi(2);
    let edge_distance = square
        .0
        .min(square.1)
        .min(BOARD_SIZE - 1 - square.0)
        .min(BOARD_SIZE - 1 - square.1) as f64;
    -DEGREE_WEIGHT * onward_degree(visited, square) as f64
        - CENTER_WEIGHT * center_distance
        - EDGE_WEIGHT * edge_distance
}

/// Greedy tour driven by [`ranker_score`].
///
/// # Errors
/// [`Error::IncompleteTour`] on a dead end.
pub fn ranked_tour(board: &KnightBoard) -> Result<Vec<Square>> {
    greedy_walk(board, ranker_score)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum KnightAlgorithm {
    /// Degree-ordered depth-first search under a node or time budget
    Backtracking,
    /// Fewest-onward-moves greedy walk
    Warnsdorff,
    /// Fixed-feature move ranker
    #[value(alias = "neural-network")]
    Ranker,
}

impl Strategy for KnightAlgorithm {
    type State = KnightBoard;
    type Output = Vec<Square>;

    fn puzzle(&self) -> Puzzle {
        Puzzle::KnightsTour
    }

    fn name(&self) -> &'static str {
        match self {
            KnightAlgorithm::Backtracking => "backtracking",
            KnightAlgorithm::Warnsdorff => "warnsdorff",
            KnightAlgorithm::Ranker => "neural_network",
        }
    }

    fn solve(&self, board: &KnightBoard, config: &SolverConfig) -> Result<Vec<Square>> {
        config.validate()?;
        match self {
            KnightAlgorithm::Backtracking => backtracking(
                board,
                config.budget_or(Budget::Iterations(DEFAULT_NODE_BUDGET)),
            ),
            KnightAlgorithm::Warnsdorff => warnsdorff(board),
            KnightAlgorithm::Ranker => ranked_tour(board),
        }
    }
}
