//! Tower of Hanoi: peg state, the two classic solvers, and move-list checking.

use std::fmt;

use clap::ValueEnum;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::error::{Error, Result};
use crate::strategy::{Puzzle, Strategy};

/// Largest disk count the solvers accept (2²⁰ − 1 moves).
pub const MAX_DISKS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Peg {
    A,
    B,
    C,
}

impl Peg {
    pub const ALL: [Peg; 3] = [Peg::A, Peg::B, Peg::C];

    fn index(self) -> usize {
        match self {
            Peg::A => 0,
            Peg::B => 1,
            Peg::C => 2,
        }
    }

    /// Parses a peg letter, case-insensitively.
    pub fn from_char(c: char) -> Option<Peg> {
        match c.to_ascii_uppercase() {
            'A' => Some(Peg::A),
            'B' => Some(Peg::B),
            'C' => Some(Peg::C),
            _ => None,
        }
    }

    /// The peg that is neither `a` nor `b`.
    pub fn spare(a: Peg, b: Peg) -> Peg {
        Peg::ALL
            .into_iter()
            .find(|&p| p != a && p != b)
            .unwrap_or(Peg::B)
    }
}

impl fmt::Display for Peg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Peg::A => 'A',
            Peg::B => 'B',
            Peg::C => 'C',
        };
        write!(f, "{}", c)
    }
}

/// Moves the top disk of `from` onto `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HanoiMove {
    pub from: Peg,
    pub to: Peg,
}

impl HanoiMove {
    pub fn new(from: Peg, to: Peg) -> Self {
        HanoiMove { from, to }
    }
}

impl fmt::Display for HanoiMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.from, self.to)
    }
}

/// Three pegs of disks, each listed bottom to top. Disk sizes are `1..=n`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PegsRecord")]
pub struct HanoiState {
    pegs: [Vec<usize>; 3],
}

#[derive(Deserialize)]
struct PegsRecord {
    pegs: [Vec<usize>; 3],
}

impl TryFrom<PegsRecord> for HanoiState {
    type Error = Error;

    fn try_from(record: PegsRecord) -> Result<Self> {
        HanoiState::from_pegs(record.pegs)
    }
}

impl HanoiState {
    /// All `disks` disks stacked on `source`.
    pub fn new(disks: usize, source: Peg) -> Result<Self> {
        check_disk_count(disks)?;
        let mut pegs: [Vec<usize>; 3] = Default::default();
        pegs[source.index()] = (1..=disks).rev().collect();
        Ok(HanoiState { pegs })
    }

    /// Builds a state from explicit stacks (bottom to top).
    ///
    /// # Errors
    /// [`Error::InvalidBoard`] if a stack is not strictly decreasing or the
    /// disks are not exactly `1..=n`.
    pub fn from_pegs(pegs: [Vec<usize>; 3]) -> Result<Self> {
        let total: usize = pegs.iter().map(Vec::len).sum();
        check_disk_count(total)?;
        let mut seen = vec![false; total + 1];
        for (peg, stack) in Peg::ALL.iter().zip(pegs.iter()) {
            if stack.windows(2).any(|w| w[0] <= w[1]) {
                return Err(Error::board(format!("peg {} is not sorted largest to smallest", peg)));
            }
            for &disk in stack {
                if disk == 0 || disk > total || seen[disk] {
                    return Err(Error::board(format!("unexpected disk {}", disk)));
                }
                seen[disk] = true;
            }
        }
        Ok(HanoiState { pegs })
    }

    pub fn disks(&self) -> usize {
        self.pegs.iter().map(Vec::len).sum()
    }

    /// Disks on `peg`, bottom to top.
    pub fn peg(&self, peg: Peg) -> &[usize] {
        &self.pegs[peg.index()]
    }

    pub fn top(&self, peg: Peg) -> Option<usize> {
        self.pegs[peg.index()].last().copied()
    }

    pub fn is_legal(&self, mv: HanoiMove) -> bool {
        match (self.top(mv.from), self.top(mv.to)) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(moving), Some(below)) => below > moving,
        }
    }

    pub fn legal_moves(&self) -> Vec<HanoiMove> {
        let mut moves = Vec::new();
        for from in Peg::ALL {
            for to in Peg::ALL {
                let mv = HanoiMove::new(from, to);
                if from != to && self.is_legal(mv) {
                    moves.push(mv);
                }
            }
        }
        moves
    }

    pub fn apply(&self, mv: HanoiMove) -> Result<HanoiState> {
        let mut next = self.clone();
        next.play(mv)?;
        Ok(next)
    }

    /// In-place variant of [`apply`](Self::apply) used by the solvers.
    pub(crate) fn play(&mut self, mv: HanoiMove) -> Result<()> {
        if mv.from == mv.to {
            return Err(Error::illegal(format!("{} moves a disk onto its own peg", mv)));
        }
        if !self.is_legal(mv) {
            let reason = match (self.top(mv.from), self.top(mv.to)) {
                (None, _) => format!("{}: peg {} is empty", mv, mv.from),
                (Some(moving), Some(below)) => {
                    format!("{}: disk {} cannot go on smaller disk {}", mv, moving, below)
                }
                _ => format!("{} is not legal", mv),
            };
            return Err(Error::illegal(reason));
        }
        if let Some(disk) = self.pegs[mv.from.index()].pop() {
            self.pegs[mv.to.index()].push(disk);
        }
        Ok(())
    }

    /// True when every disk sits on `peg`.
    pub fn is_solved(&self, peg: Peg) -> bool {
        self.pegs[peg.index()].len() == self.disks()
    }
}

fn check_disk_count(disks: usize) -> Result<()> {
    if disks < 1 || disks > MAX_DISKS {
        return Err(Error::InvalidDiskCount {
            disks,
            max: MAX_DISKS,
        });
    }
    Ok(())
}

/// A transfer task: move `disks` disks from `source` to `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HanoiProblem {
    pub disks: usize,
    pub source: Peg,
    pub target: Peg,
}

impl HanoiProblem {
    pub fn new(disks: usize, source: Peg, target: Peg) -> Self {
        HanoiProblem {
            disks,
            source,
            target,
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_disk_count(self.disks)?;
        if self.source == self.target {
            return Err(Error::config(format!(
                "source and destination are both peg {}",
                self.source
            )));
        }
        Ok(())
    }

    pub fn spare(&self) -> Peg {
        Peg::spare(self.source, self.target)
    }

    pub fn initial_state(&self) -> Result<HanoiState> {
        HanoiState::new(self.disks, self.source)
    }

    /// 2ⁿ − 1
    ///
    /// # Errors
    /// [`Error::InvalidDiskCount`] outside `1..=MAX_DISKS`.
    pub fn optimal_moves(&self) -> Result<usize> {
        check_disk_count(self.disks)?;
        Ok((1usize << self.disks) - 1)
    }
}

/// Classic recursive solution: park `n − 1` disks on the spare peg, move the
/// largest disk, then bring the `n − 1` disks back on top of it.
///
/// # Examples
/// ```
/// use puzzle_engine::hanoi::{solve_recursive, HanoiProblem, Peg};
///
/// let moves = solve_recursive(&HanoiProblem::new(2, Peg::A, Peg::C)).unwrap();
/// let text: Vec<String> = moves.iter().map(|m| m.to_string()).collect();
/// assert_eq!(text, ["A->B", "A->C", "B->C"]);
/// ```
pub fn solve_recursive(problem: &HanoiProblem) -> Result<Vec<HanoiMove>> {
    fn transfer(n: usize, from: Peg, to: Peg, via: Peg, moves: &mut Vec<HanoiMove>) {
        if n == 0 {
            return;
        }
        transfer(n - 1, from, via, to, moves);
        moves.push(HanoiMove::new(from, to));
        transfer(n - 1, via, to, from, moves);
    }

    problem.validate()?;
    let mut moves = Vec::with_capacity(problem.optimal_moves()?);
    transfer(
        problem.disks,
        problem.source,
        problem.target,
        problem.spare(),
        &mut moves,
    );
    debug!("recursive hanoi: {} disks, {} moves", problem.disks, moves.len());
    Ok(moves)
}

/// Iterative solution by the parity rule.
///
/// The smallest disk moves on every odd step, cycling
/// source → target → spare for an odd disk count and source → spare → target
/// for an even one. Every even step makes the only legal move that leaves the
/// smallest disk alone. The sequence is identical to [`solve_recursive`].
pub fn solve_iterative(problem: &HanoiProblem) -> Result<Vec<HanoiMove>> {
    problem.validate()?;
    let mut state = problem.initial_state()?;
    let cycle = if problem.disks % 2 == 1 {
        [problem.source, problem.target, problem.spare()]
    } else {
        [problem.source, problem.spare(), problem.target]
    };
    let mut smallest = 0;
    let total = problem.optimal_moves()?;
    let mut moves = Vec::with_capacity(total);

    for step in 1..=total {
        let mv = if step % 2 == 1 {
            let from = cycle[smallest];
            smallest = (smallest + 1) % 3;
            HanoiMove::new(from, cycle[smallest])
        } else {
            let a = cycle[(smallest + 1) % 3];
            let b = cycle[(smallest + 2) % 3];
            if state.is_legal(HanoiMove::new(a, b)) {
                HanoiMove::new(a, b)
            } else {
                HanoiMove::new(b, a)
            }
        };
        state.play(mv)?;
        moves.push(mv);
    }

    debug!("iterative hanoi: {} disks, {} moves", problem.disks, moves.len());
    Ok(moves)
}

/// Result of replaying a move list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HanoiVerdict {
    /// Solved in exactly 2ⁿ − 1 moves
    Optimal,
    /// Solved, with more moves than necessary
    Solved { moves: usize, optimal: usize },
    /// Every move was legal but the tower is not on the destination peg
    Unsolved,
}

/// Replays `moves` from the problem's starting position.
///
/// # Errors
/// [`Error::IllegalMove`] naming the first offending move (1-based).
pub fn verify_solution(problem: &HanoiProblem, moves: &[HanoiMove]) -> Result<HanoiVerdict> {
    problem.validate()?;
    let mut state = problem.initial_state()?;
    for (i, &mv) in moves.iter().enumerate() {
        state.play(mv).map_err(|err| match err {
            Error::IllegalMove { reason } => Error::illegal(format!("move {}: {}", i + 1, reason)),
            other => other,
        })?;
    }
    if !state.is_solved(problem.target) {
        return Ok(HanoiVerdict::Unsolved);
    }
    let optimal = problem.optimal_moves()?;
    if moves.len() == optimal {
        Ok(HanoiVerdict::Optimal)
    } else {
        Ok(HanoiVerdict::Solved {
            moves: moves.len(),
            optimal,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum HanoiAlgorithm {
    Recursive,
    Iterative,
}

impl Strategy for HanoiAlgorithm {
    type State = HanoiProblem;
    type Output = Vec<HanoiMove>;

    fn puzzle(&self) -> Puzzle {
        Puzzle::TowerOfHanoi
    }

    fn name(&self) -> &'static str {
        match self {
            HanoiAlgorithm::Recursive => "recursive",
            HanoiAlgorithm::Iterative => "iterative",
        }
    }

    fn solve(&self, problem: &HanoiProblem, config: &SolverConfig) -> Result<Vec<HanoiMove>> {
        config.validate()?;
        match self {
            HanoiAlgorithm::Recursive => solve_recursive(problem),
            HanoiAlgorithm::Iterative => solve_iterative(problem),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(from: Peg, to: Peg) -> HanoiMove {
        HanoiMove::new(from, to)
    }

    #[test]
    fn test_three_disks_recursive_sequence() {
        use Peg::*;
        let moves = solve_recursive(&HanoiProblem::new(3, A, C)).unwrap();
        assert_eq!(
            moves,
            vec![mv(A, C), mv(A, B), mv(C, B), mv(A, C), mv(B, A), mv(B, C), mv(A, C)]
        );
    }

    #[test]
    fn test_iterative_matches_recursive() {
        for disks in 1..=10 {
            for source in Peg::ALL {
                for target in Peg::ALL {
                    if source == target {
                        continue;
                    }
                    let problem = HanoiProblem::new(disks, source, target);
                    assert_eq!(
                        solve_iterative(&problem).unwrap(),
                        solve_recursive(&problem).unwrap(),
                        "{:?}",
                        problem
                    );
                }
            }
        }
    }

    #[test]
    fn test_solutions_verify_as_optimal() {
        let problem = HanoiProblem::new(6, Peg::B, Peg::A);
        let moves = solve_iterative(&problem).unwrap();
        assert_eq!(moves.len(), 63);
        assert_eq!(verify_solution(&problem, &moves).unwrap(), HanoiVerdict::Optimal);
    }

    #[test]
    fn test_verify_detects_illegal_and_unsolved() {
        use Peg::*;
        let problem = HanoiProblem::new(2, A, C);
        let err = verify_solution(&problem, &[mv(A, C), mv(A, C)]).unwrap_err();
        match err {
            Error::IllegalMove { reason } => assert!(reason.starts_with("move 2")),
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(
            verify_solution(&problem, &[mv(A, B)]).unwrap(),
            HanoiVerdict::Unsolved
        );
        let detour = [mv(A, B), mv(B, C), mv(A, B), mv(C, A), mv(B, C), mv(A, C)];
        assert_eq!(
            verify_solution(&problem, &detour).unwrap(),
            HanoiVerdict::Solved { moves: 6, optimal: 3 }
        );
        let slow = [mv(A, B), mv(B, C), mv(A, B), mv(C, B)];
        assert_eq!(verify_solution(&problem, &slow).unwrap(), HanoiVerdict::Unsolved);
        let solved_slowly = [mv(A, B), mv(B, C), mv(C, B), mv(A, C), mv(B, C)];
        assert_eq!(
            verify_solution(&problem, &solved_slowly).unwrap(),
            HanoiVerdict::Solved { moves: 5, optimal: 3 }
        );
    }

    #[test]
    fn test_invalid_problems() {
        assert!(matches!(
            solve_recursive(&HanoiProblem::new(0, Peg::A, Peg::C)),
            Err(Error::InvalidDiskCount { disks: 0, .. })
        ));
        assert!(matches!(
            solve_iterative(&HanoiProblem::new(MAX_DISKS + 1, Peg::A, Peg::C)),
            Err(Error::InvalidDiskCount { .. })
        ));
        assert!(matches!(
            solve_recursive(&HanoiProblem::new(3, Peg::B, Peg::B)),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_state_moves() {
        let state = HanoiState::new(3, Peg::A).unwrap();
        assert_eq!(state.peg(Peg::A), &[3, 2, 1]);
        assert_eq!(state.legal_moves(), vec![mv(Peg::A, Peg::B), mv(Peg::A, Peg::C)]);
        let next = state.apply(mv(Peg::A, Peg::C)).unwrap();
        assert!(next.apply(mv(Peg::A, Peg::C)).is_err());
        assert!(next.apply(mv(Peg::B, Peg::A)).is_err());
        // The starting state is untouched.
        assert_eq!(state.top(Peg::A), Some(1));
    }

    #[test]
    fn test_from_pegs_validation() {
        assert!(HanoiState::from_pegs([vec![3, 1], vec![2], vec![]]).is_ok());
        assert!(HanoiState::from_pegs([vec![1, 3], vec![2], vec![]]).is_err());
        assert!(HanoiState::from_pegs([vec![3, 2], vec![2], vec![]]).is_err());
        assert!(HanoiState::from_pegs([vec![], vec![], vec![]]).is_err());
    }

    #[test]
    fn test_deserialize_validates_pegs() {
        let state = HanoiState::from_pegs([vec![3, 1], vec![2], vec![]]).unwrap();
        let json = serde_json::to_string(&state).unwrap();
        let back: HanoiState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);

        for bad in [
            r#"{"pegs":[[1,3],[2],[]]}"#,
            r#"{"pegs":[[1,3],[2,2],[]]}"#,
            r#"{"pegs":[[],[],[]]}"#,
            r#"{"pegs":[[0],[],[]]}"#,
        ] {
            assert!(serde_json::from_str::<HanoiState>(bad).is_err(), "{}", bad);
        }
    }

    #[test]
    fn test_optimal_moves_checks_disk_count() {
        assert_eq!(HanoiProblem::new(3, Peg::A, Peg::C).optimal_moves().unwrap(), 7);
        assert!(matches!(
            HanoiProblem::new(64, Peg::A, Peg::C).optimal_moves(),
            Err(Error::InvalidDiskCount { disks: 64, .. })
        ));
        assert!(HanoiProblem::new(0, Peg::A, Peg::C).optimal_moves().is_err());
    }
}
