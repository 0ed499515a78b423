//! Eight Queens: column-indexed board, canonical strings, and two solvers.
//!
//! A board holds at most one queen per column, so column conflicts cannot be
//! represented; only shared rows and diagonals count as attacks.

use std::collections::HashSet;
use std::fmt;

use clap::ValueEnum;
use log::{debug, trace};
use rand::seq::index::sample;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::error::{Error, Result};
use crate::strategy::{Puzzle, Strategy};

pub const BOARD_SIZE: usize = 8;

/// Number of queen pairs on a full board; fitness is this minus the attacks.
pub const MAX_PAIRS: u32 = 28;

pub const DEFAULT_POPULATION: usize = 100;
pub const DEFAULT_GENERATIONS: usize = 1000;
pub const DEFAULT_MUTATION_RATE: f64 = 0.1;
pub const ELITE_COUNT: usize = 10;
const TOURNAMENT_SIZE: usize = 3;

/// A queen placed in column `col`, row `row` (both 0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    pub col: usize,
    pub row: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RowsRecord")]
pub struct QueensBoard {
    rows: [Option<u8>; BOARD_SIZE],
}

#[derive(Deserialize)]
struct RowsRecord {
    rows: [Option<u8>; BOARD_SIZE],
}

impl TryFrom<RowsRecord> for QueensBoard {
    type Error = Error;

    fn try_from(record: RowsRecord) -> Result<Self> {
        QueensBoard::from_rows(record.rows)
    }
}

impl QueensBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from the row of each column.
    pub fn from_rows(rows: [Option<u8>; BOARD_SIZE]) -> Result<Self> {
        if let Some(row) = rows.iter().flatten().find(|&&r| r as usize >= BOARD_SIZE) {
            return Err(Error::board(format!("row {} is off the board", row)));
        }
        Ok(QueensBoard { rows })
    }

    /// Decodes a canonical string such as `"15863724"`.
    ///
    /// # Examples
    /// ```
    /// use puzzle_engine::queens::QueensBoard;
    ///
    /// let board = QueensBoard::from_canonical("15863724").unwrap();
    /// assert_eq!(board.row(1), Some(4));
    /// assert!(board.is_complete());
    /// assert_eq!(board.canonical().as_deref(), Some("15863724"));
    /// ```
    pub fn from_canonical(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.chars().count() != BOARD_SIZE {
            return Err(Error::parse(text, "expected one digit per column"));
        }
        let mut rows = [None; BOARD_SIZE];
        for (col, c) in text.chars().enumerate() {
            match c.to_digit(10) {
                Some(d) if (1..=BOARD_SIZE as u32).contains(&d) => rows[col] = Some(d as u8 - 1),
                _ => return Err(Error::parse(text, format!("'{}' is not a row between 1 and 8", c))),
            }
        }
        Ok(QueensBoard { rows })
    }

    /// 1-based row digit of each column, or `None` while a column is empty.
    pub fn canonical(&self) -> Option<String> {
        self.rows
            .iter()
            .map(|r| r.map(|r| char::from(b'1' + r)))
            .collect()
    }

    pub fn rows(&self) -> [Option<u8>; BOARD_SIZE] {
        self.rows
    }

    pub fn row(&self, col: usize) -> Option<usize> {
        self.rows.get(col).copied().flatten().map(usize::from)
    }

    pub fn queen_count(&self) -> usize {
        self.rows.iter().flatten().count()
    }

    pub fn attacking_pairs(&self) -> u32 {
        attacks(&self.rows)
    }

    /// Eight queens and no two attacking.
    pub fn is_complete(&self) -> bool {
        self.queen_count() == BOARD_SIZE && self.attacking_pairs() == 0
    }

    /// Every square in an empty column.
    pub fn legal_moves(&self) -> Vec<Placement> {
        let mut moves = Vec::new();
        for col in 0..BOARD_SIZE {
            if self.rows[col].is_none() {
                moves.extend((0..BOARD_SIZE).map(|row| Placement { col, row }));
            }
        }
        moves
    }

    pub fn apply(&self, placement: Placement) -> Result<QueensBoard> {
        let Placement { col, row } = placement;
        if col >= BOARD_SIZE || row >= BOARD_SIZE {
            return Err(Error::illegal(format!("({}, {}) is off the board", col, row)));
        }
        if let Some(existing) = self.rows[col] {
            return Err(Error::illegal(format!(
                "column {} already has a queen in row {}",
                col, existing
            )));
        }
        let mut next = *self;
        next.rows[col] = Some(row as u8);
        Ok(next)
    }
}

impl fmt::Display for QueensBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let c = if self.rows[col] == Some(row as u8) { 'Q' } else { '.' };
                write!(f, "{}", c)?;
            }
            if row + 1 < BOARD_SIZE {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

fn attacks(rows: &[Option<u8>; BOARD_SIZE]) -> u32 {
    let mut pairs = 0;
    for a in 0..BOARD_SIZE {
        let Some(ra) = rows[a] else { continue };
        for b in (a + 1)..BOARD_SIZE {
            let Some(rb) = rows[b] else { continue };
            if ra == rb || (ra as usize).abs_diff(rb as usize) == b - a {
                pairs += 1;
            }
        }
    }
    pairs
}

fn is_safe(rows: &[Option<u8>; BOARD_SIZE], col: usize, row: usize) -> bool {
    rows.iter().enumerate().all(|(c, r)| match r {
        Some(r) if c != col => {
            let r = *r as usize;
            r != row && r.abs_diff(row) != c.abs_diff(col)
        }
        _ => true,
    })
}

/// How a player's submitted board compares with the solutions already seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Submission {
    /// Fewer than eight queens
    Incomplete,
    Attacking { pairs: u32 },
    AlreadyRecognized,
    New { canonical: String },
}

/// Classifies `board` against the caller's set of recognized canonical strings.
/// The set is not modified.
pub fn classify_submission(board: &QueensBoard, seen: &HashSet<String>) -> Submission {
    let Some(canonical) = board.canonical() else {
        return Submission::Incomplete;
    };
    let pairs = board.attacking_pairs();
    if pairs > 0 {
        Submission::Attacking { pairs }
    } else if seen.contains(&canonical) {
        Submission::AlreadyRecognized
    } else {
        Submission::New { canonical }
    }
}

pub fn is_new_solution(board: &QueensBoard, seen: &HashSet<String>) -> bool {
    matches!(classify_submission(board, seen), Submission::New { .. })
}

/// Column-by-column backtracking from `board`, trying rows in ascending
/// order and keeping any queens already placed.
///
/// Returns solutions in discovery order, at most `limit` of them (all of
/// them when `None`).
///
/// # Errors
/// [`Error::NoSolutionFound`] if the preplaced queens admit no completion.
pub fn backtracking(board: &QueensBoard, limit: Option<usize>) -> Result<Vec<QueensBoard>> {
    fn place(
        rows: &mut [Option<u8>; BOARD_SIZE],
        col: usize,
        limit: usize,
        found: &mut Vec<QueensBoard>,
    ) {
        if found.len() >= limit {
            return;
        }
        if col == BOARD_SIZE {
            found.push(QueensBoard { rows: *rows });
            return;
        }
        if rows[col].is_some() {
            place(rows, col + 1, limit, found);
            return;
        }
        for row in 0..BOARD_SIZE {
            if is_safe(rows, col, row) {
                rows[col] = Some(row as u8);
                place(rows, col + 1, limit, found);
                rows[col] = None;
            }
        }
    }

    let mut found = Vec::new();
    if board.attacking_pairs() == 0 {
        let mut rows = board.rows;
        place(&mut rows, 0, limit.unwrap_or(usize::MAX), &mut found);
    }
    debug!("queens backtracking: {} solutions", found.len());
    if found.is_empty() {
        return Err(Error::NoSolutionFound {
            detail: "the placed queens cannot be completed".to_string(),
        });
    }
    Ok(found)
}

/// Tunables for [`genetic_algorithm`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneticParams {
    pub population_size: usize,
    pub generations: usize,
    pub mutation_rate: f64,
    pub elite_count: usize,
    /// Distinct solutions to collect before stopping
    pub solution_limit: usize,
}

impl Default for GeneticParams {
    fn default() -> Self {
        GeneticParams {
            population_size: DEFAULT_POPULATION,
            generations: DEFAULT_GENERATIONS,
            mutation_rate: DEFAULT_MUTATION_RATE,
            elite_count: ELITE_COUNT,
            solution_limit: 1,
        }
    }
}

type Chromosome = [u8; BOARD_SIZE];

/// Elites carried into the next generation. At least half of every
/// generation is bred, whatever `elite_count` asks for.
fn elite_slots(size: usize, elite_count: usize) -> usize {
    elite_count.min(size / 2)
}

fn fitness(chromosome: &Chromosome) -> u32 {
    MAX_PAIRS - attacks(&chromosome.map(Some))
}

/// Genetic search for complete boards extending `board`.
///
/// Chromosomes hold one row per column; columns that already carry a queen
/// are fixed. Each generation keeps the elite (at most half the population),
/// then fills up with one-point
/// crossover children of tournament winners, reset-mutating a free column
/// with probability `mutation_rate`. The run stops at the end of the first
/// generation that contains a zero-conflict chromosome, returning its distinct
/// solutions (up to `solution_limit`).
///
/// # Errors
/// [`Error::NoSolutionFound`] when the generation budget runs out.
pub fn genetic_algorithm<R: Rng>(
    board: &QueensBoard,
    params: &GeneticParams,
    rng: &mut R,
) -> Result<Vec<QueensBoard>> {
    let free: Vec<usize> = (0..BOARD_SIZE).filter(|&c| board.rows[c].is_none()).collect();
    let no_solution = |generations: usize| Error::NoSolutionFound {
        detail: format!("no conflict-free board after {} generations", generations),
    };
    if board.attacking_pairs() > 0 {
        return Err(no_solution(0));
    }
    if free.is_empty() {
        return Ok(vec![*board]);
    }

    let template: Chromosome = board.rows.map(|r| r.unwrap_or(0));
    let size = params.population_size.max(2);
    let mut population: Vec<Chromosome> = (0..size)
        .map(|_| {
            let mut chromosome = template;
            for &col in &free {
                chromosome[col] = rng.gen_range(0..BOARD_SIZE as u8);
            }
            chromosome
        })
        .collect();

    for generation in 0..params.generations {
        let scores: Vec<u32> = population.iter().map(fitness).collect();

        let mut found = Vec::new();
        let mut seen = HashSet::new();
        for (chromosome, &score) in population.iter().zip(&scores) {
            if score == MAX_PAIRS && seen.insert(*chromosome) {
                found.push(QueensBoard {
                    rows: chromosome.map(Some),
                });
                if found.len() >= params.solution_limit.max(1) {
                    break;
                }
            }
        }
        if !found.is_empty() {
            debug!(
                "queens genetic algorithm: {} solutions in generation {}",
                found.len(),
                generation
            );
            return Ok(found);
        }

        let mut ranked: Vec<usize> = (0..size).collect();
        ranked.sort_by(|&a, &b| scores[b].cmp(&scores[a]));
        let mut next: Vec<Chromosome> = ranked
            .iter()
            .take(elite_slots(size, params.elite_count))
            .map(|&i| population[i])
            .collect();
        trace!("generation {}: best fitness {}", generation, scores[ranked[0]]);

        while next.len() < size {
            let first = &population[tournament(&scores, rng)];
            let second = &population[tournament(&scores, rng)];
            let point = rng.gen_range(1..BOARD_SIZE);
            let mut child = *first;
            child[point..].copy_from_slice(&second[point..]);
            if rng.gen::<f64>() < params.mutation_rate {
                let col = free[rng.gen_range(0..free.len())];
                child[col] = rng.gen_range(0..BOARD_SIZE as u8);
            }
            next.push(child);
        }
        population = next;
    }

    Err(no_solution(params.generations))
}

fn tournament<R: Rng>(scores: &[u32], rng: &mut R) -> usize {
    let k = TOURNAMENT_SIZE.min(scores.len());
    sample(rng, scores.len(), k)
        .into_iter()
        .max_by_key(|&i| scores[i])
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum QueensAlgorithm {
    /// All solutions (or the first `solution_limit`) by depth-first search
    Backtracking,
    /// Stochastic search, one solution by default
    Genetic,
}

impl Strategy for QueensAlgorithm {
    type State = QueensBoard;
    type Output = Vec<QueensBoard>;

    fn puzzle(&self) -> Puzzle {
        Puzzle::EightQueens
    }

    fn name(&self) -> &'static str {
        match self {
            QueensAlgorithm::Backtracking => "backtracking",
            QueensAlgorithm::Genetic => "genetic",
        }
    }

    fn solve(&self, board: &QueensBoard, config: &SolverConfig) -> Result<Vec<QueensBoard>> {
        config.validate()?;
        match self {
            QueensAlgorithm::Backtracking => backtracking(board, config.solution_limit),
            QueensAlgorithm::Genetic => {
                let params = GeneticParams {
                    population_size: config.population_size_or(DEFAULT_POPULATION),
                    generations: config.generations_or(DEFAULT_GENERATIONS),
                    mutation_rate: config.mutation_rate_or(DEFAULT_MUTATION_RATE),
                    solution_limit: config.solution_limit.unwrap_or(1),
                    ..GeneticParams::default()
                };
                genetic_algorithm(board, &params, &mut config.rng())
            }
        }
    }
}
