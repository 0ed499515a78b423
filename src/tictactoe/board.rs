//! Board model for 5×5 Tic-Tac-Toe with four in a row to win.
//!
//! This module defines:
//! - `Cell` and `Player`: the contents of a square and the two sides.
//! - `GridState`: the board plus the side to move, with move generation,
//!   legality-checked move application, and win/draw detection.

use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Width and height of the board.
pub const GRID_SIZE: usize = 5;

/// Number of marks in a row needed to win.
pub const WIN_LENGTH: usize = 4;

/// A `(row, col)` square on the board.
pub type GridMove = (usize, usize);

/// The contents of one square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    X,
    O,
}

impl Cell {
    /// Converts the cell to its character representation.
    ///
    /// # Examples
    ///
    /// ```
    /// use puzzle_engine::tictactoe::Cell;
    /// assert_eq!(Cell::X.to_char(), 'X');
    /// assert_eq!(Cell::Empty.to_char(), '.');
    /// ```
    pub fn to_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::X => 'X',
            Cell::O => 'O',
        }
    }

    pub fn from_char(c: char) -> Option<Cell> {
        match c {
            '.' | '-' => Some(Cell::Empty),
            'X' | 'x' => Some(Cell::X),
            'O' | 'o' => Some(Cell::O),
            _ => None,
        }
    }
}

/// A player in the game. X always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    X,
    O,
}

impl Player {
    pub fn opponent(self) -> Player {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    pub fn to_cell(self) -> Cell {
        match self {
            Player::X => Cell::X,
            Player::O => Cell::O,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_cell().to_char())
    }
}

/// Whether a game is still running, and if not, how it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    InProgress,
    Win(Player),
    Draw,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        self != GameStatus::InProgress
    }
}

/// Every 4-cell window on the board, in row, column, diagonal and
/// anti-diagonal order. 28 windows for the 5×5 board.
pub fn winning_lines() -> &'static [[GridMove; WIN_LENGTH]] {
    static LINES: OnceLock<Vec<[GridMove; WIN_LENGTH]>> = OnceLock::new();
    LINES.get_or_init(|| {
        let directions: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];
        let mut lines = Vec::new();
        for (dr, dc) in directions {
            for r in 0..GRID_SIZE as isize {
                for c in 0..GRID_SIZE as isize {
                    let end_r = r + dr * (WIN_LENGTH as isize - 1);
                    let end_c = c + dc * (WIN_LENGTH as isize - 1);
                    if !(0..GRID_SIZE as isize).contains(&end_r)
                        || !(0..GRID_SIZE as isize).contains(&end_c)
                    {
                        continue;
                    }
                    let mut line = [(0, 0); WIN_LENGTH];
                    for (k, cell) in line.iter_mut().enumerate() {
                        *cell = (
                            (r + dr * k as isize) as usize,
                            (c + dc * k as isize) as usize,
                        );
                    }
                    lines.push(line);
                }
            }
        }
        lines
    })
}

/// The full game state: the 25 squares and whose turn it is.
///
/// `GridState` is `Copy`; applying a move returns a new value and leaves the
/// receiver untouched, so solvers can explore freely. Deserialized states are
/// checked like [`GridState::from_grid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "GridRecord")]
pub struct GridState {
    cells: [[Cell; GRID_SIZE]; GRID_SIZE],
    to_move: Player,
}

#[derive(Deserialize)]
struct GridRecord {
    cells: [[Cell; GRID_SIZE]; GRID_SIZE],
    to_move: Player,
}

impl TryFrom<GridRecord> for GridState {
    type Error = Error;

    fn try_from(record: GridRecord) -> Result<Self> {
        let state = GridState::from_grid(record.cells)?;
        if state.to_move != record.to_move {
            return Err(Error::board(format!(
                "{} cannot be to move with these piece counts",
                record.to_move
            )));
        }
        Ok(state)
    }
}

impl Default for GridState {
    fn default() -> Self {
        Self::new()
    }
}

impl GridState {
    /// Creates an empty board with X to move.
    pub fn new() -> Self {
        GridState {
            cells: [[Cell::Empty; GRID_SIZE]; GRID_SIZE],
            to_move: Player::X,
        }
    }

    /// Creates a state from a grid, deriving the side to move from the counts.
    ///
    /// # Errors
    /// Returns [`Error::InvalidBoard`] unless X has as many marks as O or one
    /// more (X moves first), or if the side to move already has four in a
    /// row (the game ended before the other side's last mark).
    pub fn from_grid(cells: [[Cell; GRID_SIZE]; GRID_SIZE]) -> Result<Self> {
        let count = |kind: Cell| cells.iter().flatten().filter(|c| **c == kind).count();
        let (x, o) = (count(Cell::X), count(Cell::O));
        let to_move = if x == o {
            Player::X
        } else if x == o + 1 {
            Player::O
        } else {
            return Err(Error::board(format!(
                "invalid piece counts X={} O={} (X moves first)",
                x, o
            )));
        };
        let state = GridState { cells, to_move };
        if state.has_line(to_move) {
            return Err(Error::board(format!(
                "{} has four in a row but {} moved afterwards",
                to_move,
                to_move.opponent()
            )));
        }
        Ok(state)
    }

    pub fn cell(&self, r: usize, c: usize) -> Cell {
        self.cells[r][c]
    }

    pub fn cells(&self) -> &[[Cell; GRID_SIZE]; GRID_SIZE] {
        &self.cells
    }

    pub fn to_move(&self) -> Player {
        self.to_move
    }

    pub fn empty_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|c| **c == Cell::Empty)
            .count()
    }

    /// Empty squares in row-major order, or nothing once the game is over.
    pub fn legal_moves(&self) -> Vec<GridMove> {
        if self.status().is_terminal() {
            return Vec::new();
        }
        self.empty_squares()
    }

    pub(crate) fn empty_squares(&self) -> Vec<GridMove> {
        let mut moves = Vec::with_capacity(GRID_SIZE * GRID_SIZE);
        for r in 0..GRID_SIZE {
            for c in 0..GRID_SIZE {
                if self.cells[r][c] == Cell::Empty {
                    moves.push((r, c));
                }
            }
        }
        moves
    }

    /// Places the side to move's mark at `mv` and passes the turn.
    ///
    /// # Errors
    /// [`Error::IllegalMove`] if the square is off the board or occupied, or
    /// if the game is already decided.
    pub fn apply(&self, mv: GridMove) -> Result<GridState> {
        let (r, c) = mv;
        if r >= GRID_SIZE || c >= GRID_SIZE {
            return Err(Error::illegal(format!("square ({}, {}) is off the board", r, c)));
        }
        if self.cells[r][c] != Cell::Empty {
            return Err(Error::illegal(format!("square ({}, {}) is already occupied", r, c)));
        }
        if self.status().is_terminal() {
            return Err(Error::illegal("the game is already over"));
        }
        Ok(self.play_unchecked(mv))
    }

    /// Applies a move already known to be legal. Used inside searches.
    pub(crate) fn play_unchecked(&self, (r, c): GridMove) -> GridState {
        let mut next = *self;
        next.cells[r][c] = self.to_move.to_cell();
        next.to_move = self.to_move.opponent();
        next
    }

    pub fn has_line(&self, player: Player) -> bool {
        let cell = player.to_cell();
        winning_lines()
            .iter()
            .any(|line| line.iter().all(|&(r, c)| self.cells[r][c] == cell))
    }

    /// Reports a win for either player, a draw on a full board, or
    /// `InProgress`.
    pub fn status(&self) -> GameStatus {
        // Only the player who just moved can have completed a line.
        let last = self.to_move.opponent();
        if self.has_line(last) {
            GameStatus::Win(last)
        } else if self.empty_count() == 0 {
            GameStatus::Draw
        } else {
            GameStatus::InProgress
        }
    }
}

impl fmt::Display for GridState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  ")?;
        for c in 0..GRID_SIZE {
            write!(f, "{} ", c)?;
        }
        for (r, row) in self.cells.iter().enumerate() {
            write!(f, "\n{} ", r)?;
            for cell in row {
                write!(f, "{} ", cell.to_char())?;
            }
        }
        Ok(())
    }
}
