use crate::error::{Error, Result};
use crate::hanoi::{HanoiMove, Peg};
use crate::knights::{Square, BOARD_SIZE as KNIGHT_BOARD_SIZE};
use crate::tictactoe::{Cell, GridState, GRID_SIZE};

/// Parses an array of string slices into a Tic-Tac-Toe `GridState`.
///
/// Each string slice is one row, starting from row 0, and exactly
/// `GRID_SIZE` rows of `GRID_SIZE` characters are required.
///
/// Valid characters are:
/// - 'X': `Cell::X`
/// - 'O': `Cell::O`
/// - '.': `Cell::Empty`
///
/// # Arguments
/// * `s`: The rows of the board, top first.
///
/// # Returns
/// * `Ok(GridState)` with the side to move derived from the piece counts.
/// * `Err(Error::Parse)` for a wrong row count, a wrong row length or an
///   unrecognized character, and `Err(Error::InvalidBoard)` for impossible
///   piece counts.
///
/// # Examples
/// ```
/// use puzzle_engine::tictactoe::{Cell, Player};
/// use puzzle_engine::utils::grid_from_str_array;
///
/// let state = grid_from_str_array(&[
///     "X....",
///     ".O...",
///     ".....",
///     ".....",
///     "....X",
/// ]).unwrap();
/// assert_eq!(state.cell(1, 1), Cell::O);
/// assert_eq!(state.to_move(), Player::O);
///
/// assert!(grid_from_str_array(&["X...."]).is_err());
/// ```
pub fn grid_from_str_array(s: &[&str]) -> Result<GridState> {
    if s.len() != GRID_SIZE {
        return Err(Error::parse(
            s.join("/"),
            format!("expected {} rows, found {}", GRID_SIZE, s.len()),
        ));
    }

    let mut grid = [[Cell::Empty; GRID_SIZE]; GRID_SIZE];
    for (r, row_str) in s.iter().enumerate() {
        if row_str.chars().count() != GRID_SIZE {
            return Err(Error::parse(
                *row_str,
                format!("row {} must have {} cells", r, GRID_SIZE),
            ));
        }
        for (c, ch) in row_str.chars().enumerate() {
            grid[r][c] = Cell::from_char(ch).ok_or_else(|| {
                Error::parse(
                    *row_str,
                    format!("unrecognized character '{}' in row {} col {}", ch, r, c),
                )
            })?;
        }
    }
    GridState::from_grid(grid)
}

/// Parses a list of Tower of Hanoi moves.
///
/// Moves may be written `A->C`, `A-C`, `A to C` or `AC`, separated by commas
/// or whitespace, in any letter case.
///
/// # Examples
/// ```
/// use puzzle_engine::hanoi::{HanoiMove, Peg};
/// use puzzle_engine::utils::parse_hanoi_moves;
///
/// let moves = parse_hanoi_moves("A->C, a-b  C to B ba").unwrap();
/// assert_eq!(moves, vec![
///     HanoiMove::new(Peg::A, Peg::C),
///     HanoiMove::new(Peg::A, Peg::B),
///     HanoiMove::new(Peg::C, Peg::B),
///     HanoiMove::new(Peg::B, Peg::A),
/// ]);
/// ```
pub fn parse_hanoi_moves(input: &str) -> Result<Vec<HanoiMove>> {
    let normalized = input.to_ascii_uppercase().replace("->", " ").replace("TO", " ");
    let mut pegs = Vec::new();
    for ch in normalized.chars() {
        if ch.is_whitespace() || ch == ',' || ch == '-' {
            continue;
        }
        let peg = Peg::from_char(ch)
            .ok_or_else(|| Error::parse(input, format!("'{}' is not a peg", ch)))?;
        pegs.push(peg);
    }
    if pegs.len() % 2 != 0 {
        return Err(Error::parse(input, "a move is missing its destination peg"));
    }
    Ok(pegs
        .chunks_exact(2)
        .map(|pair| HanoiMove::new(pair[0], pair[1]))
        .collect())
}

/// Parses a list of 1-based knight squares into 0-based `(row, col)` pairs.
///
/// Every square is a row digit followed by a column digit; any brackets,
/// commas and whitespace between them are ignored, so `"(1,1) (3,2)"`,
/// `"1 1, 3 2"` and `"11 32"` are equivalent.
///
/// # Examples
/// ```
/// use puzzle_engine::utils::parse_knight_path;
///
/// assert_eq!(parse_knight_path("(1,1) (3,2)").unwrap(), vec![(0, 0), (2, 1)]);
/// assert_eq!(parse_knight_path("11 32").unwrap(), vec![(0, 0), (2, 1)]);
/// assert!(parse_knight_path("9 1").is_err());
/// ```
pub fn parse_knight_path(input: &str) -> Result<Vec<Square>> {
    let mut coordinates = Vec::new();
    for ch in input.chars() {
        if ch.is_whitespace() || matches!(ch, '(' | ')' | '[' | ']' | ',' | ';') {
            continue;
        }
        match ch.to_digit(10) {
            Some(d) if (1..=KNIGHT_BOARD_SIZE as u32).contains(&d) => coordinates.push(d as usize - 1),
            _ => {
                return Err(Error::parse(
                    input,
                    format!("'{}' is not a coordinate between 1 and {}", ch, KNIGHT_BOARD_SIZE),
                ))
            }
        }
    }
    if coordinates.len() % 2 != 0 {
        return Err(Error::parse(input, "a square is missing its column"));
    }
    Ok(coordinates
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tictactoe::Player;

    #[test]
    fn test_grid_from_str_array_valid() {
        let state = grid_from_str_array(&["XO...", ".....", "..X..", ".....", "....."]).unwrap();
        assert_eq!(state.cell(0, 0), Cell::X);
        assert_eq!(state.cell(0, 1), Cell::O);
        assert_eq!(state.cell(2, 2), Cell::X);
        assert_eq!(state.to_move(), Player::O);
    }

    #[test]
    fn test_grid_from_str_array_invalid_char() {
        let result = grid_from_str_array(&["X.Z..", ".....", ".....", ".....", "....."]);
        match result {
            Err(Error::Parse { message, .. }) => assert!(message.contains("'Z'")),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_grid_from_str_array_wrong_dimensions() {
        assert!(grid_from_str_array(&["....."; 4]).is_err());
        assert!(grid_from_str_array(&["......", ".....", ".....", ".....", "....."]).is_err());
        assert!(grid_from_str_array(&["....", ".....", ".....", ".....", "....."]).is_err());
    }

    #[test]
    fn test_grid_from_str_array_bad_counts() {
        let result = grid_from_str_array(&["OO...", ".....", ".....", ".....", "....."]);
        assert!(matches!(result, Err(Error::InvalidBoard { .. })));
    }

    #[test]
    fn test_parse_hanoi_moves_formats() {
        let moves = parse_hanoi_moves("AC,AB,CB").unwrap();
        assert_eq!(moves.len(), 3);
        assert_eq!(moves[2], HanoiMove::new(Peg::C, Peg::B));
        assert!(parse_hanoi_moves("").unwrap().is_empty());
        assert!(parse_hanoi_moves("A->D").is_err());
        assert!(parse_hanoi_moves("A->C, B").is_err());
    }

    #[test]
    fn test_parse_knight_path_formats() {
        assert_eq!(parse_knight_path("1 2").unwrap(), vec![(0, 1)]);
        assert_eq!(parse_knight_path("[8,8]").unwrap(), vec![(7, 7)]);
        assert!(parse_knight_path("1 0").is_err());
        assert!(parse_knight_path("1 2 3").is_err());
        assert!(parse_knight_path("a b").is_err());
    }
}
