use std::{
    fmt::{self, Display, Formatter},
    ops::{Add, Mul, Neg, Sub},
    str::FromStr,
};

use thiserror::Error;

use crate::color::Color;

/// Builds a [`Coord`] from algebraic notation at compile time, e.g.
/// `coord!("e4")`.
#[macro_export]
macro_rules! coord {
    ($square:literal) => {{
        const SQUARE: $crate::coord::Coord = $crate::coord::Coord::from_algebraic($square);
        SQUARE
    }};
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ParseCoordError {
    #[error("found `{0}`, characters from `a` to `h` were expected instead")]
    InvalidFile(char),
    #[error("found `{0}`, characters from `1` to `8` were expected instead")]
    InvalidRank(char),
    #[error("provided string have length of {0} characters, 2 were expected")]
    NotEnoughCharacter(u8),
    #[error("unexpected `{0}`")]
    Unexpected(char),
}

/// A square on the board. Row 0 is rank 8 (black's home), row 7 is rank 1,
/// column 0 is file a. Stored as `row * 8 + col`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord(u8);

impl Coord {
    pub const fn new(row: u8, col: u8) -> Self {
        assert!(row < 8 && col < 8, "coordinate out of bounds");
        Coord(row * 8 + col)
    }
    pub fn new_checked(row: i8, col: i8) -> Option<Self> {
        let row = u8::try_from(row).ok().filter(|row| *row < 8)?;
        let col = u8::try_from(col).ok().filter(|col| *col < 8)?;
        Some(Coord::new(row, col))
    }
    pub fn from_index(index: usize) -> Option<Self> {
        u8::try_from(index).ok().filter(|index| *index < 64).map(Coord)
    }
    /// Panics on malformed input; meant for the `coord!` macro.
    pub const fn from_algebraic(square: &str) -> Self {
        let bytes = square.as_bytes();
        assert!(bytes.len() == 2, "expected two characters");
        let file = bytes[0];
        let rank = bytes[1];
        assert!(file >= b'a' && file <= b'h', "file out of range");
        assert!(rank >= b'1' && rank <= b'8', "rank out of range");
        Coord::new(7 - (rank - b'1'), file - b'a')
    }
    pub fn from_chars(file: char, rank: char) -> Result<Self, ParseCoordError> {
        let col = match file {
            'a'..='h' => file as u8 - b'a',
            _ => return Err(ParseCoordError::InvalidFile(file)),
        };
        let row = match rank {
            '1'..='8' => 7 - (rank as u8 - b'1'),
            _ => return Err(ParseCoordError::InvalidRank(rank)),
        };
        Ok(Coord::new(row, col))
    }
    pub fn all() -> impl DoubleEndedIterator<Item = Self> + ExactSizeIterator {
        (0..64).map(Coord)
    }
    pub const fn row(self) -> u8 {
        self.0 / 8
    }
    pub const fn col(self) -> u8 {
        self.0 % 8
    }
    pub const fn index(self) -> usize {
        self.0 as usize
    }
    pub fn file_char(self) -> char {
        (self.col() + b'a') as char
    }
    pub fn rank(self) -> u8 {
        8 - self.row()
    }
    #[allow(clippy::cast_possible_wrap, reason = "rows and columns are < 8")]
    pub fn move_by(self, vector: Vector) -> Option<Self> {
        let row = (self.row() as i8).checked_add(vector.row)?;
        let col = (self.col() as i8).checked_add(vector.col)?;
        Coord::new_checked(row, col)
    }
    /// Squares along `direction`, excluding `self`, up to the board edge.
    pub fn ray(self, direction: Vector) -> impl Iterator<Item = Self> {
        debug_assert_ne!(direction, Vector::ZERO);
        (1..).map_while(move |distance| self.move_by(direction * distance))
    }
    pub fn with_col(self, col: u8) -> Self {
        Coord::new(self.row(), col)
    }
    pub fn with_row(self, row: u8) -> Self {
        Coord::new(row, self.col())
    }
    /// Color of the square itself; h1 and a8 are light.
    pub fn color(self) -> Color {
        if (self.row() + self.col()) % 2 == 0 {
            Color::White
        } else {
            Color::Black
        }
    }
}
pub fn home_row(color: Color) -> u8 {
    match color {
        Color::White => 7,
        Color::Black => 0,
    }
}
pub fn pawn_start_row(color: Color) -> u8 {
    match color {
        Color::White => 6,
        Color::Black => 1,
    }
}
pub fn promotion_row(color: Color) -> u8 {
    match color {
        Color::White => 0,
        Color::Black => 7,
    }
}
pub fn pawn_direction(color: Color) -> i8 {
    match color {
        Color::White => -1,
        Color::Black => 1,
    }
}
impl Display for Coord {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank())?;
        Ok(())
    }
}
impl FromStr for Coord {
    type Err = ParseCoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let Some(file) = chars.next() else {
            return Err(ParseCoordError::NotEnoughCharacter(0));
        };
        let Some(rank) = chars.next() else {
            return Err(ParseCoordError::NotEnoughCharacter(1));
        };
        if let Some(c) = chars.next() {
            return Err(ParseCoordError::Unexpected(c));
        }
        Coord::from_chars(file, rank)
    }
}
impl Sub<Self> for Coord {
    type Output = Vector;

    #[allow(clippy::cast_possible_wrap, reason = "rows and columns are < 8")]
    fn sub(self, rhs: Self) -> Self::Output {
        Vector {
            row: self.row() as i8 - rhs.row() as i8,
            col: self.col() as i8 - rhs.col() as i8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vector {
    pub row: i8,
    pub col: i8,
}
impl Vector {
    pub const ZERO: Self = Vector { row: 0, col: 0 };

    pub const KNIGHT_MOVES: [Self; 8] = [
        Vector { row: 2, col: 1 },
        Vector { row: 1, col: 2 },
        Vector { row: -1, col: 2 },
        Vector { row: -2, col: 1 },
        Vector { row: -2, col: -1 },
        Vector { row: -1, col: -2 },
        Vector { row: 1, col: -2 },
        Vector { row: 2, col: -1 },
    ];
    pub const KING_MOVES: [Self; 8] = [
        Vector { row: 1, col: 0 },
        Vector { row: -1, col: 0 },
        Vector { row: 0, col: 1 },
        Vector { row: 0, col: -1 },
        Vector { row: 1, col: 1 },
        Vector { row: 1, col: -1 },
        Vector { row: -1, col: 1 },
        Vector { row: -1, col: -1 },
    ];
    pub const ROOK_DIRECTIONS: [Self; 4] = [
        Vector { row: 1, col: 0 },
        Vector { row: -1, col: 0 },
        Vector { row: 0, col: 1 },
        Vector { row: 0, col: -1 },
    ];
    pub const BISHOP_DIRECTIONS: [Self; 4] = [
        Vector { row: 1, col: 1 },
        Vector { row: 1, col: -1 },
        Vector { row: -1, col: 1 },
        Vector { row: -1, col: -1 },
    ];
    pub const QUEEN_DIRECTIONS: [Self; 8] = Vector::KING_MOVES;

    pub fn pawn_single_move(color: Color) -> Self {
        Vector {
            row: pawn_direction(color),
            col: 0,
        }
    }
    pub fn pawn_double_move(color: Color) -> Self {
        Vector::pawn_single_move(color) * 2
    }
    pub fn pawn_attacks(color: Color) -> [Self; 2] {
        [-1, 1].map(|col| Vector {
            row: pawn_direction(color),
            col,
        })
    }
}
impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Self::Output {
        Vector {
            row: -self.row,
            col: -self.col,
        }
    }
}
impl Add<Self> for Vector {
    type Output = Vector;

    fn add(self, rhs: Self) -> Self::Output {
        Vector {
            row: self.row + rhs.row,
            col: self.col + rhs.col,
        }
    }
}
impl Mul<i8> for Vector {
    type Output = Vector;

    fn mul(self, rhs: i8) -> Self::Output {
        Vector {
            row: self.row * rhs,
            col: self.col * rhs,
        }
    }
}
#[cfg(test)]
mod test {
    use crate::{
        color::Color,
        coord,
        coord::{Coord, ParseCoordError, Vector},
    };

    #[test]
    fn rank_eight_is_row_zero() {
        let square = coord!("a8");
        assert_eq!((square.row(), square.col()), (0, 0));
        let square = coord!("h1");
        assert_eq!((square.row(), square.col()), (7, 7));
        assert_eq!(coord!("e4").to_string(), "e4");
    }
    #[test]
    fn parse_rejects_malformed_squares() {
        assert_eq!("i4".parse::<Coord>(), Err(ParseCoordError::InvalidFile('i')));
        assert_eq!("e9".parse::<Coord>(), Err(ParseCoordError::InvalidRank('9')));
        assert_eq!("e".parse::<Coord>(), Err(ParseCoordError::NotEnoughCharacter(1)));
        assert_eq!("e44".parse::<Coord>(), Err(ParseCoordError::Unexpected('4')));
    }
    #[test]
    fn off_board_steps_are_none() {
        assert_eq!(coord!("h1").move_by(Vector { row: 0, col: 1 }), None);
        assert_eq!(coord!("a8").move_by(Vector { row: -1, col: 0 }), None);
        assert_eq!(Coord::new_checked(8, 0), None);
        assert_eq!(Coord::new_checked(-1, 3), None);
    }
    #[test]
    fn ray_stops_at_edge() {
        let ray: Vec<_> = coord!("f1").ray(Vector { row: 0, col: 1 }).collect();
        assert_eq!(ray, [coord!("g1"), coord!("h1")]);
    }
    #[test]
    fn square_colors() {
        assert_eq!(coord!("a1").color(), Color::Black);
        assert_eq!(coord!("h1").color(), Color::White);
        assert_eq!(coord!("d1").color(), Color::White);
        assert_eq!(coord!("d8").color(), Color::Black);
    }
}
