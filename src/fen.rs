use std::{
    fmt::{self, Display, Formatter},
    iter::{once, repeat},
    num::ParseIntError,
    str::FromStr,
};

use thiserror::Error;

use crate::{
    board::{Board, Grid},
    castling_right::{CastlingRights, InvalidCastlingCharacter},
    color::{Color, ParseColorError},
    coord::{Coord, ParseCoordError},
    piece::{InvalidFenPiece, Piece},
};

/// A [`Board`] in Forsyth-Edwards Notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fen(pub Board);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFenError {
    #[error("a row has fewer than 8 squares")]
    NotEnoughSquaresOnRow,
    #[error("a row has more than 8 squares")]
    ExceedingSquaresOnRow,
    #[error("placement has {0} rows, 8 were expected")]
    WrongRowCount(usize),
    #[error(transparent)]
    InvalidPiece(#[from] InvalidFenPiece),
    #[error("missing {0} field")]
    MissingField(&'static str),
    #[error("unexpected trailing `{0}`")]
    Unexpected(String),
    #[error("invalid side to move: {0}")]
    InvalidColor(#[from] ParseColorError),
    #[error("invalid castling rights: {0}")]
    InvalidCastling(#[from] InvalidCastlingCharacter),
    #[error("invalid en passant target: {0}")]
    InvalidEnPassant(#[from] ParseCoordError),
    #[error("{0} is not on the third or sixth rank")]
    EnPassantRank(Coord),
    #[error("invalid move counter: {0}")]
    InvalidNumber(#[from] ParseIntError),
    #[error("{0} has no king")]
    MissingKing(Color),
}

fn parse_placement(placement: &str) -> Result<Grid, ParseFenError> {
    let mut grid = [[None; 8]; 8];
    let rows: Vec<_> = placement.split('/').collect();
    if rows.len() != 8 {
        return Err(ParseFenError::WrongRowCount(rows.len()));
    }
    for (row, squares) in grid.iter_mut().zip(rows) {
        let mut x: usize = 0;
        for c in squares.chars() {
            if let Some(skip) = c.to_digit(10).filter(|skip| (1..=8).contains(skip)) {
                x += skip as usize;
            } else {
                let piece = Piece::from_fen(c)?;
                *row.get_mut(x).ok_or(ParseFenError::ExceedingSquaresOnRow)? = Some(piece);
                x += 1;
            }
            if x > 8 {
                return Err(ParseFenError::ExceedingSquaresOnRow);
            }
        }
        if x < 8 {
            return Err(ParseFenError::NotEnoughSquaresOnRow);
        }
    }
    Ok(grid)
}
/// Only the six-field form is written, but the castling, en passant and
/// clock fields may be left out when reading; they default to `- - 0 1`.
/// Castling rights are intersected with what the piece placement allows.
impl FromStr for Fen {
    type Err = ParseFenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = s.split_whitespace();
        let grid = parse_placement(fields.next().ok_or(ParseFenError::MissingField("placement"))?)?;
        let turn: Color = fields
            .next()
            .ok_or(ParseFenError::MissingField("side to move"))?
            .parse()?;
        let castling_rights = fields
            .next()
            .map(str::parse::<CastlingRights>)
            .transpose()?
            .unwrap_or(CastlingRights::NONE)
            .intersection(CastlingRights::recompute(&grid));
        let en_passant_target = match fields.next() {
            None | Some("-") => None,
            Some(square) => {
                let square: Coord = square.parse()?;
                if !matches!(square.rank(), 3 | 6) {
                    return Err(ParseFenError::EnPassantRank(square));
                }
                Some(square)
            }
        };
        let halfmove_clock = fields.next().map(str::parse).transpose()?.unwrap_or(0);
        let fullmove_number = fields.next().map(str::parse).transpose()?.unwrap_or(1);
        if let Some(rest) = fields.next() {
            return Err(ParseFenError::Unexpected(rest.to_string()));
        }
        let board = Board::new(
            grid,
            turn,
            castling_rights,
            en_passant_target,
            halfmove_clock,
            fullmove_number,
        );
        for color in Color::ALL {
            if board.king(color).is_none() {
                return Err(ParseFenError::MissingKing(color));
            }
        }
        Ok(Fen(board))
    }
}
impl Display for Fen {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let board = &self.0;
        for (row, first) in board.grid().iter().zip(once(true).chain(repeat(false))) {
            if !first {
                write!(f, "/")?;
            }
            let mut pieces = row.iter().peekable();
            while let Some(piece) = pieces.next() {
                if let Some(piece) = piece {
                    write!(f, "{}", piece.fen())?;
                } else {
                    let mut count = 1;
                    while pieces.peek().is_some_and(|piece| piece.is_none()) {
                        pieces.next();
                        count += 1;
                    }
                    write!(f, "{count}")?;
                }
            }
        }
        write!(f, " {}", board.turn().lowercase())?;
        write!(f, " {}", board.castling_rights())?;
        if let Some(square) = board.en_passant_target() {
            write!(f, " {square}")?;
        } else {
            write!(f, " -")?;
        }
        write!(
            f,
            " {} {}",
            board.halfmove_clock(),
            board.fullmove_number()
        )?;
        Ok(())
    }
}
#[cfg(test)]
mod test {
    use crate::{
        board::Board,
        castling_right::CastlingRights,
        color::Color,
        coord,
        fen::{Fen, ParseFenError},
        piece::InvalidFenPiece,
    };

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn starting_position_round_trip() {
        let fen: Fen = START.parse().unwrap();
        assert_eq!(fen.0, Board::starting_position());
        assert_eq!(Fen(Board::starting_position()).to_string(), START);
    }
    #[test]
    fn round_trip_after_moves() {
        let mut board = Board::starting_position();
        for movement in ["e2e4", "c7c5", "g1f3"] {
            board.apply_move(movement.parse().unwrap()).unwrap();
        }
        let fen = Fen(board).to_string();
        assert_eq!(
            fen,
            "rnbqkbnr/pp1ppppp/8/2p5/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
        );
        assert_eq!(fen.parse::<Fen>().unwrap().0, board);
    }
    #[test]
    fn optional_trailing_fields() {
        let fen: Fen = "4k3/8/8/8/8/8/8/4K2R b".parse().unwrap();
        assert_eq!(fen.0.turn(), Color::Black);
        assert_eq!(fen.0.castling_rights(), CastlingRights::NONE);
        assert_eq!(fen.0.halfmove_clock(), 0);
        assert_eq!(fen.0.fullmove_number(), 1);
    }
    #[test]
    fn castling_rights_limited_by_placement() {
        let fen: Fen = "4k3/8/8/8/8/8/8/4K2R w KQkq - 0 1".parse().unwrap();
        assert_eq!(fen.0.castling_rights().to_string(), "K");
        let fen: Fen = "r3k2r/8/8/8/8/8/8/R3K2R w Kq - 0 1".parse().unwrap();
        assert_eq!(fen.0.castling_rights().to_string(), "Kq");
    }
    #[test]
    fn en_passant_field() {
        let fen: Fen = "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1".parse().unwrap();
        assert_eq!(fen.0.en_passant_target(), Some(coord!("d6")));
        assert_eq!(
            "4k3/8/8/3pP3/8/8/8/4K3 w - d5 0 1".parse::<Fen>(),
            Err(ParseFenError::EnPassantRank(coord!("d5")))
        );
    }
    #[test]
    fn malformed() {
        assert_eq!(
            "rnbqkbnr/ppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1".parse::<Fen>(),
            Err(ParseFenError::NotEnoughSquaresOnRow)
        );
        assert_eq!(
            "rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1".parse::<Fen>(),
            Err(ParseFenError::InvalidPiece(InvalidFenPiece('9')))
        );
        assert_eq!(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1".parse::<Fen>(),
            Err(ParseFenError::WrongRowCount(7))
        );
        assert_eq!(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR".parse::<Fen>(),
            Err(ParseFenError::MissingField("side to move"))
        );
        assert_eq!(
            "8/8/8/8/8/8/8/4K3 w - - 0 1".parse::<Fen>(),
            Err(ParseFenError::MissingKing(Color::Black))
        );
        assert!(matches!(
            "4k3/8/8/8/8/8/8/4K3 w - - x 1".parse::<Fen>(),
            Err(ParseFenError::InvalidNumber(_))
        ));
        assert!(matches!(
            "4k3/8/8/8/8/8/8/4K3 x - - 0 1".parse::<Fen>(),
            Err(ParseFenError::InvalidColor(_))
        ));
    }
}
