use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use thiserror::Error;

use crate::{
    castling_right::CastlingSide,
    coord::{Coord, ParseCoordError},
    piece::{InvalidFenPiece, Piece, PieceKind},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ParseMoveError {
    #[error("provided string contains invalid character")]
    InvalidChar,
    #[error(transparent)]
    ParseCoordError(#[from] ParseCoordError),
    #[error(transparent)]
    InvalidFenPiece(#[from] InvalidFenPiece),
    #[error("a pawn cannot promote into a {0}")]
    InvalidPromotion(PieceKind),
    #[error("unexpected `{0}`")]
    Unexpected(char),
}

/// A move in coordinate form. Whether it captures, castles or takes en
/// passant is derived by the board when the move is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub origin: Coord,
    pub destination: Coord,
    pub promotion: Option<PieceKind>,
}
impl Move {
    pub fn new(origin: Coord, destination: Coord) -> Self {
        Move {
            origin,
            destination,
            promotion: None,
        }
    }
    pub fn with_promotion(self, promotion: PieceKind) -> Self {
        Move {
            promotion: Some(promotion),
            ..self
        }
    }
}
impl Display for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.origin, self.destination)?;
        if let Some(promotion) = self.promotion {
            write!(f, "{}", promotion.lowercase())?;
        }
        Ok(())
    }
}
impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let origin = s.get(0..2).ok_or(ParseMoveError::InvalidChar)?.parse()?;
        let destination = s.get(2..4).ok_or(ParseMoveError::InvalidChar)?.parse()?;
        let mut rest = s
            .get(4..)
            .ok_or(ParseMoveError::InvalidChar)?
            .chars()
            .fuse();
        let promotion = rest.next().map(PieceKind::from_fen).transpose()?;
        if let Some(promotion) = promotion
            && !promotion.is_promotion_choice()
        {
            return Err(ParseMoveError::InvalidPromotion(promotion));
        }
        if let Some(c) = rest.next() {
            return Err(ParseMoveError::Unexpected(c));
        }
        Ok(Move {
            origin,
            destination,
            promotion,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CastlingMove {
    pub side: CastlingSide,
    pub rook_origin: Coord,
    pub rook_destination: Coord,
}

/// What actually happened when a [`Move`] was played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AppliedMove {
    /// The move as played, with the promotion piece filled in.
    pub movement: Move,
    pub piece: Piece,
    /// The captured piece and the square it stood on. For en passant this is
    /// not the destination.
    pub captured: Option<(Coord, Piece)>,
    pub castling: Option<CastlingMove>,
    pub en_passant: bool,
    pub promotion: Option<PieceKind>,
}
impl AppliedMove {
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }
    pub fn is_castle(&self) -> bool {
        self.castling.is_some()
    }
    /// Squares whose occupancy differs before and after the move.
    pub fn touched_squares(&self) -> impl Iterator<Item = Coord> {
        [self.movement.origin, self.movement.destination]
            .into_iter()
            .chain(self.captured.map(|(square, _)| square))
            .chain(
                self.castling
                    .into_iter()
                    .flat_map(|castling| [castling.rook_origin, castling.rook_destination]),
            )
    }
}
