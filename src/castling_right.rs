use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use thiserror::Error;

use crate::{
    color::Color,
    coord::{Coord, home_row},
    piece::{Piece, PieceKind},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("found `{0}`, expected one of `k`, `q`, `-`, or uppercase forms of these letters")]
pub struct InvalidCastlingCharacter(pub char);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastlingSide {
    KingSide,
    QueenSide,
}
impl CastlingSide {
    pub const ALL: [Self; 2] = [CastlingSide::KingSide, CastlingSide::QueenSide];

    pub fn rook_origin_col(self) -> u8 {
        match self {
            CastlingSide::KingSide => 7,
            CastlingSide::QueenSide => 0,
        }
    }
    pub fn rook_destination_col(self) -> u8 {
        match self {
            CastlingSide::KingSide => 5,
            CastlingSide::QueenSide => 3,
        }
    }
    pub fn king_destination_col(self) -> u8 {
        match self {
            CastlingSide::KingSide => 6,
            CastlingSide::QueenSide => 2,
        }
    }
    pub fn from_king_destination_col(col: u8) -> Option<Self> {
        match col {
            6 => Some(CastlingSide::KingSide),
            2 => Some(CastlingSide::QueenSide),
            _ => None,
        }
    }
    fn from_rook_origin_col(col: u8) -> Option<Self> {
        match col {
            7 => Some(CastlingSide::KingSide),
            0 => Some(CastlingSide::QueenSide),
            _ => None,
        }
    }
    pub fn rook_origin(self, color: Color) -> Coord {
        Coord::new(home_row(color), self.rook_origin_col())
    }
    pub fn rook_destination(self, color: Color) -> Coord {
        Coord::new(home_row(color), self.rook_destination_col())
    }
}

pub const KING_HOME_COL: u8 = 4;

pub fn king_home(color: Color) -> Coord {
    Coord::new(home_row(color), KING_HOME_COL)
}

// Bit structure: 0000qkQK
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: Self = CastlingRights(0);
    pub const ALL: Self = CastlingRights(0b_1111);

    fn bit(color: Color, side: CastlingSide) -> u8 {
        let shift = match (color, side) {
            (Color::White, CastlingSide::KingSide) => 0,
            (Color::White, CastlingSide::QueenSide) => 1,
            (Color::Black, CastlingSide::KingSide) => 2,
            (Color::Black, CastlingSide::QueenSide) => 3,
        };
        0b_1 << shift
    }
    pub fn has(self, color: Color, side: CastlingSide) -> bool {
        self.0 & CastlingRights::bit(color, side) != 0
    }
    pub fn add(&mut self, color: Color, side: CastlingSide) {
        self.0 |= CastlingRights::bit(color, side);
    }
    pub fn remove(&mut self, color: Color, side: CastlingSide) {
        self.0 &= !CastlingRights::bit(color, side);
    }
    pub fn clear(&mut self, color: Color) {
        for side in CastlingSide::ALL {
            self.remove(color, side);
        }
    }
    pub fn intersection(self, other: Self) -> Self {
        CastlingRights(self.0 & other.0)
    }
    pub fn bits(self) -> u8 {
        self.0
    }
    /// Rights that remain after `moved` travels from `from` to `to`, taking
    /// `captured` on `to` if any. A king move forfeits both rights of its
    /// color; a rook leaving or being captured on its corner forfeits that
    /// side.
    #[must_use]
    pub fn after_move(self, moved: Piece, from: Coord, to: Coord, captured: Option<Piece>) -> Self {
        let mut rights = self;
        match moved.kind {
            PieceKind::King => rights.clear(moved.color),
            PieceKind::Rook => rights.remove_for_corner(moved.color, from),
            _ => (),
        }
        if let Some(captured) = captured
            && captured.kind == PieceKind::Rook
        {
            rights.remove_for_corner(captured.color, to);
        }
        rights
    }
    fn remove_for_corner(&mut self, color: Color, square: Coord) {
        if square.row() == home_row(color)
            && let Some(side) = CastlingSide::from_rook_origin_col(square.col())
        {
            self.remove(color, side);
        }
    }
    /// Best-effort rights for a board of unknown history: a right is granted
    /// whenever the king and the matching rook stand on their home squares.
    /// Rights lost by a king or rook that moved and came back cannot be
    /// recovered.
    pub fn recompute(grid: &[[Option<Piece>; 8]; 8]) -> Self {
        let mut rights = CastlingRights::NONE;
        for color in Color::ALL {
            let row = usize::from(home_row(color));
            let king = Some(Piece::new(color, PieceKind::King));
            let rook = Some(Piece::new(color, PieceKind::Rook));
            if grid[row][usize::from(KING_HOME_COL)] != king {
                continue;
            }
            for side in CastlingSide::ALL {
                if grid[row][usize::from(side.rook_origin_col())] == rook {
                    rights.add(color, side);
                }
            }
        }
        rights
    }
}
impl Display for CastlingRights {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut written = false;
        for (color, side, c) in [
            (Color::White, CastlingSide::KingSide, 'K'),
            (Color::White, CastlingSide::QueenSide, 'Q'),
            (Color::Black, CastlingSide::KingSide, 'k'),
            (Color::Black, CastlingSide::QueenSide, 'q'),
        ] {
            if self.has(color, side) {
                written = true;
                write!(f, "{c}")?;
            }
        }
        if !written {
            write!(f, "-")?;
        }
        Ok(())
    }
}
impl FromStr for CastlingRights {
    type Err = InvalidCastlingCharacter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rights = CastlingRights::NONE;
        for c in s.chars() {
            match c {
                'K' => rights.add(Color::White, CastlingSide::KingSide),
                'Q' => rights.add(Color::White, CastlingSide::QueenSide),
                'k' => rights.add(Color::Black, CastlingSide::KingSide),
                'q' => rights.add(Color::Black, CastlingSide::QueenSide),
                '-' => (),
                c => return Err(InvalidCastlingCharacter(c)),
            }
        }
        Ok(rights)
    }
}
