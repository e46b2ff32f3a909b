use std::ops::Index;

use crate::{
    castling_right::{CastlingRights, CastlingSide, KING_HOME_COL},
    color::Color,
    coord::{Coord, promotion_row},
    moves::{AppliedMove, CastlingMove, Move},
    piece::{Piece, PieceKind},
    square_set::{Occupancy, SquareSet},
};

pub type Grid = [[Option<Piece>; 8]; 8];

/// The full game position. Row 0 of the grid is rank 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    grid: Grid,
    turn: Color,
    castling_rights: CastlingRights,
    en_passant_target: Option<Coord>,
    halfmove_clock: u32,
    fullmove_number: u32,
}
impl Board {
    pub fn new(
        grid: Grid,
        turn: Color,
        castling_rights: CastlingRights,
        en_passant_target: Option<Coord>,
        halfmove_clock: u32,
        fullmove_number: u32,
    ) -> Self {
        Board {
            grid,
            turn,
            castling_rights,
            en_passant_target,
            halfmove_clock,
            fullmove_number,
        }
    }
    pub fn starting_position() -> Self {
        let configuration = PieceKind::STARTING_CONFIGURATION;
        let grid = [
            configuration.map(|kind| Some(Piece::new(Color::Black, kind))),
            [Some(Piece::new(Color::Black, PieceKind::Pawn)); 8],
            [None; 8],
            [None; 8],
            [None; 8],
            [None; 8],
            [Some(Piece::new(Color::White, PieceKind::Pawn)); 8],
            configuration.map(|kind| Some(Piece::new(Color::White, kind))),
        ];
        Board::new(grid, Color::White, CastlingRights::ALL, None, 0, 1)
    }
    /// A board built from a raw piece arrangement of unknown history.
    /// Castling rights are recomputed and there is no en passant target.
    pub fn from_grid(grid: Grid, turn: Color) -> Self {
        Board::new(grid, turn, CastlingRights::recompute(&grid), None, 0, 1)
    }
    pub fn grid(&self) -> &Grid {
        &self.grid
    }
    pub fn turn(&self) -> Color {
        self.turn
    }
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }
    pub fn en_passant_target(&self) -> Option<Coord> {
        self.en_passant_target
    }
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }
    pub fn pieces(&self) -> impl Iterator<Item = (Coord, Piece)> + '_ {
        Coord::all().filter_map(|square| self[square].map(|piece| (square, piece)))
    }
    pub fn occupancy(&self) -> Occupancy {
        self.pieces().map(|(square, _)| square).collect()
    }
    pub fn pieces_of(&self, color: Color) -> SquareSet {
        self.pieces()
            .filter(|(_, piece)| piece.color == color)
            .map(|(square, _)| square)
            .collect()
    }
    pub fn king(&self, color: Color) -> Option<Coord> {
        let king = Piece::new(color, PieceKind::King);
        self.pieces()
            .find(|(_, piece)| *piece == king)
            .map(|(square, _)| square)
    }
    fn set(&mut self, square: Coord, piece: Option<Piece>) {
        self.grid[usize::from(square.row())][usize::from(square.col())] = piece;
    }
    /// The castling side when `movement` is a two-file king move from the
    /// king's home column.
    pub fn castling_side(&self, movement: Move) -> Option<CastlingSide> {
        let piece = self[movement.origin]?;
        if piece.kind == PieceKind::King
            && movement.origin.col() == KING_HOME_COL
            && movement.origin.row() == movement.destination.row()
            && movement.origin.col().abs_diff(movement.destination.col()) == 2
        {
            CastlingSide::from_king_destination_col(movement.destination.col())
        } else {
            None
        }
    }
    pub fn is_en_passant(&self, movement: Move) -> bool {
        self[movement.origin].is_some_and(|piece| piece.kind == PieceKind::Pawn)
            && self.en_passant_target == Some(movement.destination)
            && movement.origin.col() != movement.destination.col()
            && self[movement.destination].is_none()
    }
    /// Plays `movement` without checking its legality. Returns `None` when
    /// the origin is empty. A pawn reaching the last rank without a promotion
    /// choice becomes a queen.
    pub fn apply_move(&mut self, movement: Move) -> Option<AppliedMove> {
        let Move {
            origin,
            destination,
            ..
        } = movement;
        let piece = self[origin]?;
        let color = piece.color;

        let mut captured = self[destination].map(|captured| (destination, captured));
        let en_passant = self.is_en_passant(movement);
        if en_passant {
            let victim = destination.with_row(origin.row());
            captured = self[victim].map(|captured| (victim, captured));
            self.set(victim, None);
        }
        let castling = self.castling_side(movement).map(|side| CastlingMove {
            side,
            rook_origin: side.rook_origin(color),
            rook_destination: side.rook_destination(color),
        });
        if let Some(castling) = castling {
            let rook = self[castling.rook_origin];
            self.set(castling.rook_origin, None);
            self.set(castling.rook_destination, rook);
        }
        let promotion = (piece.kind == PieceKind::Pawn && destination.row() == promotion_row(color))
            .then(|| {
                movement
                    .promotion
                    .filter(|kind| kind.is_promotion_choice())
                    .unwrap_or(PieceKind::Queen)
            });
        self.set(origin, None);
        self.set(
            destination,
            Some(Piece::new(color, promotion.unwrap_or(piece.kind))),
        );

        let captured_on_destination = captured
            .filter(|(square, _)| *square == destination)
            .map(|(_, piece)| piece);
        self.castling_rights =
            self.castling_rights
                .after_move(piece, origin, destination, captured_on_destination);
        self.en_passant_target = (piece.kind == PieceKind::Pawn
            && origin.row().abs_diff(destination.row()) == 2)
            .then(|| origin.with_row((origin.row() + destination.row()) / 2));
        if piece.kind == PieceKind::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if color == Color::Black {
            self.fullmove_number += 1;
        }
        self.turn = !self.turn;

        Some(AppliedMove {
            movement: Move {
                promotion,
                ..movement
            },
            piece,
            captured,
            castling,
            en_passant,
            promotion,
        })
    }
    #[must_use]
    pub fn clone_and_move(&self, movement: Move) -> Self {
        let mut board = *self;
        board.apply_move(movement);
        board
    }
}
impl Index<Coord> for Board {
    type Output = Option<Piece>;

    fn index(&self, index: Coord) -> &Self::Output {
        &self.grid[usize::from(index.row())][usize::from(index.col())]
    }
}
impl Default for Board {
    fn default() -> Self {
        Board::starting_position()
    }
}
