//! Legal move generation over a borrowed [`Board`].
//!
//! Every function here is pure. Legality is decided by playing each
//! candidate on a copy of the board and checking whether the mover's king is
//! attacked afterwards, so pins need no special handling.

use crate::{
    board::Board,
    castling_right::{CastlingSide, KING_HOME_COL, king_home},
    color::Color,
    coord::{Coord, Vector, pawn_start_row, promotion_row},
    moves::Move,
    piece::{Piece, PieceKind},
    square_set::SquareSet,
};

fn step_destinations(board: &Board, origin: Coord, color: Color, steps: &[Vector]) -> SquareSet {
    steps
        .iter()
        .filter_map(|step| origin.move_by(*step))
        .filter(|destination| board[*destination].is_none_or(|piece| piece.color != color))
        .collect()
}
fn sliding_destinations(
    board: &Board,
    origin: Coord,
    color: Color,
    directions: &[Vector],
) -> SquareSet {
    let mut destinations = SquareSet::EMPTY;
    for direction in directions {
        for destination in origin.ray(*direction) {
            match board[destination] {
                None => destinations.insert(destination),
                Some(piece) => {
                    if piece.color != color {
                        destinations.insert(destination);
                    }
                    break;
                }
            }
        }
    }
    destinations
}
fn pawn_destinations(board: &Board, origin: Coord, color: Color) -> SquareSet {
    let mut destinations = SquareSet::EMPTY;
    if let Some(single) = origin.move_by(Vector::pawn_single_move(color))
        && board[single].is_none()
    {
        destinations.insert(single);
        if origin.row() == pawn_start_row(color)
            && let Some(double) = origin.move_by(Vector::pawn_double_move(color))
            && board[double].is_none()
        {
            destinations.insert(double);
        }
    }
    for attack in Vector::pawn_attacks(color) {
        let Some(destination) = origin.move_by(attack) else {
            continue;
        };
        let captures = board[destination].is_some_and(|piece| piece.color != color);
        let en_passant = board.turn() == color && board.en_passant_target() == Some(destination);
        if captures || en_passant {
            destinations.insert(destination);
        }
    }
    destinations
}
fn castling_destinations(board: &Board, origin: Coord, color: Color) -> SquareSet {
    let mut destinations = SquareSet::EMPTY;
    if origin != king_home(color) {
        return destinations;
    }
    let rook = Some(Piece::new(color, PieceKind::Rook));
    for side in CastlingSide::ALL {
        if !board.castling_rights().has(color, side) || board[side.rook_origin(color)] != rook {
            continue;
        }
        let rook_col = side.rook_origin_col();
        let between = KING_HOME_COL.min(rook_col) + 1..KING_HOME_COL.max(rook_col);
        if between
            .map(|col| origin.with_col(col))
            .any(|square| board[square].is_some())
        {
            continue;
        }
        let king_col = side.king_destination_col();
        let path = KING_HOME_COL.min(king_col)..=KING_HOME_COL.max(king_col);
        if path
            .map(|col| origin.with_col(col))
            .any(|square| is_square_attacked(board, square, !color))
        {
            continue;
        }
        destinations.insert(origin.with_col(king_col));
    }
    destinations
}
fn non_castling_destinations(board: &Board, origin: Coord, piece: Piece) -> SquareSet {
    let color = piece.color;
    match piece.kind {
        PieceKind::Pawn => pawn_destinations(board, origin, color),
        PieceKind::Knight => step_destinations(board, origin, color, &Vector::KNIGHT_MOVES),
        PieceKind::Bishop => {
            sliding_destinations(board, origin, color, &Vector::BISHOP_DIRECTIONS)
        }
        PieceKind::Rook => sliding_destinations(board, origin, color, &Vector::ROOK_DIRECTIONS),
        PieceKind::Queen => {
            sliding_destinations(board, origin, color, &Vector::QUEEN_DIRECTIONS)
        }
        PieceKind::King => step_destinations(board, origin, color, &Vector::KING_MOVES),
    }
}
/// Destinations for the piece on `square` ignoring whether its own king is
/// left in check. Castling destinations already account for attacked
/// transit squares. An empty square has no moves.
pub fn pseudo_legal_moves(board: &Board, square: Coord) -> SquareSet {
    let Some(piece) = board[square] else {
        return SquareSet::EMPTY;
    };
    let mut destinations = non_castling_destinations(board, square, piece);
    if piece.kind == PieceKind::King {
        destinations |= castling_destinations(board, square, piece.color);
    }
    destinations
}
/// Destinations for the piece on `square` that do not leave its own king
/// attacked. A side without a king has no legal moves.
pub fn legal_moves(board: &Board, square: Coord) -> SquareSet {
    let Some(piece) = board[square] else {
        return SquareSet::EMPTY;
    };
    if board.king(piece.color).is_none() {
        return SquareSet::EMPTY;
    }
    pseudo_legal_moves(board, square)
        .into_iter()
        .filter(|destination| {
            let after = board.clone_and_move(Move::new(square, *destination));
            after
                .king(piece.color)
                .is_some_and(|king| !is_square_attacked(&after, king, !piece.color))
        })
        .collect()
}
pub fn is_legal(board: &Board, movement: Move) -> bool {
    board[movement.origin].is_some_and(|piece| piece.color == board.turn())
        && legal_moves(board, movement.origin).contains(movement.destination)
}
/// Whether any piece of `by` attacks `square`. Castling never attacks, so
/// this does not recurse into castling generation.
pub fn is_square_attacked(board: &Board, square: Coord, by: Color) -> bool {
    let holds = |square: Coord, kinds: &[PieceKind]| {
        board[square].is_some_and(|piece| piece.color == by && kinds.contains(&piece.kind))
    };
    let steps_hit = |steps: &[Vector], kinds: &[PieceKind]| {
        steps
            .iter()
            .filter_map(|step| square.move_by(*step))
            .any(|square| holds(square, kinds))
    };
    let rays_hit = |directions: &[Vector], kinds: &[PieceKind]| {
        directions.iter().any(|direction| {
            square
                .ray(*direction)
                .find(|square| board[*square].is_some())
                .is_some_and(|square| holds(square, kinds))
        })
    };
    steps_hit(&Vector::pawn_attacks(!by), &[PieceKind::Pawn])
        || steps_hit(&Vector::KNIGHT_MOVES, &[PieceKind::Knight])
        || steps_hit(&Vector::KING_MOVES, &[PieceKind::King])
        || rays_hit(
            &Vector::BISHOP_DIRECTIONS,
            &[PieceKind::Bishop, PieceKind::Queen],
        )
        || rays_hit(&Vector::ROOK_DIRECTIONS, &[PieceKind::Rook, PieceKind::Queen])
}
pub fn is_in_check(board: &Board, color: Color) -> bool {
    board
        .king(color)
        .is_some_and(|king| is_square_attacked(board, king, !color))
}
fn has_legal_move(board: &Board, color: Color) -> bool {
    board
        .pieces_of(color)
        .into_iter()
        .any(|square| !legal_moves(board, square).is_empty())
}
pub fn is_checkmate(board: &Board, color: Color) -> bool {
    is_in_check(board, color) && !has_legal_move(board, color)
}
pub fn is_stalemate(board: &Board, color: Color) -> bool {
    board.king(color).is_some() && !is_in_check(board, color) && !has_legal_move(board, color)
}
pub fn is_promotion(piece: Piece, destination_row: u8) -> bool {
    piece.kind == PieceKind::Pawn && destination_row == promotion_row(piece.color)
}
/// Every legal move of the side to move. Promotions are listed once per
/// promotion choice.
pub fn all_legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::new();
    for origin in board.pieces_of(board.turn()) {
        let Some(piece) = board[origin] else {
            continue;
        };
        for destination in legal_moves(board, origin) {
            let movement = Move::new(origin, destination);
            if is_promotion(piece, destination.row()) {
                moves.extend(
                    PieceKind::PROMOTION_CHOICES.map(|kind| movement.with_promotion(kind)),
                );
            } else {
                moves.push(movement);
            }
        }
    }
    moves
}
pub fn is_fifty_move_rule(board: &Board) -> bool {
    board.halfmove_clock() >= 100
}
/// Neither side can possibly deliver mate: bare kings, a single minor piece,
/// or one bishop each on squares of the same color.
pub fn has_insufficient_material(board: &Board) -> bool {
    let mut minors = Vec::new();
    for (square, piece) in board.pieces() {
        match piece.kind {
            PieceKind::King => (),
            PieceKind::Knight | PieceKind::Bishop => minors.push((square, piece)),
            PieceKind::Pawn | PieceKind::Rook | PieceKind::Queen => return false,
        }
    }
    match minors.as_slice() {
        [] | [_] => true,
        [(first_square, first), (second_square, second)] => {
            first.kind == PieceKind::Bishop
                && second.kind == PieceKind::Bishop
                && first.color != second.color
                && first_square.color() == second_square.color()
        }
        _ => false,
    }
}
#[cfg(test)]
mod test {
    use crate::{
        board::Board,
        color::Color,
        coord,
        fen::Fen,
        moves::Move,
        piece::{Piece, PieceKind},
        rules::{
            all_legal_moves, has_insufficient_material, is_checkmate, is_fifty_move_rule,
            is_in_check, is_legal, is_square_attacked, is_stalemate, legal_moves,
            pseudo_legal_moves,
        },
        square_set::SquareSet,
    };

    fn from_fen(fen: &str) -> Board {
        fen.parse::<Fen>().unwrap().0
    }
    fn squares(squares: &[&str]) -> SquareSet {
        squares.iter().map(|square| square.parse().unwrap()).collect()
    }
    #[test]
    fn initial_pawn_moves() {
        let board = Board::starting_position();
        assert_eq!(legal_moves(&board, coord!("e2")), squares(&["e3", "e4"]));
        assert_eq!(legal_moves(&board, coord!("g1")), squares(&["f3", "h3"]));
        assert_eq!(legal_moves(&board, coord!("e4")), SquareSet::EMPTY);
        assert_eq!(all_legal_moves(&board).len(), 20);
    }
    #[test]
    fn pin() {
        let board = from_fen("4k3/4r3/8/8/8/8/4N3/4K3 w - - 0 1");
        assert!(!pseudo_legal_moves(&board, coord!("e2")).is_empty());
        assert!(legal_moves(&board, coord!("e2")).is_empty());
    }
    #[test]
    fn sliders_stop_at_first_piece() {
        let board = from_fen("4k3/8/8/8/1p6/8/8/R3K3 w Q - 0 1");
        let moves = pseudo_legal_moves(&board, coord!("a1"));
        assert!(moves.contains(coord!("a8")));
        assert!(moves.contains(coord!("d1")));
        assert!(!moves.contains(coord!("e1")));

        let board = from_fen("4k3/8/8/8/8/8/1P6/B3K3 w - - 0 1");
        assert!(pseudo_legal_moves(&board, coord!("a1")).is_empty());
    }
    #[test]
    fn applied_legal_moves_never_leave_own_king_attacked() {
        let board = from_fen("r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5Q2/PPPP1PPP/RNB1K1NR w KQkq - 2 3");
        for movement in all_legal_moves(&board) {
            let after = board.clone_and_move(movement);
            assert!(!is_in_check(&after, Color::White), "{movement}");
        }
    }
    #[test]
    fn castling_requires_unattacked_path() {
        let board = from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let moves = legal_moves(&board, coord!("e1"));
        assert!(moves.contains(coord!("g1")));
        assert!(moves.contains(coord!("c1")));

        let board = from_fen("r3k2r/8/8/8/8/8/5r2/R3K2R w KQkq - 0 1");
        let moves = legal_moves(&board, coord!("e1"));
        assert!(!moves.contains(coord!("g1")));

        let board = from_fen("r3k2r/8/8/8/8/8/8/RN2K2R w KQkq - 0 1");
        let moves = legal_moves(&board, coord!("e1"));
        assert!(!moves.contains(coord!("c1")));
        assert!(moves.contains(coord!("g1")));

        // b1 may be attacked, it is only required to be empty
        let board = from_fen("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1");
        assert!(legal_moves(&board, coord!("e1")).contains(coord!("c1")));

        let board = from_fen("4k3/8/8/8/8/8/8/R3K2R w - - 0 1");
        let moves = legal_moves(&board, coord!("e1"));
        assert!(!moves.contains(coord!("g1")));
        assert!(!moves.contains(coord!("c1")));
    }
    #[test]
    fn castling_not_out_of_check() {
        let board = from_fen("4k3/8/8/8/8/8/4r3/R3K2R w KQ - 0 1");
        let moves = legal_moves(&board, coord!("e1"));
        assert!(!moves.contains(coord!("g1")));
        assert!(!moves.contains(coord!("c1")));
    }
    #[test]
    fn attacks_stop_at_blockers() {
        let board = from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1");
        assert!(is_square_attacked(&board, coord!("h5"), Color::White));
        assert!(is_square_attacked(&board, coord!("f2"), Color::White));
        assert!(!is_square_attacked(&board, coord!("c1"), Color::White));
    }
    #[test]
    fn en_passant_only_while_target_set() {
        let mut board = from_fen("4k3/3p4/8/4P3/8/8/8/4K3 b - - 0 1");
        board.apply_move("d7d5".parse().unwrap()).unwrap();
        assert_eq!(board.en_passant_target(), Some(coord!("d6")));
        assert!(legal_moves(&board, coord!("e5")).contains(coord!("d6")));
        assert!(is_legal(&board, "e5d6".parse().unwrap()));

        board.apply_move("e1e2".parse().unwrap()).unwrap();
        board.apply_move("e8e7".parse().unwrap()).unwrap();
        assert_eq!(board.en_passant_target(), None);
        assert!(!legal_moves(&board, coord!("e5")).contains(coord!("d6")));
    }
    #[test]
    fn en_passant_discovering_check_is_illegal() {
        let board = from_fen("8/8/8/K2pP2r/8/8/8/4k3 w - d6 0 1");
        assert!(!legal_moves(&board, coord!("e5")).contains(coord!("d6")));
    }
    #[test]
    fn checkmate_and_stalemate() {
        let board = from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert!(is_in_check(&board, Color::White));
        assert!(is_checkmate(&board, Color::White));
        assert!(!is_stalemate(&board, Color::White));

        let board = from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert!(is_stalemate(&board, Color::Black));
        assert!(!is_checkmate(&board, Color::Black));
        assert!(all_legal_moves(&board).is_empty());

        let board = Board::starting_position();
        assert!(!is_checkmate(&board, Color::White));
        assert!(!is_stalemate(&board, Color::White));
    }
    #[test]
    fn missing_king_is_never_check() {
        let mut grid = [[None; 8]; 8];
        grid[6][4] = Some(Piece::new(Color::White, PieceKind::Pawn));
        let board = Board::from_grid(grid, Color::White);
        assert!(!is_in_check(&board, Color::White));
        assert!(legal_moves(&board, coord!("e2")).is_empty());
        assert!(!is_checkmate(&board, Color::White));
        assert!(!is_stalemate(&board, Color::White));
    }
    #[test]
    fn promotions_are_expanded() {
        let board = from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1");
        let promotions = all_legal_moves(&board)
            .into_iter()
            .filter(|movement| movement.origin == coord!("a7"))
            .count();
        assert_eq!(promotions, 4);
        assert!(is_legal(&board, Move::new(coord!("a7"), coord!("a8"))));
    }
    #[test]
    fn draw_conditions() {
        assert!(has_insufficient_material(&from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1")));
        assert!(has_insufficient_material(&from_fen("4k3/8/8/8/8/8/8/4KN2 w - - 0 1")));
        assert!(has_insufficient_material(&from_fen("2b1k3/8/8/8/8/8/8/4KB2 w - - 0 1")));
        assert!(!has_insufficient_material(&from_fen("1b2k3/8/8/8/8/8/8/4KB2 w - - 0 1")));
        assert!(!has_insufficient_material(&from_fen("4k3/8/8/8/8/8/8/4KNN1 w - - 0 1")));
        assert!(!has_insufficient_material(&from_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1")));

        assert!(is_fifty_move_rule(&from_fen("4k3/8/8/8/8/8/8/4KR2 w - - 100 80")));
        assert!(!is_fifty_move_rule(&from_fen("4k3/8/8/8/8/8/8/4KR2 w - - 99 80")));
    }
}
