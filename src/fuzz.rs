use std::str::FromStr;

use rand::{SeedableRng, rngs::SmallRng, seq::IndexedRandom};
use rustc_hash::FxHashSet;

use crate::{board::Board, fen::Fen, rules::all_legal_moves};

fn reference_moves(board: &Board) -> FxHashSet<String> {
    let board = chess::Board::from_str(&Fen(*board).to_string()).unwrap();
    chess::MoveGen::new_legal(&board)
        .map(|movement| movement.to_string())
        .collect()
}
#[test]
fn legal_moves_match_reference() {
    let mut rng = SmallRng::seed_from_u64(0x5EED);
    for _ in 0..50 {
        let mut board = Board::starting_position();
        for _ in 0..150 {
            let moves = all_legal_moves(&board);
            let found: FxHashSet<_> = moves.iter().map(ToString::to_string).collect();
            let expected = reference_moves(&board);
            if let Some(movement) = found.difference(&expected).next() {
                panic!("found {movement} but it's not a legal move\n{}", Fen(board));
            }
            if let Some(movement) = expected.difference(&found).next() {
                panic!("{movement} not found\n{}", Fen(board));
            }
            let Some(movement) = moves.choose(&mut rng) else {
                break;
            };
            board.apply_move(*movement).unwrap();
        }
    }
}
