use std::sync::LazyLock;

use rand::{Rng, SeedableRng, rngs::SmallRng};
use rustc_hash::FxHashMap;

use crate::{board::Board, color::Color};

const SEED: u64 = 0x5EB5_0A4D_C4E5_5B0A;

struct Keys {
    pieces: [[[u64; 64]; 6]; 2],
    castling: [u64; 16],
    en_passant_file: [u64; 8],
    black_to_move: u64,
}
static KEYS: LazyLock<Keys> = LazyLock::new(|| {
    let mut rng = SmallRng::seed_from_u64(SEED);
    let mut pieces = [[[0; 64]; 6]; 2];
    for key in pieces.iter_mut().flatten().flatten() {
        *key = rng.random();
    }
    Keys {
        pieces,
        castling: rng.random(),
        en_passant_file: rng.random(),
        black_to_move: rng.random(),
    }
});

/// Position key over placement, castling rights, en passant file and side to
/// move. Clocks are not part of it.
pub fn hash(board: &Board) -> u64 {
    let keys = &*KEYS;
    let mut hash = 0;
    for (square, piece) in board.pieces() {
        hash ^= keys.pieces[piece.color.index()][piece.kind.index()][square.index()];
    }
    hash ^= keys.castling[usize::from(board.castling_rights().bits())];
    if let Some(target) = board.en_passant_target() {
        hash ^= keys.en_passant_file[usize::from(target.col())];
    }
    if board.turn() == Color::Black {
        hash ^= keys.black_to_move;
    }
    hash
}

/// Occurrence counts of the positions reached since the last irreversible
/// move.
#[derive(Debug, Clone, Default)]
pub struct PositionHistory {
    counts: FxHashMap<u64, u8>,
}
impl PositionHistory {
    pub fn new() -> Self {
        PositionHistory::default()
    }
    /// Records `board` and returns how many times it has now occurred. A zero
    /// halfmove clock means no earlier position can recur, so the history is
    /// dropped first.
    pub fn record(&mut self, board: &Board) -> u8 {
        if board.halfmove_clock() == 0 {
            self.counts.clear();
        }
        let count = self.counts.entry(hash(board)).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }
    pub fn count(&self, board: &Board) -> u8 {
        self.counts.get(&hash(board)).copied().unwrap_or(0)
    }
    pub fn is_threefold(&self, board: &Board) -> bool {
        self.count(board) >= 3
    }
    pub fn clear(&mut self) {
        self.counts.clear();
    }
}
