use std::collections::VecDeque;

use rand::{SeedableRng, rngs::SmallRng, seq::IndexedRandom};
use tracing::debug;

use crate::{
    board::Board,
    moves::{Move, ParseMoveError},
    rules::all_legal_moves,
};

/// Source of moves for the side not played on the physical board.
pub trait Opponent {
    /// A move for the side to move on `board`, if one is ready. Must not
    /// block.
    fn poll_move(&mut self, board: &Board) -> Option<Move>;
    /// Called after every move played in the game, by either side.
    fn observe(&mut self, _movement: Move, _board: &Board) {}
}

/// Moves pushed in coordinate notation by an outside client such as a
/// network player or an engine process.
#[derive(Debug, Clone, Default)]
pub struct QueuedOpponent {
    queue: VecDeque<Move>,
}
impl QueuedOpponent {
    pub fn new() -> Self {
        QueuedOpponent::default()
    }
    pub fn push(&mut self, movement: Move) {
        self.queue.push_back(movement);
    }
    pub fn push_notation(&mut self, notation: &str) -> Result<(), ParseMoveError> {
        self.push(notation.parse()?);
        Ok(())
    }
    pub fn len(&self) -> usize {
        self.queue.len()
    }
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
impl Opponent for QueuedOpponent {
    fn poll_move(&mut self, _board: &Board) -> Option<Move> {
        self.queue.pop_front()
    }
}

/// Plays a uniformly random legal move.
#[derive(Debug, Clone)]
pub struct RandomOpponent {
    rng: SmallRng,
}
impl RandomOpponent {
    pub fn new() -> Self {
        RandomOpponent {
            rng: SmallRng::from_os_rng(),
        }
    }
    pub fn from_seed(seed: u64) -> Self {
        RandomOpponent {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}
impl Default for RandomOpponent {
    fn default() -> Self {
        RandomOpponent::new()
    }
}
impl Opponent for RandomOpponent {
    fn poll_move(&mut self, board: &Board) -> Option<Move> {
        let movement = all_legal_moves(board).choose(&mut self.rng).copied();
        debug!(movement = ?movement.map(|movement| movement.to_string()), "random move");
        movement
    }
}
