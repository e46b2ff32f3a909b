use thiserror::Error;

use crate::{end_state::EndState, fen::ParseFenError, moves::Move, moves::ParseMoveError};

/// Reasons a session mutation is refused. A refused mutation leaves the
/// session untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("{0} is not a legal move")]
    IllegalMove(Move),
    #[error("game is over: {0}")]
    GameOver(EndState),
    #[error("a move is still being completed on the board")]
    FollowThroughPending,
    #[error("invalid fen: {0}")]
    Fen(#[from] ParseFenError),
    #[error("invalid move: {0}")]
    Notation(#[from] ParseMoveError),
}
