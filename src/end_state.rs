use std::fmt::{self, Display, Formatter};

use crate::color::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawReason {
    Stalemate,
    FiftyMoveRule,
    ThreefoldRepetition,
    InsufficientMaterial,
    Agreement,
}
impl Display for DrawReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DrawReason::Stalemate => write!(f, "stalemate")?,
            DrawReason::FiftyMoveRule => write!(f, "fifty-move rule")?,
            DrawReason::ThreefoldRepetition => write!(f, "threefold repetition")?,
            DrawReason::InsufficientMaterial => write!(f, "insufficient material")?,
            DrawReason::Agreement => write!(f, "agreement")?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndState {
    Checkmate { winner: Color },
    Resignation { winner: Color },
    Draw(DrawReason),
}
impl EndState {
    pub fn winner(self) -> Option<Color> {
        match self {
            EndState::Checkmate { winner } | EndState::Resignation { winner } => Some(winner),
            EndState::Draw(_) => None,
        }
    }
}
impl Display for EndState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            EndState::Checkmate { winner } => write!(f, "checkmate, {winner} wins")?,
            EndState::Resignation { winner } => {
                write!(f, "{} resigns, {winner} wins", !*winner)?;
            }
            EndState::Draw(reason) => write!(f, "draw by {reason}")?,
        }
        Ok(())
    }
}
