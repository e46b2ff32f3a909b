use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{color::Color, piece::PieceKind};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration: {0}")]
    Io(#[from] io::Error),
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("a pawn cannot promote into a {0}")]
    InvalidPromotion(PieceKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpponentKind {
    #[default]
    Random,
    Queued,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Piece a pawn becomes when it reaches the last rank on the board.
    pub promotion: PieceKind,
    pub fifty_move_rule: bool,
    pub threefold_repetition: bool,
    pub insufficient_material: bool,
    /// Side played by the opponent instead of at the board.
    pub remote_color: Option<Color>,
    pub opponent: OpponentKind,
    pub seed: Option<u64>,
}
impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            promotion: PieceKind::Queen,
            fifty_move_rule: true,
            threefold_repetition: true,
            insufficient_material: true,
            remote_color: None,
            opponent: OpponentKind::Random,
            seed: None,
        }
    }
}
impl SessionConfig {
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = toml::from_str(src)?;
        if !config.promotion.is_promotion_choice() {
            return Err(ConfigError::InvalidPromotion(config.promotion));
        }
        Ok(config)
    }
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        SessionConfig::from_toml_str(&fs::read_to_string(path)?)
    }
}
