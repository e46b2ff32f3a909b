#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]

use std::{io::stderr, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use sensorboard::{
    color::Color,
    config::{OpponentKind, SessionConfig},
    moves::Move,
    opponent::{Opponent, QueuedOpponent, RandomOpponent},
    session::GameSession,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod board_display;
mod misc;
mod repl;

/// Sensor chessboard simulator. Pieces are lifted and placed by typing
/// squares; the board lights up the way the physical one would.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Session configuration file in TOML
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Starting position
    #[arg(long)]
    fen: Option<String>,
    /// Side played by the opponent
    #[arg(long)]
    remote: Option<Color>,
    /// Seed of the random opponent
    #[arg(long)]
    seed: Option<u64>,
    /// Moves played in order by the opponent, separated by commas
    #[arg(long, value_delimiter = ',')]
    moves: Vec<Move>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("cannot load {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if args.remote.is_some() {
        config.remote_color = args.remote;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if !args.moves.is_empty() {
        config.opponent = OpponentKind::Queued;
    }
    info!(?config, "starting session");

    let mut session = GameSession::new(config);
    if let Some(fen) = &args.fen {
        session.load_fen(fen).context("cannot load starting position")?;
    }
    if let Some(color) = config.remote_color {
        let opponent: Box<dyn Opponent> = match config.opponent {
            OpponentKind::Random => Box::new(
                config
                    .seed
                    .map_or_else(RandomOpponent::new, RandomOpponent::from_seed),
            ),
            OpponentKind::Queued => {
                let mut opponent = QueuedOpponent::new();
                for movement in args.moves {
                    opponent.push(movement);
                }
                Box::new(opponent)
            }
        };
        session.set_opponent(color, opponent);
    }
    repl::repl(session)?;
    Ok(())
}
