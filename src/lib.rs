//! Rules engine and move detection for a chessboard that senses piece
//! occupancy and lights squares up.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod board;
pub mod castling_right;
pub mod color;
pub mod config;
pub mod coord;
pub mod detection;
pub mod driver;
pub mod end_state;
pub mod error;
pub mod fen;
pub mod moves;
pub mod opponent;
pub mod piece;
pub mod rules;
pub mod session;
pub mod square_set;
pub mod zobrist;

#[cfg(test)]
mod fuzz;
