//! Batched Connect-4 against a scripted opponent.
//!
//! Each agent plays its own game. The opponent answers every legal move
//! immediately, so one `step` is one full turn.

mod env;
mod game;

pub use env::{Connect4, Connect4Config};
pub use game::{opponent_move, Board, Piece, COLS, ROWS};
