//! Tic-Tac-Toe board, symmetry group and outcome rules

pub mod board;
pub mod game;
pub mod lines;
pub mod symmetry;

pub use board::{BoardState, Canonical, Cell, EMPTY_SYMBOL, FIRST_SYMBOL, SECOND_SYMBOL};
pub use game::Outcome;
pub use lines::{LineAnalyzer, WINNING_LINES};
pub use symmetry::D4Transform;
