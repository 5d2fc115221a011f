//! Self-play Tic-Tac-Toe with a tabular Q-learning agent
//!
//! This crate provides:
//! - Board representation with D4 symmetry canonicalization
//! - A value table trained by off-policy Q-learning
//! - Random, ε-greedy and softmax action selection
//! - Self-play episode generation and evaluation
//! - A training coordinator that serves inference while periodically
//!   retraining and hot-swapping the live agent

pub mod adapters;
pub mod agent;
pub mod app;
pub mod cli;
pub mod coordinator;
pub mod error;
pub mod inference;
pub mod ports;
pub mod q_learning;
pub mod selfplay;
pub mod tictactoe;
pub mod transition;
pub mod types;

pub use agent::{Agent, Policy};
pub use app::{App, ServiceConfig};
pub use coordinator::{CycleOutcome, Phase, TrainingCoordinator};
pub use error::{Error, Result};
pub use q_learning::{LearningConfig, QLearner, ValueTable};
pub use tictactoe::{BoardState, Canonical, Cell, D4Transform, Outcome};
pub use transition::{RawTransition, Transition};
pub use types::BoardCode;
