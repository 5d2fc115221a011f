//! Command-line interface: data generation, training, evaluation and the
//! line-oriented service loop.

pub mod commands;
pub mod config;
pub mod output;
