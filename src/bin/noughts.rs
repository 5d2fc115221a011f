//! noughts CLI - Self-play Tic-Tac-Toe Q-learning
//!
//! Subcommands cover the whole loop:
//! - Generating self-play data into a queue
//! - Training the value table from queued or fresh data
//! - Evaluating a snapshot against an opponent
//! - Serving inference with background retraining

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "noughts")]
#[command(version, about = "Self-play Tic-Tac-Toe with a Q-learning agent", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate self-play data into a play-data queue
    Generate(noughts::cli::commands::generate::GenerateArgs),

    /// Train the value table from play data
    Train(noughts::cli::commands::train::TrainArgs),

    /// Evaluate a trained agent against an opponent
    Evaluate(noughts::cli::commands::evaluate::EvaluateArgs),

    /// Serve inference and collect play data over stdin/stdout
    Serve(noughts::cli::commands::serve::ServeArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => noughts::cli::commands::generate::execute(args),
        Commands::Train(args) => noughts::cli::commands::train::execute(args),
        Commands::Evaluate(args) => noughts::cli::commands::evaluate::execute(args),
        Commands::Serve(args) => noughts::cli::commands::serve::execute(args),
    }
}
