//! Evaluate command - Play a snapshot against an opponent

use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use crate::{
    adapters::MsgPackSnapshotRepository,
    agent::{Agent, Policy},
    cli::{
        config::rng_from_seed,
        output::{ProgressObserver, format_number, format_share, print_kv, print_section},
    },
    ports::SnapshotRepository,
    q_learning::ValueTable,
    selfplay::{EvaluationSummary, SelfPlaySimulator},
};

#[derive(Parser, Debug)]
#[command(about = "Evaluate a trained agent")]
pub struct EvaluateArgs {
    /// Snapshot of the agent under evaluation
    #[arg(default_value = "agent_data/value_table.msgpack")]
    pub snapshot: PathBuf,

    /// Number of evaluation games
    #[arg(long, short = 'g', default_value_t = 10_000)]
    pub rounds: usize,

    /// Policy of the evaluated agent
    #[arg(long, default_value = "epsilon-greedy:0")]
    pub policy: Policy,

    /// Policy of the opponent
    #[arg(long, short = 'o', default_value = "random")]
    pub opponent: Policy,

    /// Snapshot backing the opponent's policy (none means no table)
    #[arg(long)]
    pub opponent_snapshot: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Export results to a JSON file
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct EvaluationExport {
    agent: String,
    opponent: String,
    summary: EvaluationSummary,
    agent_win_rate: f64,
    opponent_win_rate: f64,
    draw_rate: f64,
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    let repo = MsgPackSnapshotRepository::new();
    let table = repo
        .load(&args.snapshot)
        .with_context(|| format!("failed to load snapshot {}", args.snapshot.display()))?;
    let agent = Agent::new(args.policy, table, 0.0);

    let opponent_table = match &args.opponent_snapshot {
        Some(path) => repo
            .load(path)
            .with_context(|| format!("failed to load opponent snapshot {}", path.display()))?,
        None => ValueTable::new(),
    };
    let opponent = Agent::new(args.opponent, opponent_table, 0.0);

    print_section("Evaluation");
    print_kv("Agent", &format!("{} from {}", args.policy, args.snapshot.display()));
    print_kv("Known states", &format_number(agent.table().state_count()));
    print_kv("Opponent", &args.opponent.to_string());
    print_kv("Rounds", &format_number(args.rounds));
    if let Some(seed) = args.seed {
        print_kv("Seed", &seed.to_string());
    }

    let mut simulator = SelfPlaySimulator::new();
    if !args.no_progress {
        simulator = simulator.with_observer(Box::new(ProgressObserver::new()));
    }
    let mut rng = rng_from_seed(args.seed);
    let summary = simulator
        .evaluate(args.rounds, &agent, &opponent, &mut rng)
        .context("evaluation failed")?;

    print_section("Results");
    print_kv("Agent wins", &format_share(summary.a_wins, summary.rounds));
    print_kv("Opponent wins", &format_share(summary.b_wins, summary.rounds));
    print_kv("Draws", &format_share(summary.draws, summary.rounds));

    if let Some(path) = &args.export {
        let export = EvaluationExport {
            agent: args.policy.to_string(),
            opponent: args.opponent.to_string(),
            summary,
            agent_win_rate: summary.a_win_rate(),
            opponent_win_rate: summary.b_win_rate(),
            draw_rate: summary.draw_rate(),
        };
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(file, &export)?;
        println!("\nResults exported to: {}", path.display());
    }
    Ok(())
}
