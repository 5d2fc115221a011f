//! Generate command - Self-play data into a JSON-lines queue

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    adapters::{JsonlQueue, MsgPackSnapshotRepository},
    agent::{Agent, Policy},
    cli::{
        config::{SeatArg, rng_from_seed},
        output::{ProgressObserver, format_number, print_kv, print_section},
    },
    ports::SnapshotRepository,
    q_learning::ValueTable,
    selfplay::{Perspective, Seat, SelfPlaySimulator},
};

#[derive(Parser, Debug)]
#[command(about = "Generate self-play data")]
pub struct GenerateArgs {
    /// Queue file to append transitions to
    #[arg(long, short = 'q', default_value = "agent_data/playdata.jsonl")]
    pub queue: PathBuf,

    /// Snapshot of the learning agent (a missing file means untrained)
    #[arg(long, short = 's', default_value = "agent_data/value_table.msgpack")]
    pub snapshot: PathBuf,

    /// Number of episodes to play
    #[arg(long, short = 'e', default_value_t = 10_000)]
    pub episodes: usize,

    /// Policy of the learning agent (random, epsilon-greedy:<ε>, softmax:<T>)
    #[arg(long, default_value = "epsilon-greedy:0.1")]
    pub policy: Policy,

    /// Value assumed for unseen actions
    #[arg(long, default_value_t = 1.0)]
    pub optimistic_value: f64,

    /// Policy of the opponent, which plays without a table
    #[arg(long, default_value = "random")]
    pub opponent: Policy,

    /// Seat of the learning agent
    #[arg(long, value_enum, default_value = "second")]
    pub seat: SeatArg,

    /// Record the opponent's moves as well
    #[arg(long)]
    pub both: bool,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

pub fn execute(args: GenerateArgs) -> Result<()> {
    let table = MsgPackSnapshotRepository::new()
        .load(&args.snapshot)
        .with_context(|| format!("failed to load snapshot {}", args.snapshot.display()))?;
    let learner = Agent::new(args.policy, table, args.optimistic_value);
    let opponent = Agent::new(args.opponent, ValueTable::new(), 0.0);

    let (first, second) = match args.seat.seat() {
        Seat::First => (&learner, &opponent),
        Seat::Second => (&opponent, &learner),
    };
    let perspective = if args.both {
        Perspective::Both
    } else {
        args.seat.perspective()
    };

    print_section("Self-play generation");
    print_kv("Learner", &format!("{} ({:?} seat)", args.policy, args.seat));
    print_kv("Opponent", &args.opponent.to_string());
    print_kv("Known states", &format_number(learner.table().state_count()));
    print_kv("Episodes", &format_number(args.episodes));
    print_kv("Queue", &args.queue.display().to_string());

    let queue = JsonlQueue::new(&args.queue);
    let mut simulator = SelfPlaySimulator::new();
    if !args.no_progress {
        simulator = simulator.with_observer(Box::new(ProgressObserver::new()));
    }

    let mut rng = rng_from_seed(args.seed);
    let report = simulator
        .generate(first, second, args.episodes, perspective, &queue, &mut rng)
        .context("self-play generation failed")?;

    print_section("Generated");
    print_kv("Transitions", &format_number(report.transitions));
    print_kv("First seat wins", &format_number(report.first_wins));
    print_kv("Second seat wins", &format_number(report.second_wins));
    print_kv("Draws", &format_number(report.draws));
    Ok(())
}
