//! Train command - Run training cycles over queued or freshly generated play data

use anyhow::{Context, Result, bail};
use clap::Parser;

use crate::{
    agent::{Agent, Policy},
    app::App,
    cli::{
        config::{SeatArg, ServiceArgs, rng_from_seed},
        output::{create_progress, format_number, print_kv, print_section},
    },
    coordinator::{CycleOutcome, TrainingCoordinator},
    q_learning::ValueTable,
    selfplay::{Seat, SelfPlaySimulator},
};

#[derive(Parser, Debug)]
#[command(about = "Train the value table")]
pub struct TrainArgs {
    #[command(flatten)]
    pub service: ServiceArgs,

    /// Override the number of replay passes per batch
    #[arg(long)]
    pub replay_passes: Option<usize>,

    /// Generate-then-train rounds; 0 trains once on the queue as it is
    #[arg(long, short = 'r', default_value_t = 0)]
    pub rounds: usize,

    /// Self-play episodes per round
    #[arg(long, short = 'e', default_value_t = 1_000)]
    pub episodes: usize,

    /// Seat of the learning agent during self-play
    #[arg(long, value_enum, default_value = "second")]
    pub seat: SeatArg,

    /// Policy of the self-play opponent
    #[arg(long, default_value = "random")]
    pub opponent: Policy,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let mut config = args.service.resolve()?;
    if let Some(passes) = args.replay_passes {
        config.learning.replay_passes = passes;
        config.validate().context("invalid --replay-passes")?;
    }

    print_section("Training");
    print_kv("Snapshot", &config.snapshot_path.display().to_string());
    match &config.queue_path {
        Some(path) => print_kv("Queue", &path.display().to_string()),
        None => print_kv("Queue", "in memory"),
    }
    print_kv("Learning rate", &config.learning.learning_rate.to_string());
    print_kv("Discount", &config.learning.discount_factor.to_string());
    print_kv("Replay passes", &config.learning.replay_passes.to_string());

    let app = App::new(config);
    let coordinator = app.coordinator()?;

    if args.rounds == 0 {
        report_cycle(&coordinator.run_cycle());
    } else {
        self_play_rounds(&app, &coordinator, &args)?;
    }

    let stats = coordinator.stats();
    let live = coordinator.snapshot();
    print_section("Summary");
    print_kv("Generation", &stats.generation.to_string());
    print_kv("States", &format_number(live.table().state_count()));
    print_kv("Entries", &format_number(live.table().entry_count()));
    print_kv("Trained", &format_number(stats.transitions_trained as usize));
    print_kv("Dropped", &format_number(stats.transitions_dropped as usize));

    if stats.snapshot_pending {
        bail!(
            "latest table could not be saved to {}",
            app.config().snapshot_path.display()
        );
    }
    Ok(())
}

fn self_play_rounds(app: &App, coordinator: &TrainingCoordinator, args: &TrainArgs) -> Result<()> {
    let opponent = Agent::new(args.opponent, ValueTable::new(), 0.0);
    let queue = app.queue();
    let mut simulator = SelfPlaySimulator::new();
    let mut rng = rng_from_seed(args.seed);

    let pb = create_progress(args.rounds as u64, "rounds");
    for _ in 0..args.rounds {
        let snapshot = coordinator.snapshot();
        let learner: &Agent = &snapshot;
        let (first, second) = match args.seat.seat() {
            Seat::First => (learner, &opponent),
            Seat::Second => (&opponent, learner),
        };
        simulator
            .generate(
                first,
                second,
                args.episodes,
                args.seat.perspective(),
                queue.as_ref(),
                &mut rng,
            )
            .context("self-play generation failed")?;

        if let CycleOutcome::Promoted { generation, report } = coordinator.run_cycle() {
            pb.set_message(format!(
                "gen {generation}, {} states, {} updates",
                coordinator.snapshot().table().state_count(),
                report.updates
            ));
        }
        pb.inc(1);
    }
    pb.finish();
    Ok(())
}

fn report_cycle(outcome: &CycleOutcome) {
    match outcome {
        CycleOutcome::NoData => println!("\nNo play data queued; nothing to train."),
        CycleOutcome::QueueUnavailable => println!("\nQueue unavailable; nothing trained."),
        CycleOutcome::Discarded(report) => println!(
            "\nAll {} queued transitions were malformed and dropped.",
            report.dropped
        ),
        CycleOutcome::Promoted { report, generation } => println!(
            "\nPromoted generation {generation}: {} transitions, {} updates, {} dropped.",
            report.accepted, report.updates, report.dropped
        ),
    }
}
