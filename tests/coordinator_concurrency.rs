//! Serving and training at the same time

mod common;

use std::{
    sync::{Arc, Barrier},
    thread,
    time::{Duration, Instant},
};

use common::in_memory_coordinator;
use noughts::{
    BoardState, CycleOutcome, Policy, ServiceConfig, Transition, ports::PlaydataQueue,
    types::BoardCode,
};
use rand::{SeedableRng, rngs::StdRng};

const READERS: usize = 8;
const REQUESTS_PER_READER: usize = 500;

fn greedy_config() -> ServiceConfig {
    ServiceConfig::default()
        .with_policy(Policy::EpsilonGreedy { epsilon: 0.0 })
        .with_optimistic_value(0.0)
}

/// Makes the corner in canonical space (cell 8) the unique best opening
fn corner_transition() -> Transition {
    Transition {
        state: BoardCode::EMPTY,
        action: BoardCode::new(1).unwrap(),
        resultant: BoardCode::new(1).unwrap(),
        reward: 1.0,
    }
}

#[test]
fn test_every_answer_comes_from_one_generation() {
    let (coordinator, queue, _) = in_memory_coordinator(greedy_config());
    let coordinator = Arc::new(coordinator);
    let empty = BoardState::new();

    let before = coordinator.snapshot();
    let pre_answer = before
        .act(&empty, &mut StdRng::seed_from_u64(0))
        .unwrap()
        .action_position();
    assert_eq!(pre_answer, Some(0));

    queue.push(corner_transition()).unwrap();
    let barrier = Arc::new(Barrier::new(READERS + 1));

    let readers: Vec<_> = (0..READERS)
        .map(|seed| {
            let coordinator = Arc::clone(&coordinator);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(seed as u64);
                barrier.wait();
                (0..REQUESTS_PER_READER)
                    .map(|_| {
                        coordinator
                            .act_with_rng(&empty, &mut rng)
                            .unwrap()
                            .action_position()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    barrier.wait();
    let outcome = coordinator.run_cycle();
    assert!(matches!(outcome, CycleOutcome::Promoted { generation: 1, .. }));

    let after = coordinator.snapshot();
    let post_answer = after
        .act(&empty, &mut StdRng::seed_from_u64(0))
        .unwrap()
        .action_position();
    assert_eq!(post_answer, Some(8));

    for reader in readers {
        let answers = reader.join().unwrap();
        assert_eq!(answers.len(), REQUESTS_PER_READER);
        assert!(
            answers
                .iter()
                .all(|answer| *answer == pre_answer || *answer == post_answer)
        );
        // Once a reader sees the new agent it never sees the old one again
        let switched = answers
            .iter()
            .position(|answer| *answer == post_answer)
            .unwrap_or(answers.len());
        assert!(answers[switched..].iter().all(|answer| *answer == post_answer));
    }

    // The snapshot captured before promotion is untouched
    assert_eq!(before.generation, 0);
    assert!(before.table().is_empty());
}

#[test]
fn test_background_worker_promotes_while_serving() {
    let config = greedy_config().with_training_interval_secs(1);
    let (coordinator, queue, repo) = in_memory_coordinator(config);
    coordinator.start().unwrap();
    assert!(coordinator.is_running());

    queue.push(corner_transition()).unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    while coordinator.snapshot().generation == 0 {
        assert!(Instant::now() < deadline, "worker never promoted");
        coordinator.act(&BoardState::new()).unwrap();
        thread::sleep(Duration::from_millis(20));
    }

    coordinator.shutdown();
    assert!(!coordinator.is_running());
    assert_eq!(coordinator.stats().promotions, 1);
    assert_eq!(repo.save_count(), 1);
}
