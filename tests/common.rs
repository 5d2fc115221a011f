//! Common test utilities for the noughts test suite.

#![allow(dead_code)]

use std::sync::Arc;

use noughts::{
    BoardState, Cell, ServiceConfig, TrainingCoordinator,
    adapters::{InMemoryQueue, InMemorySnapshotRepository},
};

/// Every assignment of the nine cells, 3^9 boards in code order.
///
/// Includes positions that cannot arise in play; the board laws hold for
/// all of them.
pub fn all_boards() -> impl Iterator<Item = BoardState> {
    (0..3u32.pow(9)).map(|mut index| {
        let mut cells = [Cell::Empty; 9];
        for cell in cells.iter_mut().rev() {
            *cell = Cell::from_digit((index % 3) as u8).unwrap();
            index /= 3;
        }
        BoardState::from_cells(cells)
    })
}

/// Parse a nine-character board string such as `"XO-X-----"`
pub fn board(s: &str, agent_is_x: bool) -> BoardState {
    BoardState::from_symbols(&symbols(s), agent_is_x).expect("valid board")
}

pub fn symbols(s: &str) -> Vec<String> {
    s.chars().map(|c| c.to_string()).collect()
}

/// Coordinator over in-memory adapters, returning handles to both
pub fn in_memory_coordinator(
    config: ServiceConfig,
) -> (
    TrainingCoordinator,
    Arc<InMemoryQueue>,
    InMemorySnapshotRepository,
) {
    let queue = Arc::new(InMemoryQueue::new());
    let repo = InMemorySnapshotRepository::new();
    let coordinator = TrainingCoordinator::new(config, queue.clone(), Arc::new(repo.clone()))
        .expect("valid coordinator");
    (coordinator, queue, repo)
}
