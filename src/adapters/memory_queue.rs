//! In-process play-data queue.

use std::{
    collections::VecDeque,
    sync::{Mutex, PoisonError},
};

use crate::{
    Result,
    ports::{Drained, PlaydataQueue},
    transition::Transition,
};

/// FIFO queue held in memory, shared by reference between producers and
/// the coordinator.
#[derive(Debug, Default)]
pub struct InMemoryQueue {
    pending: Mutex<VecDeque<Transition>>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of transitions waiting to be drained
    pub fn len(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PlaydataQueue for InMemoryQueue {
    fn push(&self, transition: Transition) -> Result<()> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(transition);
        Ok(())
    }

    fn drain(&self) -> Result<Drained> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(Drained::new(pending.drain(..).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoardCode;

    fn transition(reward: f64) -> Transition {
        Transition {
            state: BoardCode::EMPTY,
            action: BoardCode::new(1).unwrap(),
            resultant: BoardCode::new(1).unwrap(),
            reward,
        }
    }

    #[test]
    fn test_drain_preserves_order_and_empties() {
        let queue = InMemoryQueue::new();
        queue.push(transition(1.0)).unwrap();
        queue.push(transition(2.0)).unwrap();
        assert_eq!(queue.len(), 2);

        let drained = queue.drain().unwrap();
        assert_eq!(drained.malformed, 0);
        assert_eq!(
            drained
                .transitions
                .iter().map(|t| t.reward).collect::<Vec<_>>(),
            vec![1.0, 2.0]
        );
        assert!(queue.is_empty());
        assert!(queue.drain().unwrap().is_empty());
    }
}
