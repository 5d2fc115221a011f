//! Queue port for canonical play data.

use crate::{Result, transition::Transition};

/// Everything taken from a queue in one drain
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Drained {
    /// Decoded transitions in arrival order
    pub transitions: Vec<Transition>,
    /// Stored entries that could not be decoded and were discarded
    pub malformed: usize,
}

impl Drained {
    pub fn new(transitions: Vec<Transition>) -> Self {
        Self {
            transitions,
            malformed: 0,
        }
    }

    /// Nothing was pending, not even malformed entries
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty() && self.malformed == 0
    }
}

/// Buffer of canonical transitions between producers and the trainer.
///
/// Producers push from any thread; the training worker drains everything
/// accumulated since the previous drain.
///
/// # Examples
///
/// ```
/// use noughts::adapters::InMemoryQueue;
/// use noughts::ports::PlaydataQueue;
/// use noughts::transition::Transition;
/// use noughts::types::BoardCode;
///
/// let queue = InMemoryQueue::new();
/// queue.push(Transition {
///     state: BoardCode::EMPTY,
///     action: BoardCode::new(1)?,
///     resultant: BoardCode::new(1)?,
///     reward: 0.0,
/// })?;
/// assert_eq!(queue.drain()?.transitions.len(), 1);
/// assert!(queue.drain()?.is_empty());
/// # Ok::<(), noughts::Error>(())
/// ```
pub trait PlaydataQueue: Send + Sync {
    /// Append one transition.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::QueueUnavailable`] if the backing store
    /// cannot be written.
    fn push(&self, transition: Transition) -> Result<()>;

    /// Remove and return every pending transition in arrival order, with
    /// the number of stored entries that could not be decoded.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::QueueUnavailable`] if the backing store
    /// cannot be read. Nothing is removed in that case.
    fn drain(&self) -> Result<Drained>;
}
