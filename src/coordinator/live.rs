//! Hot-swappable shared model.
//!
//! Readers take a cheap `Arc` snapshot and never hold a lock while using
//! it. A writer swaps the `Arc` in place. Once a writer has announced
//! itself, new readers wait until the swap is done, so a steady stream of
//! readers cannot starve promotion.

use std::{
    ops::Deref,
    sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, RwLock},
};

/// A consistent view of the model at one generation
#[derive(Debug)]
pub struct Snapshot<T> {
    /// Starts at 0 and increases by one per replacement
    pub generation: u64,
    pub value: Arc<T>,
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            generation: self.generation,
            value: Arc::clone(&self.value),
        }
    }
}

impl<T> Deref for Snapshot<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

#[derive(Debug)]
struct Slot<T> {
    generation: u64,
    value: Arc<T>,
}

/// Writer-preferring slot holding the current model
#[derive(Debug)]
pub struct LiveModel<T> {
    slot: RwLock<Slot<T>>,
    // Number of writers queued or swapping
    writers: Mutex<usize>,
    writers_done: Condvar,
}

impl<T> LiveModel<T> {
    pub fn new(value: Arc<T>) -> Self {
        Self {
            slot: RwLock::new(Slot {
                generation: 0,
                value,
            }),
            writers: Mutex::new(0),
            writers_done: Condvar::new(),
        }
    }

    fn writers(&self) -> MutexGuard<'_, usize> {
        self.writers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current model. Blocks only while a writer is queued or swapping.
    pub fn snapshot(&self) -> Snapshot<T> {
        let mut writers = self.writers();
        while *writers > 0 {
            writers = self
                .writers_done
                .wait(writers)
                .unwrap_or_else(PoisonError::into_inner);
        }
        drop(writers);

        // Readers share the read lock. A writer that queued after the gate
        // was released is waited for here.
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        Snapshot {
            generation: slot.generation,
            value: Arc::clone(&slot.value),
        }
    }

    /// Swap in a new model and return its generation. Snapshots taken
    /// earlier keep the previous model.
    pub fn replace(&self, value: Arc<T>) -> u64 {
        *self.writers() += 1;

        let generation = {
            let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
            slot.generation += 1;
            slot.value = value;
            slot.generation
        };

        let mut writers = self.writers();
        *writers -= 1;
        if *writers == 0 {
            self.writers_done.notify_all();
        }
        generation
    }

    pub fn generation(&self) -> u64 {
        self.snapshot().generation
    }
}
