//! In-memory snapshot repository for testing.
//!
//! Stores encoded snapshots in a shared map keyed by path, and can be told
//! to fail saves so persistence-failure handling can be exercised without
//! touching the file system.

use std::{
    collections::HashMap,
    path::Path,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use crate::{Result, error::Error, ports::SnapshotRepository, q_learning::ValueTable};

/// In-memory repository for testing.
///
/// # Examples
///
/// ```
/// use noughts::adapters::InMemorySnapshotRepository;
/// use noughts::ports::SnapshotRepository;
/// use noughts::q_learning::ValueTable;
/// use std::path::Path;
///
/// let repo = InMemorySnapshotRepository::new();
/// repo.save(&ValueTable::new(), Path::new("snapshot"))?;
/// assert!(repo.contains(Path::new("snapshot")));
/// # Ok::<(), noughts::Error>(())
/// ```
///
/// All clones share the same storage and failure switch.
#[derive(Clone, Default)]
pub struct InMemorySnapshotRepository {
    storage: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    fail_saves: Arc<AtomicBool>,
    saves: Arc<AtomicUsize>,
}

impl InMemorySnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent saves fail (or succeed again).
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.storage
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&Self::key(path))
    }

    /// Raw snapshot bytes stored under `path`
    pub fn bytes(&self, path: &Path) -> Option<Vec<u8>> {
        self.storage
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&Self::key(path))
            .cloned()
    }

    fn key(path: &Path) -> String {
        path.to_string_lossy().to_string()
    }
}

impl SnapshotRepository for InMemorySnapshotRepository {
    fn save(&self, table: &ValueTable, path: &Path) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(Error::Io {
                operation: format!("save snapshot to in-memory storage at {path:?}"),
                source: std::io::Error::other("saves are configured to fail"),
            });
        }

        let bytes = table.to_bytes()?;
        self.storage
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(Self::key(path), bytes);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<ValueTable> {
        match self.bytes(path) {
            Some(bytes) => ValueTable::from_bytes(&bytes),
            None => Ok(ValueTable::new()),
        }
    }
}
