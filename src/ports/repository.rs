//! Repository port for value-table snapshots.

use std::path::Path;

use crate::{Result, q_learning::ValueTable};

/// Port for persisting and loading value-table snapshots.
///
/// # Examples
///
/// ```no_run
/// use noughts::ports::SnapshotRepository;
/// use noughts::q_learning::ValueTable;
/// use std::path::Path;
///
/// fn checkpoint<R: SnapshotRepository>(
///     repo: &R,
///     table: &ValueTable,
///     path: &Path,
/// ) -> noughts::Result<()> {
///     repo.save(table, path)
/// }
/// ```
pub trait SnapshotRepository: Send + Sync {
    /// Save a snapshot, replacing any previous one at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The location cannot be created or written to
    /// - Serialization fails
    fn save(&self, table: &ValueTable, path: &Path) -> Result<()>;

    /// Load the snapshot at `path`. A missing snapshot loads as an empty
    /// table.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot exists but cannot be read, is
    /// corrupted, or carries an unsupported version.
    fn load(&self, path: &Path) -> Result<ValueTable>;
}
