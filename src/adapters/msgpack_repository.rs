//! MessagePack implementation of the snapshot repository.
//!
//! Snapshots are written to a sibling temporary file and renamed into place,
//! so a reader never observes a half-written snapshot.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use log::debug;

use crate::{Result, error::Error, ports::SnapshotRepository, q_learning::ValueTable};

/// MessagePack-based snapshot repository.
///
/// # Examples
///
/// ```no_run
/// use noughts::adapters::MsgPackSnapshotRepository;
/// use noughts::ports::SnapshotRepository;
/// use noughts::q_learning::ValueTable;
/// use std::path::Path;
///
/// let repo = MsgPackSnapshotRepository;
/// repo.save(&ValueTable::new(), Path::new("value_table.msgpack"))?;
/// let loaded = repo.load(Path::new("value_table.msgpack"))?;
/// # Ok::<(), noughts::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackSnapshotRepository;

impl MsgPackSnapshotRepository {
    pub fn new() -> Self {
        Self
    }

    fn temp_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        path.with_file_name(name)
    }
}

impl SnapshotRepository for MsgPackSnapshotRepository {
    fn save(&self, table: &ValueTable, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| Error::Io {
                operation: format!("create directory {parent:?}"),
                source,
            })?;
        }

        let bytes = table.to_bytes()?;
        let temp = Self::temp_path(path);

        let mut file = File::create(&temp).map_err(|source| Error::Io {
            operation: format!("create file {temp:?}"),
            source,
        })?;
        file.write_all(&bytes)
            .and_then(|()| file.sync_all())
            .map_err(|source| Error::Io {
                operation: format!("write snapshot {temp:?}"),
                source,
            })?;

        fs::rename(&temp, path).map_err(|source| Error::Io {
            operation: format!("move snapshot into place at {path:?}"),
            source,
        })?;

        debug!(
            "saved snapshot with {} states to {path:?}",
            table.state_count()
        );
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<ValueTable> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no snapshot at {path:?}, starting empty");
                return Ok(ValueTable::new());
            }
            Err(source) => {
                return Err(Error::Io {
                    operation: format!("read snapshot {path:?}"),
                    source,
                });
            }
        };

        ValueTable::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::types::BoardCode;

    fn sample_table() -> ValueTable {
        let mut table = ValueTable::new();
        table.update(BoardCode::EMPTY, BoardCode::new(1).unwrap(), 0.5);
        table.update(BoardCode::new(2).unwrap(), BoardCode::new(10).unwrap(), -1.0);
        table
    }

    #[test]
    fn test_msgpack_roundtrip() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file_path = temp_dir.path().join("nested").join("value_table.msgpack");

        let repo = MsgPackSnapshotRepository::new();
        let table = sample_table();

        repo.save(&table, &file_path).expect("Failed to save");
        let loaded = repo.load(&file_path).expect("Failed to load");

        assert_eq!(loaded, table);
        assert!(!MsgPackSnapshotRepository::temp_path(&file_path).exists());
    }

    #[test]
    fn test_load_nonexistent_is_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = MsgPackSnapshotRepository::new();
        let loaded = repo
            .load(&temp_dir.path().join("missing.msgpack"))
            .expect("missing snapshot should load");
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_load_corrupted_returns_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file_path = temp_dir.path().join("corrupt.msgpack");
        fs::write(&file_path, b"\xc1\xc1\xc1").unwrap();

        let repo = MsgPackSnapshotRepository::new();
        assert!(repo.load(&file_path).is_err());
    }

    #[test]
    fn test_save_to_invalid_path_returns_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let blocker = temp_dir.path().join("file");
        fs::write(&blocker, b"not a directory").unwrap();

        let repo = MsgPackSnapshotRepository::new();
        let result = repo.save(&sample_table(), &blocker.join("value_table.msgpack"));
        assert!(result.is_err());
    }

    #[test]
    fn test_overwrite_replaces_snapshot() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file_path = temp_dir.path().join("value_table.msgpack");
        let repo = MsgPackSnapshotRepository::new();

        repo.save(&sample_table(), &file_path).unwrap();
        repo.save(&ValueTable::new(), &file_path).unwrap();
        assert!(repo.load(&file_path).unwrap().is_empty());
    }
}
