//! File-backed play-data queue in JSON-lines format.
//!
//! Producers append one transition per line. Draining renames the file
//! aside before reading it, so pushes that race with a drain land in a
//! fresh file and are picked up by the next drain.

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use log::warn;

use crate::{
    Result,
    error::Error,
    ports::{Drained, PlaydataQueue},
    transition::Transition,
};

#[derive(Debug)]
pub struct JsonlQueue {
    path: PathBuf,
    // Serializes pushes and drains from this process
    guard: Mutex<()>,
}

impl JsonlQueue {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn draining_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".draining");
        self.path.with_file_name(name)
    }

    fn unavailable(operation: &str, path: &Path, e: impl std::fmt::Display) -> Error {
        Error::QueueUnavailable {
            message: format!("failed to {operation} {path:?}: {e}"),
        }
    }

    /// Decode a drained file. Malformed lines are skipped and counted.
    fn read(path: &Path) -> Result<Drained> {
        let contents =
            fs::read_to_string(path).map_err(|e| Self::unavailable("read", path, e))?;

        let mut drained = Drained::default();
        for (line_no, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Transition>(line) {
                Ok(transition) => drained.transitions.push(transition),
                Err(e) => {
                    warn!("skipping malformed line {} in {path:?}: {e}", line_no + 1);
                    drained.malformed += 1;
                }
            }
        }
        Ok(drained)
    }
}

impl PlaydataQueue for JsonlQueue {
    fn push(&self, transition: Transition) -> Result<()> {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Self::unavailable("create", parent, e))?;
        }

        let mut line = serde_json::to_string(&transition)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Self::unavailable("open", &self.path, e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| Self::unavailable("append to", &self.path, e))
    }

    fn drain(&self) -> Result<Drained> {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        let draining = self.draining_path();

        // A leftover from a failed drain is taken alone. The live file is
        // rotated only when no leftover remains.
        if !draining.exists() {
            match fs::rename(&self.path, &draining) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Ok(Drained::default());
                }
                Err(e) => return Err(Self::unavailable("rotate", &self.path, e)),
            }
        }

        let drained = Self::read(&draining)?;
        fs::remove_file(&draining).map_err(|e| Self::unavailable("remove", &draining, e))?;
        Ok(drained)
    }
}
