//! Shared argument groups and config resolution for CLI commands

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    app::ServiceConfig,
    selfplay::{Perspective, Seat},
};

/// Options that locate and adjust the service configuration
#[derive(Args, Debug, Clone, Default)]
pub struct ServiceArgs {
    /// JSON config file (defaults apply to anything it omits)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Value-table snapshot to load and save
    #[arg(long, short = 's')]
    pub snapshot: Option<PathBuf>,

    /// JSON-lines play-data queue
    #[arg(long, short = 'q')]
    pub queue: Option<PathBuf>,
}

impl ServiceArgs {
    /// Config file, then environment, then command-line flags
    pub fn resolve(&self) -> Result<ServiceConfig> {
        let config = match &self.config {
            Some(path) => ServiceConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => ServiceConfig::default(),
        };
        let mut config = config.with_env_overrides();

        if let Some(snapshot) = &self.snapshot {
            config = config.with_snapshot_path(snapshot);
        }
        if let Some(queue) = &self.queue {
            config = config.with_queue_path(queue);
        }
        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

/// Seat taken by the learning agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeatArg {
    First,
    Second,
}

impl SeatArg {
    pub fn seat(self) -> Seat {
        match self {
            SeatArg::First => Seat::First,
            SeatArg::Second => Seat::Second,
        }
    }

    pub fn perspective(self) -> Perspective {
        match self {
            SeatArg::First => Perspective::First,
            SeatArg::Second => Perspective::Second,
        }
    }
}

/// Seeded RNG when a seed is given, OS entropy otherwise
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let args = ServiceArgs {
            config: None,
            snapshot: Some(PathBuf::from("snap.msgpack")),
            queue: Some(PathBuf::from("queue.jsonl")),
        };
        let config = args.resolve().unwrap();
        assert_eq!(config.snapshot_path, PathBuf::from("snap.msgpack"));
        assert_eq!(config.queue_path, Some(PathBuf::from("queue.jsonl")));
    }

    #[test]
    fn test_missing_config_file_fails() {
        let args = ServiceArgs {
            config: Some(PathBuf::from("/nonexistent/noughts.json")),
            ..ServiceArgs::default()
        };
        assert!(args.resolve().is_err());
    }
}
