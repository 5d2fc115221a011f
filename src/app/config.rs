//! Service configuration.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{Error, Result, agent::Policy, q_learning::LearningConfig};

/// Environment variable overriding [`ServiceConfig::snapshot_path`]
pub const SNAPSHOT_PATH_ENV: &str = "NOUGHTS_SNAPSHOT_PATH";
/// Environment variable overriding [`ServiceConfig::queue_path`]
pub const QUEUE_PATH_ENV: &str = "NOUGHTS_QUEUE_PATH";
/// Environment variable that disables the training worker when truthy
pub const TRAINING_DISABLE_ENV: &str = "NOUGHTS_TRAINING_DISABLE";

/// Configuration of the serving and training service.
///
/// Every field has a default, so a JSON config file only needs the fields
/// it changes.
///
/// # Examples
///
/// ```
/// use noughts::agent::Policy;
/// use noughts::app::ServiceConfig;
///
/// let config = ServiceConfig::default()
///     .with_policy(Policy::Softmax { temperature: 0.5 })
///     .with_training_interval_secs(30)
///     .with_snapshot_path("trained/value_table.msgpack");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Action-selection policy of the live agent
    pub policy: Policy,
    /// Value the policy assumes for actions the table has never seen
    pub optimistic_value: f64,
    /// Q-learning hyperparameters
    pub learning: LearningConfig,
    /// Seconds between training cycles
    pub training_interval_secs: u64,
    /// Whether the periodic training worker runs at all
    pub training_enabled: bool,
    /// Where the value-table snapshot is loaded from and saved to
    pub snapshot_path: PathBuf,
    /// JSON-lines play-data queue; `None` keeps the queue in memory
    pub queue_path: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            policy: Policy::default(),
            optimistic_value: 1.0,
            learning: LearningConfig::default(),
            training_interval_secs: 10,
            training_enabled: true,
            snapshot_path: PathBuf::from("agent_data/value_table.msgpack"),
            queue_path: None,
        }
    }
}

impl ServiceConfig {
    /// Read a JSON config file and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, a serialization
    /// error for malformed JSON, or [`Error::InvalidConfiguration`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| Error::Io {
            operation: format!("read config {path:?}"),
            source,
        })?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(SNAPSHOT_PATH_ENV).filter(|v| !v.is_empty()) {
            self.snapshot_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(QUEUE_PATH_ENV).filter(|v| !v.is_empty()) {
            self.queue_path = Some(PathBuf::from(path));
        }
        if let Some(flag) = lookup(TRAINING_DISABLE_ENV) {
            if matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            ) {
                self.training_enabled = false;
            }
        }
        self
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_optimistic_value(mut self, value: f64) -> Self {
        self.optimistic_value = value;
        self
    }

    pub fn with_learning(mut self, learning: LearningConfig) -> Self {
        self.learning = learning;
        self
    }

    pub fn with_training_interval_secs(mut self, secs: u64) -> Self {
        self.training_interval_secs = secs;
        self
    }

    pub fn with_training_enabled(mut self, enabled: bool) -> Self {
        self.training_enabled = enabled;
        self
    }

    pub fn with_snapshot_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.snapshot_path = path.into();
        self
    }

    pub fn with_queue_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.queue_path = Some(path.into());
        self
    }

    pub fn training_interval(&self) -> Duration {
        Duration::from_secs(self.training_interval_secs)
    }

    /// Check every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        self.policy.validate()?;
        self.learning.validate()?;
        if !self.optimistic_value.is_finite() {
            return Err(Error::InvalidConfiguration {
                message: format!("optimistic value {} must be finite", self.optimistic_value),
            });
        }
        if self.training_interval_secs == 0 {
            return Err(Error::InvalidConfiguration {
                message: "training interval must be at least one second".to_string(),
            });
        }
        if self.snapshot_path.as_os_str().is_empty() {
            return Err(Error::InvalidConfiguration {
                message: "snapshot path must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.policy, Policy::EpsilonGreedy { epsilon: 0.1 });
        assert_eq!(config.optimistic_value, 1.0);
        assert_eq!(config.learning.learning_rate, 0.5);
        assert_eq!(config.learning.discount_factor, 0.9);
        assert_eq!(config.training_interval(), Duration::from_secs(10));
        assert!(config.training_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: ServiceConfig = serde_json::from_str(
            r#"{"policy":{"kind":"softmax","temperature":0.25},"learning":{"replay_passes":3}}"#,
        )
        .unwrap();
        assert_eq!(config.policy, Policy::Softmax { temperature: 0.25 });
        assert_eq!(config.learning.replay_passes, 3);
        assert_eq!(config.learning.learning_rate, 0.5);
        assert_eq!(config.training_interval_secs, 10);
    }

    #[test]
    fn test_load_validates() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("config.json");

        fs::write(&path, r#"{"training_interval_secs":0}"#).unwrap();
        assert!(matches!(
            ServiceConfig::load(&path),
            Err(Error::InvalidConfiguration { .. })
        ));

        fs::write(&path, r#"{"training_interval_secs":2}"#).unwrap();
        assert_eq!(ServiceConfig::load(&path).unwrap().training_interval_secs, 2);

        assert!(matches!(
            ServiceConfig::load(temp_dir.path().join("missing.json")),
            Err(Error::Io { .. })
        ));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (SNAPSHOT_PATH_ENV, "/data/table.msgpack"),
            (TRAINING_DISABLE_ENV, "True"),
        ]);
        let config = ServiceConfig::default()
            .with_overrides_from(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.snapshot_path, PathBuf::from("/data/table.msgpack"));
        assert!(!config.training_enabled);
        assert_eq!(config.queue_path, None);

        let config = ServiceConfig::default()
            .with_overrides_from(|name| (name == TRAINING_DISABLE_ENV).then(|| "0".to_string()));
        assert!(config.training_enabled);
    }

    #[test]
    fn test_rejects_invalid_policy() {
        let config = ServiceConfig::default().with_policy(Policy::EpsilonGreedy { epsilon: 2.0 });
        assert!(config.validate().is_err());
    }
}
