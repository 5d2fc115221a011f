//! Dependency wiring for the service.
//!
//! The container owns the infrastructure adapters chosen from the config
//! and hands them to the coordinator and to batch tools.

use std::{path::Path, sync::Arc};

use super::config::ServiceConfig;
use crate::{
    Result,
    adapters::{InMemoryQueue, JsonlQueue, MsgPackSnapshotRepository},
    agent::Agent,
    coordinator::TrainingCoordinator,
    ports::{PlaydataQueue, SnapshotRepository},
    q_learning::ValueTable,
};

/// Application with dependency injection.
///
/// # Examples
///
/// ## Production usage
///
/// ```no_run
/// use noughts::app::{App, ServiceConfig};
///
/// let app = App::new(ServiceConfig::default().with_env_overrides());
/// let coordinator = app.coordinator()?;
/// coordinator.start()?;
/// # Ok::<(), noughts::Error>(())
/// ```
///
/// ## Testing with dependency injection
///
/// ```
/// use noughts::adapters::{InMemoryQueue, InMemorySnapshotRepository};
/// use noughts::app::App;
///
/// let app = App::for_testing()
///     .with_queue(InMemoryQueue::new())
///     .with_repository(InMemorySnapshotRepository::new())
///     .build();
/// let coordinator = app.coordinator()?;
/// # Ok::<(), noughts::Error>(())
/// ```
pub struct App {
    config: ServiceConfig,
    queue: Arc<dyn PlaydataQueue>,
    repository: Arc<dyn SnapshotRepository>,
}

impl App {
    /// Create an app with production adapters.
    ///
    /// Uses:
    /// - `JsonlQueue` at `queue_path`, or `InMemoryQueue` when unset
    /// - `MsgPackSnapshotRepository` for snapshots
    pub fn new(config: ServiceConfig) -> Self {
        let queue: Arc<dyn PlaydataQueue> = match &config.queue_path {
            Some(path) => Arc::new(JsonlQueue::new(path)),
            None => Arc::new(InMemoryQueue::new()),
        };
        Self {
            config,
            queue,
            repository: Arc::new(MsgPackSnapshotRepository::new()),
        }
    }

    /// Create a builder for constructing an app with custom dependencies.
    pub fn for_testing() -> AppBuilder {
        AppBuilder::new()
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn queue(&self) -> Arc<dyn PlaydataQueue> {
        Arc::clone(&self.queue)
    }

    pub fn repository(&self) -> Arc<dyn SnapshotRepository> {
        Arc::clone(&self.repository)
    }

    /// Build a coordinator over this app's adapters.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfiguration`] for an invalid config.
    pub fn coordinator(&self) -> Result<TrainingCoordinator> {
        TrainingCoordinator::new(self.config.clone(), self.queue(), self.repository())
    }

    /// Load an agent from a snapshot, using the configured policy.
    ///
    /// A missing snapshot yields an agent with an empty table.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use noughts::app::{App, ServiceConfig};
    /// use std::path::Path;
    ///
    /// let app = App::new(ServiceConfig::default());
    /// let agent = app.load_agent(Path::new("agent_data/value_table.msgpack"))?;
    /// # Ok::<(), noughts::Error>(())
    /// ```
    pub fn load_agent(&self, path: &Path) -> Result<Agent> {
        let table = self.repository.load(path)?;
        Ok(Agent::new(
            self.config.policy,
            table,
            self.config.optimistic_value,
        ))
    }

    /// Save a table through the configured repository
    pub fn save_table(&self, table: &ValueTable, path: &Path) -> Result<()> {
        self.repository.save(table, path)
    }
}

/// Builder for constructing an app with custom dependencies.
///
/// Adapters that are not set fall back to the production choice of
/// [`App::new`].
#[derive(Default)]
pub struct AppBuilder {
    config: Option<ServiceConfig>,
    queue: Option<Arc<dyn PlaydataQueue>>,
    repository: Option<Arc<dyn SnapshotRepository>>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_queue<Q: PlaydataQueue + 'static>(mut self, queue: Q) -> Self {
        self.queue = Some(Arc::new(queue));
        self
    }

    /// Share an existing queue with the app
    pub fn with_shared_queue(mut self, queue: Arc<dyn PlaydataQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn with_repository<R: SnapshotRepository + 'static>(mut self, repo: R) -> Self {
        self.repository = Some(Arc::new(repo));
        self
    }

    pub fn build(self) -> App {
        let defaults = App::new(self.config.unwrap_or_default());
        App {
            queue: self.queue.unwrap_or(defaults.queue),
            repository: self.repository.unwrap_or(defaults.repository),
            config: defaults.config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::InMemorySnapshotRepository, coordinator::CycleOutcome, transition::Transition,
        types::BoardCode,
    };

    #[test]
    fn test_builder_wires_injected_adapters() {
        let queue = Arc::new(InMemoryQueue::new());
        let repo = InMemorySnapshotRepository::new();
        let app = App::for_testing()
            .with_shared_queue(queue.clone())
            .with_repository(repo.clone())
            .build();

        queue
            .push(Transition {
                state: BoardCode::EMPTY,
                action: BoardCode::new(1).unwrap(),
                resultant: BoardCode::new(1).unwrap(),
                reward: 1.0,
            })
            .unwrap();

        let coordinator = app.coordinator().unwrap();
        assert!(matches!(
            coordinator.run_cycle(),
            CycleOutcome::Promoted { generation: 1, .. }
        ));
        assert!(repo.contains(&app.config().snapshot_path));
    }

    #[test]
    fn test_load_agent_uses_configured_policy() {
        let app = App::for_testing()
            .with_config(ServiceConfig::default().with_optimistic_value(0.25))
            .with_repository(InMemorySnapshotRepository::new())
            .build();

        let agent = app.load_agent(Path::new("missing")).unwrap();
        assert!(agent.table().is_empty());
        assert_eq!(agent.optimistic_value(), 0.25);
        assert_eq!(agent.policy(), app.config().policy);
    }
}
