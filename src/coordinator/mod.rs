//! Serving and periodic retraining around one live agent.
//!
//! Inference reads the live agent through [`LiveModel`]. A training cycle
//! copies the live table, trains the copy on everything drained from the
//! play-data queue, and swaps the result in. Persistence happens after the
//! swap and never rolls it back.
//!
//! ```
//! use std::sync::Arc;
//!
//! use noughts::adapters::{InMemoryQueue, InMemorySnapshotRepository};
//! use noughts::app::ServiceConfig;
//! use noughts::coordinator::{CycleOutcome, TrainingCoordinator};
//!
//! let coordinator = TrainingCoordinator::new(
//!     ServiceConfig::default(),
//!     Arc::new(InMemoryQueue::new()),
//!     Arc::new(InMemorySnapshotRepository::new()),
//! )?;
//! assert_eq!(coordinator.run_cycle(), CycleOutcome::NoData);
//! # Ok::<(), noughts::Error>(())
//! ```

pub mod live;

use std::{
    fmt,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        mpsc::{self, RecvTimeoutError},
    },
    thread::{self, JoinHandle},
};

use log::{debug, error, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub use live::{LiveModel, Snapshot};

use crate::{
    Error, Result,
    agent::Agent,
    app::ServiceConfig,
    inference::{ActionRequest, ActionResponse, PlaydataSubmission},
    ports::{PlaydataQueue, SnapshotRepository},
    q_learning::{QLearner, TrainingReport, ValueTable},
    tictactoe::BoardState,
    transition::RawTransition,
};

/// Where the coordinator is in its training cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    TrainingInProgress,
    Promoting,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::TrainingInProgress => "training_in_progress",
            Phase::Promoting => "promoting",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a call to [`TrainingCoordinator::run_cycle`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The queue was empty; the live agent is unchanged
    NoData,
    /// The queue could not be drained; retried next period
    QueueUnavailable,
    /// Every drained transition was malformed; nothing was promoted
    Discarded(TrainingReport),
    /// A retrained agent is live at `generation`
    Promoted {
        report: TrainingReport,
        generation: u64,
    },
}

/// Running counters since construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorStats {
    pub cycles: u64,
    pub promotions: u64,
    pub generation: u64,
    pub transitions_trained: u64,
    pub transitions_dropped: u64,
    pub queue_failures: u64,
    pub persistence_failures: u64,
    /// The last promoted table has not been saved yet
    pub snapshot_pending: bool,
}

#[derive(Debug)]
struct Status {
    phase: Phase,
    stats: CoordinatorStats,
}

struct Inner {
    config: ServiceConfig,
    live: LiveModel<Agent>,
    queue: Arc<dyn PlaydataQueue>,
    repository: Arc<dyn SnapshotRepository>,
    learner: QLearner,
    // One cycle at a time, whether from the worker or a direct call
    cycle: Mutex<()>,
    status: Mutex<Status>,
}

struct Worker {
    stop: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

/// Owns the live agent, the play-data queue and the training worker
pub struct TrainingCoordinator {
    inner: Arc<Inner>,
    worker: Mutex<Option<Worker>>,
}

impl TrainingCoordinator {
    /// Build a coordinator, loading the snapshot at the configured path.
    ///
    /// A snapshot that cannot be loaded is logged and replaced by an empty
    /// table, so a corrupted file never keeps the service down.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] for an invalid config.
    pub fn new(
        config: ServiceConfig,
        queue: Arc<dyn PlaydataQueue>,
        repository: Arc<dyn SnapshotRepository>,
    ) -> Result<Self> {
        config.validate()?;

        let table = match repository.load(&config.snapshot_path) {
            Ok(table) => {
                info!(
                    "loaded snapshot {:?} with {} states",
                    config.snapshot_path,
                    table.state_count()
                );
                table
            }
            Err(e) => {
                warn!(
                    "could not load snapshot {:?}, starting empty: {e}",
                    config.snapshot_path
                );
                ValueTable::new()
            }
        };

        let agent = Agent::new(config.policy, table, config.optimistic_value);
        let inner = Inner {
            learner: QLearner::new(config.learning),
            live: LiveModel::new(Arc::new(agent)),
            config,
            queue,
            repository,
            cycle: Mutex::new(()),
            status: Mutex::new(Status {
                phase: Phase::Idle,
                stats: CoordinatorStats::default(),
            }),
        };

        Ok(Self {
            inner: Arc::new(inner),
            worker: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.inner.config
    }

    /// The live agent and its generation
    pub fn snapshot(&self) -> Snapshot<Agent> {
        self.inner.live.snapshot()
    }

    /// Choose an action for a board in the agent's perspective
    pub fn act(&self, board: &BoardState) -> Result<BoardState> {
        self.act_with_rng(board, &mut rand::rng())
    }

    pub fn act_with_rng<R: Rng>(&self, board: &BoardState, rng: &mut R) -> Result<BoardState> {
        self.snapshot().act(board, rng)
    }

    /// Answer an inference request
    pub fn respond(&self, request: &ActionRequest) -> Result<ActionResponse> {
        self.respond_with_rng(request, &mut rand::rng())
    }

    pub fn respond_with_rng<R: Rng>(
        &self,
        request: &ActionRequest,
        rng: &mut R,
    ) -> Result<ActionResponse> {
        self.snapshot().respond(request, rng)
    }

    /// Canonicalize a raw sample and queue it for the next cycle.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unplayable sample, or
    /// [`Error::QueueUnavailable`].
    pub fn ingest(&self, raw: RawTransition) -> Result<()> {
        self.inner.queue.push(raw.canonicalize()?)
    }

    /// Validate a boundary submission and queue it
    pub fn submit(&self, submission: PlaydataSubmission) -> Result<()> {
        let transition = submission.into_transition()?;
        debug!(
            "queued submission {} -> {} (reward {})",
            transition.state, transition.action, transition.reward
        );
        self.inner.queue.push(transition)
    }

    /// Run one training cycle now
    pub fn run_cycle(&self) -> CycleOutcome {
        self.inner.run_cycle()
    }

    pub fn phase(&self) -> Phase {
        self.inner.status().phase
    }

    pub fn stats(&self) -> CoordinatorStats {
        self.inner.status().stats
    }

    /// Spawn the periodic training worker. Does nothing when training is
    /// disabled or the worker is already running.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the thread cannot be spawned.
    pub fn start(&self) -> Result<()> {
        if !self.inner.config.training_enabled {
            info!("training disabled, serving the loaded agent only");
            return Ok(());
        }

        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if worker.is_some() {
            return Ok(());
        }

        let (stop, stopped) = mpsc::channel::<()>();
        let inner = Arc::clone(&self.inner);
        let interval = inner.config.training_interval();
        let handle = thread::Builder::new()
            .name("noughts-trainer".to_string())
            .spawn(move || {
                info!("training worker started (every {interval:?})");
                loop {
                    match stopped.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            inner.run_cycle();
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                info!("training worker stopped");
            })
            .map_err(|source| Error::Io {
                operation: "spawn training worker".to_string(),
                source,
            })?;

        *worker = Some(Worker { stop, handle });
        Ok(())
    }

    /// Stop the worker and wait for it. An in-flight cycle finishes first.
    pub fn shutdown(&self) {
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(Worker { stop, handle }) = worker {
            // The worker may already have exited; a closed channel is fine
            let _ = stop.send(());
            if handle.join().is_err() {
                error!("training worker panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl Drop for TrainingCoordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Inner {
    fn status(&self) -> MutexGuard<'_, Status> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_phase(&self, phase: Phase) {
        self.status().phase = phase;
    }

    fn run_cycle(&self) -> CycleOutcome {
        let _cycle = self.cycle.lock().unwrap_or_else(PoisonError::into_inner);
        self.set_phase(Phase::TrainingInProgress);
        self.status().stats.cycles += 1;

        let outcome = self.train_and_promote();

        self.set_phase(Phase::Idle);
        outcome
    }

    fn train_and_promote(&self) -> CycleOutcome {
        let current = self.live.snapshot();

        let drained = match self.queue.drain() {
            Ok(drained) => drained,
            Err(e) => {
                warn!("training skipped, queue unavailable: {e}");
                self.status().stats.queue_failures += 1;
                self.retry_pending_save(&current.value);
                return CycleOutcome::QueueUnavailable;
            }
        };

        if drained.is_empty() {
            debug!("no play data since the last cycle");
            self.retry_pending_save(&current.value);
            return CycleOutcome::NoData;
        }
        if drained.malformed > 0 {
            warn!("queue held {} undecodable entries", drained.malformed);
        }

        info!(
            "training generation {} on {} transitions",
            current.generation,
            drained.transitions.len()
        );
        let mut table = current.table().clone();
        let mut report = self.learner.train(&mut table, &drained.transitions);
        report.dropped += drained.malformed;
        {
            let mut status = self.status();
            status.stats.transitions_trained += report.accepted as u64;
            status.stats.transitions_dropped += report.dropped as u64;
        }

        if report.accepted == 0 {
            warn!("all {} drained transitions were malformed", report.dropped);
            self.retry_pending_save(&current.value);
            return CycleOutcome::Discarded(report);
        }

        self.set_phase(Phase::Promoting);
        let promoted = Arc::new(current.with_table(table));
        let generation = self.live.replace(Arc::clone(&promoted));
        {
            let mut status = self.status();
            status.stats.promotions += 1;
            status.stats.generation = generation;
            status.stats.snapshot_pending = true;
        }
        info!(
            "promoted generation {generation}: {} states, {} updates, {} dropped",
            promoted.table().state_count(),
            report.updates,
            report.dropped
        );

        self.persist(&promoted);
        CycleOutcome::Promoted { report, generation }
    }

    fn retry_pending_save(&self, agent: &Agent) {
        if self.status().stats.snapshot_pending {
            info!("retrying snapshot save");
            self.persist(agent);
        }
    }

    fn persist(&self, agent: &Agent) {
        let path = &self.config.snapshot_path;
        match self.repository.save(agent.table(), path) {
            Ok(()) => {
                debug!("snapshot saved to {path:?}");
                self.status().stats.snapshot_pending = false;
            }
            Err(e) => {
                warn!("failed to save snapshot to {path:?}, will retry: {e}");
                self.status().stats.persistence_failures += 1;
            }
        }
    }
}
