//! Q-learning updates over batches of canonical transitions

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, q_learning::value_table::ValueTable, transition::Transition};

/// Hyperparameters of the Q-learning update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Learning rate α
    pub learning_rate: f64,
    /// Discount factor γ
    pub discount_factor: f64,
    /// Value assumed for a state-action pair that has never been trained
    pub initial_value: f64,
    /// How many times each drained batch is replayed
    pub replay_passes: usize,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.5,
            discount_factor: 0.9,
            initial_value: 0.0,
            replay_passes: 1,
        }
    }
}

impl LearningConfig {
    /// Check parameter ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(Error::InvalidConfiguration { message });

        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return invalid(format!(
                "learning rate {} must be in (0, 1]",
                self.learning_rate
            ));
        }
        if !(0.0..=1.0).contains(&self.discount_factor) {
            return invalid(format!(
                "discount factor {} must be in [0, 1]",
                self.discount_factor
            ));
        }
        if !self.initial_value.is_finite() {
            return invalid(format!("initial value {} must be finite", self.initial_value));
        }
        if self.replay_passes == 0 {
            return invalid("replay passes must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Counters for one training pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Transitions that passed validation
    pub accepted: usize,
    /// Transitions dropped as undecodable or unplayable
    pub dropped: usize,
    /// Individual updates applied (accepted × passes)
    pub updates: usize,
}

/// Off-policy TD control over a value table
#[derive(Debug, Clone, Copy)]
pub struct QLearner {
    config: LearningConfig,
}

impl QLearner {
    pub fn new(config: LearningConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    /// Q-learning update for one transition
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
    ///
    /// Returns the new value. The transition is not validated here.
    pub fn update(&self, table: &mut ValueTable, transition: &Transition) -> f64 {
        let current = table
            .value(transition.state, transition.action)
            .unwrap_or(self.config.initial_value);
        let td_target =
            transition.reward + self.config.discount_factor * table.best_value(transition.resultant);
        let new_value = current + self.config.learning_rate * (td_target - current);
        table.update(transition.state, transition.action, new_value);
        new_value
    }

    /// Validate a batch, then replay the valid transitions
    /// `replay_passes` times in order. Invalid transitions are dropped and
    /// counted once.
    pub fn train(&self, table: &mut ValueTable, transitions: &[Transition]) -> TrainingReport {
        let mut report = TrainingReport::default();

        let accepted: Vec<&Transition> = transitions
            .iter()
            .filter(|transition| match transition.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!(
                        "dropping transition ({}, {}, {}): {e}",
                        transition.state, transition.action, transition.resultant
                    );
                    report.dropped += 1;
                    false
                }
            })
            .collect();
        report.accepted = accepted.len();

        for pass in 0..self.config.replay_passes {
            for transition in &accepted {
                self.update(table, transition);
                report.updates += 1;
            }
            debug!("replay pass {} applied {} updates", pass + 1, accepted.len());
        }

        report
    }
}
