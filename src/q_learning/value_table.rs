//! Tabular value function for temporal difference learning

use std::collections::BTreeMap;

use crate::types::BoardCode;

/// Value table mapping canonical state codes to action codes to expected returns
///
/// Entries are only materialized when written. Ordered maps keep the
/// snapshot bytes deterministic (see [`super::serialization`]).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueTable {
    entries: BTreeMap<BoardCode, BTreeMap<BoardCode, f64>>,
}

impl ValueTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_entries(entries: BTreeMap<BoardCode, BTreeMap<BoardCode, f64>>) -> Self {
        Self { entries }
    }

    pub(crate) fn entries(&self) -> &BTreeMap<BoardCode, BTreeMap<BoardCode, f64>> {
        &self.entries
    }

    /// Values for exactly the candidate actions, in candidate order.
    ///
    /// Candidates without a recorded entry get `default`; actions outside
    /// the candidate set are never returned.
    pub fn values_for<I>(&self, state: BoardCode, candidates: I, default: f64) -> Vec<(BoardCode, f64)>
    where
        I: IntoIterator<Item = BoardCode>,
    {
        let recorded = self.entries.get(&state);
        candidates
            .into_iter()
            .map(|action| {
                let value = recorded
                    .and_then(|actions| actions.get(&action))
                    .copied()
                    .unwrap_or(default);
                (action, value)
            })
            .collect()
    }

    /// Recorded value for a state-action pair
    pub fn value(&self, state: BoardCode, action: BoardCode) -> Option<f64> {
        self.entries
            .get(&state)
            .and_then(|actions| actions.get(&action))
            .copied()
    }

    /// Maximum recorded value for a state, or 0.0 for an unrecorded state
    pub fn best_value(&self, state: BoardCode) -> f64 {
        self.entries
            .get(&state)
            .and_then(|actions| actions.values().copied().reduce(f64::max))
            .unwrap_or(0.0)
    }

    /// Overwrite or insert a value
    pub fn update(&mut self, state: BoardCode, action: BoardCode, value: f64) {
        self.entries.entry(state).or_default().insert(action, value);
    }

    /// Number of states with at least one recorded action
    pub fn state_count(&self) -> usize {
        self.entries.len()
    }

    /// Total number of recorded state-action values
    pub fn entry_count(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
