//! Action-selection strategies over canonical boards

use std::{fmt, str::FromStr};

use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, q_learning::ValueTable, tictactoe::BoardState};

/// Exploration policy, dispatched by tag
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Policy {
    /// Uniform choice among legal actions
    Random,
    /// Random with probability ε, greedy otherwise
    EpsilonGreedy { epsilon: f64 },
    /// Boltzmann sampling at temperature T
    Softmax { temperature: f64 },
}

impl Default for Policy {
    fn default() -> Self {
        Policy::EpsilonGreedy { epsilon: 0.1 }
    }
}

impl Policy {
    /// Check the policy parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] when ε is outside [0, 1] or
    /// the temperature is not a positive finite number.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Policy::Random => Ok(()),
            Policy::EpsilonGreedy { epsilon } if (0.0..=1.0).contains(&epsilon) => Ok(()),
            Policy::EpsilonGreedy { epsilon } => Err(Error::InvalidConfiguration {
                message: format!("epsilon {epsilon} must be in [0, 1]"),
            }),
            Policy::Softmax { temperature } if temperature > 0.0 && temperature.is_finite() => {
                Ok(())
            }
            Policy::Softmax { temperature } => Err(Error::InvalidConfiguration {
                message: format!("temperature {temperature} must be positive and finite"),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Policy::Random => "random",
            Policy::EpsilonGreedy { .. } => "epsilon-greedy",
            Policy::Softmax { .. } => "softmax",
        }
    }

    /// Select an action board for `board`.
    ///
    /// `default_value` is the value assumed for actions the table has not
    /// recorded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoLegalActions`] if the board is full.
    pub fn select<R: Rng>(
        &self,
        board: &BoardState,
        table: &ValueTable,
        default_value: f64,
        rng: &mut R,
    ) -> Result<BoardState> {
        match *self {
            Policy::Random => Self::uniform(board, rng),
            Policy::EpsilonGreedy { epsilon } => {
                if rng.random::<f64>() < epsilon {
                    Self::uniform(board, rng)
                } else {
                    Self::greedy(board, table, default_value)
                }
            }
            Policy::Softmax { temperature } => {
                Self::softmax(board, table, default_value, temperature, rng)
            }
        }
    }

    fn uniform<R: Rng>(board: &BoardState, rng: &mut R) -> Result<BoardState> {
        let actions: Vec<BoardState> = board.legal_actions().collect();
        actions.choose(rng).copied().ok_or(Error::NoLegalActions)
    }

    fn greedy(board: &BoardState, table: &ValueTable, default_value: f64) -> Result<BoardState> {
        let canonical = board.canonicalize();
        let (actions, values) = Self::canonical_values(&canonical.board, table, default_value)?;

        // Strict comparison keeps the first action on ties
        let mut best = 0;
        for (idx, &value) in values.iter().enumerate().skip(1) {
            if value > values[best] {
                best = idx;
            }
        }

        Ok(canonical.restore(&actions[best]))
    }

    fn softmax<R: Rng>(
        board: &BoardState,
        table: &ValueTable,
        default_value: f64,
        temperature: f64,
        rng: &mut R,
    ) -> Result<BoardState> {
        let canonical = board.canonicalize();
        let (actions, values) = Self::canonical_values(&canonical.board, table, default_value)?;

        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let weights: Vec<f64> = values
            .iter()
            .map(|value| ((value - max) / temperature).exp())
            .collect();
        let total: f64 = weights.iter().sum();

        let mut threshold = rng.random::<f64>() * total;
        let mut chosen = actions.len() - 1;
        for (idx, weight) in weights.iter().enumerate() {
            if threshold < *weight {
                chosen = idx;
                break;
            }
            threshold -= weight;
        }

        Ok(canonical.restore(&actions[chosen]))
    }

    /// Legal actions of a canonical board with their table values
    fn canonical_values(
        canonical: &BoardState,
        table: &ValueTable,
        default_value: f64,
    ) -> Result<(Vec<BoardState>, Vec<f64>)> {
        let actions: Vec<BoardState> = canonical.legal_actions().collect();
        if actions.is_empty() {
            return Err(Error::NoLegalActions);
        }
        let values = table
            .values_for(
                canonical.code(),
                actions.iter().map(BoardState::code),
                default_value,
            )
            .into_iter()
            .map(|(_, value)| value)
            .collect();
        Ok((actions, values))
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Random => write!(f, "random"),
            Policy::EpsilonGreedy { epsilon } => write!(f, "epsilon-greedy:{epsilon}"),
            Policy::Softmax { temperature } => write!(f, "softmax:{temperature}"),
        }
    }
}

impl FromStr for Policy {
    type Err = Error;

    /// Parse `random`, `epsilon-greedy:<ε>` or `softmax:<T>`.
    fn from_str(s: &str) -> Result<Self> {
        let (kind, param) = match s.split_once(':') {
            Some((kind, param)) => (kind, Some(param)),
            None => (s, None),
        };
        let param = |name: &str| -> Result<f64> {
            param
                .ok_or_else(|| Error::InvalidConfiguration {
                    message: format!("policy '{kind}' requires a {name} (e.g. '{kind}:0.1')"),
                })?
                .parse::<f64>()
                .map_err(|e| Error::InvalidConfiguration {
                    message: format!("invalid {name} in policy '{s}': {e}"),
                })
        };

        let policy = match kind {
            "random" => Policy::Random,
            "epsilon-greedy" | "epsilon_greedy" => Policy::EpsilonGreedy {
                epsilon: param("epsilon")?,
            },
            "softmax" => Policy::Softmax {
                temperature: param("temperature")?,
            },
            other => {
                return Err(Error::InvalidConfiguration {
                    message: format!(
                        "unknown policy '{other}'. Expected one of: random, epsilon-greedy, softmax"
                    ),
                });
            }
        };
        policy.validate()?;
        Ok(policy)
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::tictactoe::Cell;

    fn board(s: &str) -> BoardState {
        let symbols: Vec<String> = s.chars().map(|c| c.to_string()).collect();
        BoardState::from_symbols(&symbols, true).unwrap()
    }

    #[test]
    fn test_random_only_plays_empty_cells() {
        let mut rng = StdRng::seed_from_u64(7);
        let state = board("XO-XO-OX-");
        let table = ValueTable::new();
        for _ in 0..50 {
            let action = Policy::Random.select(&state, &table, 1.0, &mut rng).unwrap();
            let pos = action.action_position().unwrap();
            assert!(state.is_empty(pos));
        }
    }

    #[test]
    fn test_full_board_has_no_action() {
        let mut rng = StdRng::seed_from_u64(7);
        let full = board("XOXOXOOXO");
        let table = ValueTable::new();
        for policy in [
            Policy::Random,
            Policy::EpsilonGreedy { epsilon: 0.0 },
            Policy::Softmax { temperature: 1.0 },
        ] {
            let err = policy.select(&full, &table, 1.0, &mut rng).unwrap_err();
            assert!(matches!(err, Error::NoLegalActions), "{policy}");
        }
    }

    #[test]
    fn test_greedy_picks_highest_value_in_original_orientation() {
        let mut rng = StdRng::seed_from_u64(1);
        // Opponent top-left; canonical form moves it to the bottom-right.
        let state = board("O--------");
        let canonical = state.canonicalize();

        // Favour the centre in canonical space
        let mut table = ValueTable::new();
        let centre = BoardState::placement(4).unwrap();
        table.update(canonical.code(), centre.code(), 5.0);

        let policy = Policy::EpsilonGreedy { epsilon: 0.0 };
        let action = policy.select(&state, &table, 0.0, &mut rng).unwrap();
        assert_eq!(action.action_position(), Some(4));

        // Canonical cell 0 is the corner opposite the opponent piece
        let mut table = ValueTable::new();
        table.update(
            canonical.code(),
            BoardState::placement(0).unwrap().code(),
            5.0,
        );
        let action = policy.select(&state, &table, 0.0, &mut rng).unwrap();
        let pos = action.action_position().unwrap();
        assert_eq!(pos, 8);
        assert_eq!(state.get(pos), Cell::Empty);
    }

    #[test]
    fn test_greedy_ties_break_deterministically() {
        let state = BoardState::new();
        let table = ValueTable::new();
        let policy = Policy::EpsilonGreedy { epsilon: 0.0 };

        let first = policy
            .select(&state, &table, 1.0, &mut StdRng::seed_from_u64(1))
            .unwrap();
        for seed in 2..20 {
            let again = policy
                .select(&state, &table, 1.0, &mut StdRng::seed_from_u64(seed))
                .unwrap();
            assert_eq!(again, first);
        }
    }

    #[test]
    fn test_softmax_prefers_high_values() {
        let mut rng = StdRng::seed_from_u64(3);
        let state = board("XXOOO-X--");
        let canonical = state.canonicalize();
        let mut table = ValueTable::new();
        for action in canonical.board.legal_actions() {
            table.update(canonical.code(), action.code(), -10.0);
        }
        // One clearly superior canonical action
        let favourite = canonical.board.legal_actions().next().unwrap();
        table.update(canonical.code(), favourite.code(), 10.0);
        let expected = canonical.restore(&favourite);

        let policy = Policy::Softmax { temperature: 0.5 };
        let hits = (0..200)
            .filter(|_| policy.select(&state, &table, 0.0, &mut rng).unwrap() == expected)
            .count();
        assert!(hits > 190, "favourite chosen only {hits} times");
    }

    #[test]
    fn test_softmax_is_stable_for_large_values() {
        let mut rng = StdRng::seed_from_u64(3);
        let state = BoardState::new();
        let table = ValueTable::new();
        let policy = Policy::Softmax { temperature: 0.01 };
        let action = policy.select(&state, &table, 1e6, &mut rng).unwrap();
        assert!(action.action_position().is_some());
    }

    #[test]
    fn test_parse_policies() {
        assert_eq!("random".parse::<Policy>().unwrap(), Policy::Random);
        assert_eq!(
            "epsilon-greedy:0.2".parse::<Policy>().unwrap(),
            Policy::EpsilonGreedy { epsilon: 0.2 }
        );
        assert_eq!(
            "softmax:0.5".parse::<Policy>().unwrap(),
            Policy::Softmax { temperature: 0.5 }
        );
        assert!("softmax".parse::<Policy>().is_err());
        assert!("softmax:0".parse::<Policy>().is_err());
        assert!("epsilon-greedy:1.5".parse::<Policy>().is_err());
        assert!("greedy".parse::<Policy>().is_err());
    }

    #[test]
    fn test_serde_tagging() {
        let json = serde_json::to_string(&Policy::Softmax { temperature: 0.5 }).unwrap();
        assert_eq!(json, r#"{"kind":"softmax","temperature":0.5}"#);
        let parsed: Policy = serde_json::from_str(r#"{"kind":"random"}"#).unwrap();
        assert_eq!(parsed, Policy::Random);
    }
}
