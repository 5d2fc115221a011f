//! Training samples in raw and canonical form

use serde::{Deserialize, Serialize};

use crate::{Error, Result, tictactoe::BoardState, types::BoardCode};

/// A canonical training sample, the unit stored in the playdata queue.
///
/// State and action share one symmetry transform; the resultant state is
/// canonicalized on its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    #[serde(rename = "initial_state")]
    pub state: BoardCode,
    pub action: BoardCode,
    #[serde(rename = "resultant_state")]
    pub resultant: BoardCode,
    pub reward: f64,
}

impl Transition {
    /// Check that every code decodes, that the action is a single placement
    /// onto an empty cell of the state, and that the reward is finite.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCode`] for undecodable codes,
    /// [`Error::InvalidAction`] for an unplayable action and
    /// [`Error::Validation`] for a non-finite reward.
    pub fn validate(&self) -> Result<()> {
        let state = BoardState::from_code(self.state)?;
        let action = BoardState::from_code(self.action)?;
        BoardState::from_code(self.resultant)?;
        state.play(&action)?;
        if !self.reward.is_finite() {
            return Err(Error::Validation {
                message: format!("reward {} is not finite", self.reward),
            });
        }
        Ok(())
    }
}

/// A training sample before canonicalization, already in the mover's
/// perspective.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawTransition {
    pub initial: BoardState,
    pub action: BoardState,
    pub resultant: BoardState,
    pub reward: f64,
}

impl RawTransition {
    /// Canonicalize state and action jointly, and the resultant on its own.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAction`] if the action cannot be played on
    /// the initial state, or [`Error::Validation`] for a non-finite reward.
    pub fn canonicalize(&self) -> Result<Transition> {
        self.initial.play(&self.action)?;
        if !self.reward.is_finite() {
            return Err(Error::Validation {
                message: format!("reward {} is not finite", self.reward),
            });
        }

        let canonical = self.initial.canonicalize();
        let action = canonical.to_canonical(&self.action);

        Ok(Transition {
            state: canonical.code(),
            action: action.code(),
            resultant: self.resultant.canonicalize().code(),
            reward: self.reward,
        })
    }
}
