//! JSON boundary messages for inference and play-data submission.
//!
//! Boards cross the boundary as nine symbols in row-major order using
//! `"X"`, `"O"` and `"-"`. `agent_is_x` tells which symbol belongs to the
//! agent; it defaults to `true` when omitted.

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    tictactoe::BoardState,
    transition::{RawTransition, Transition},
};

fn agent_is_x_default() -> bool {
    true
}

/// Request for the agent's next move
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionRequest {
    pub state: Vec<String>,
    #[serde(default = "agent_is_x_default")]
    pub agent_is_x: bool,
}

impl ActionRequest {
    pub fn new(state: &BoardState, agent_is_x: bool) -> Self {
        Self {
            state: state
                .to_symbols(agent_is_x)
                .iter()
                .map(|s| s.to_string())
                .collect(),
            agent_is_x,
        }
    }

    /// Parse the board into the agent's perspective.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a wrong length or unknown symbol.
    pub fn board(&self) -> Result<BoardState> {
        BoardState::from_symbols(&self.state, self.agent_is_x)
    }
}

/// The chosen action as an action board in the caller's symbols
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub message: String,
    pub action: Vec<String>,
}

impl ActionResponse {
    pub fn success(action: &BoardState, agent_is_x: bool) -> Self {
        Self {
            message: "success".to_string(),
            action: action
                .to_symbols(agent_is_x)
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Position of the single occupied cell, if the response is well formed
    pub fn position(&self) -> Option<usize> {
        let occupied: Vec<usize> = self
            .action
            .iter()
            .enumerate()
            .filter(|(_, symbol)| symbol.as_str() != crate::tictactoe::EMPTY_SYMBOL)
            .map(|(pos, _)| pos)
            .collect();
        match occupied.as_slice() {
            [pos] => Some(*pos),
            _ => None,
        }
    }
}

/// Plain `{ "message": ... }` reply for acknowledgements and errors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub message: String,
}

impl StatusResponse {
    pub fn success() -> Self {
        Self {
            message: "success".to_string(),
        }
    }

    pub fn error(err: &impl std::fmt::Display) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

/// One observed move submitted for training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlaydataSubmission {
    pub initial_state: Vec<String>,
    pub action: Vec<String>,
    pub resultant_state: Vec<String>,
    pub reward: f64,
    #[serde(default = "agent_is_x_default")]
    pub agent_is_x: bool,
}

impl PlaydataSubmission {
    /// Parse all three boards into the agent's perspective.
    ///
    /// # Errors
    ///
    /// Returns a validation error if any board is malformed.
    pub fn to_raw(&self) -> Result<RawTransition> {
        Ok(RawTransition {
            initial: BoardState::from_symbols(&self.initial_state, self.agent_is_x)?,
            action: BoardState::from_symbols(&self.action, self.agent_is_x)?,
            resultant: BoardState::from_symbols(&self.resultant_state, self.agent_is_x)?,
            reward: self.reward,
        })
    }

    /// Parse and canonicalize into a queueable transition.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed boards, an unplayable
    /// action or a non-finite reward.
    pub fn into_transition(self) -> Result<Transition> {
        self.to_raw()?.canonicalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn symbols(s: &str) -> Vec<String> {
        s.chars().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_request_defaults_agent_to_x() {
        let request: ActionRequest =
            serde_json::from_str(r#"{"state":["-","-","-","-","-","-","-","-","-"]}"#).unwrap();
        assert!(request.agent_is_x);
        assert_eq!(request.board().unwrap(), BoardState::new());
    }

    #[test]
    fn test_request_rejects_unknown_fields() {
        let result = serde_json::from_str::<ActionRequest>(
            r#"{"state":["-","-","-","-","-","-","-","-","-"],"extra":1}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_request_rejects_short_board() {
        let request = ActionRequest {
            state: symbols("XO-"),
            agent_is_x: true,
        };
        assert!(matches!(
            request.board(),
            Err(Error::InvalidBoardLength { expected: 9, got: 3 })
        ));
    }

    #[test]
    fn test_response_uses_caller_symbols() {
        let action = BoardState::placement(4).unwrap();
        let as_o = ActionResponse::success(&action, false);
        assert_eq!(as_o.action, symbols("----O----"));
        assert_eq!(as_o.position(), Some(4));

        let json = serde_json::to_string(&ActionResponse::success(&action, true)).unwrap();
        assert_eq!(
            json,
            r#"{"message":"success","action":["-","-","-","-","X","-","-","-","-"]}"#
        );
    }

    #[test]
    fn test_submission_as_o_matches_submission_as_x() {
        let as_x = PlaydataSubmission {
            initial_state: symbols("O--------"),
            action: symbols("----X----"),
            resultant_state: symbols("O---X----"),
            reward: 0.0,
            agent_is_x: true,
        };
        let as_o = PlaydataSubmission {
            initial_state: symbols("X--------"),
            action: symbols("----O----"),
            resultant_state: symbols("X---O----"),
            reward: 0.0,
            agent_is_x: false,
        };
        assert_eq!(
            as_x.into_transition().unwrap(),
            as_o.into_transition().unwrap()
        );
    }

    #[test]
    fn test_submission_with_unplayable_action_fails() {
        let submission = PlaydataSubmission {
            initial_state: symbols("X--------"),
            action: symbols("X--------"),
            resultant_state: symbols("X--------"),
            reward: 0.0,
            agent_is_x: true,
        };
        let err = submission.into_transition().unwrap_err();
        assert!(err.is_validation());
    }
}
