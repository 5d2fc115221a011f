//! Game outcome classification

use serde::{Deserialize, Serialize};

/// Classification of a board from the acting player's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Ongoing,
    AgentWins,
    OpponentWins,
    Draw,
}

impl Outcome {
    /// Whether the game has ended.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::Ongoing)
    }

    /// Swap the winner perspective (agent ↔ opponent). Useful when mirroring
    /// a board with [`crate::tictactoe::BoardState::swap_symbols`].
    pub fn swap_perspective(self) -> Self {
        match self {
            Outcome::AgentWins => Outcome::OpponentWins,
            Outcome::OpponentWins => Outcome::AgentWins,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal() {
        assert!(!Outcome::Ongoing.is_terminal());
        assert!(Outcome::Draw.is_terminal());
        assert!(Outcome::AgentWins.is_terminal());
        assert!(Outcome::OpponentWins.is_terminal());
    }

    #[test]
    fn test_swap_perspective() {
        assert_eq!(Outcome::AgentWins.swap_perspective(), Outcome::OpponentWins);
        assert_eq!(Outcome::Draw.swap_perspective(), Outcome::Draw);
    }
}
