//! Value-table agent
//!
//! An [`Agent`] pairs a frozen [`ValueTable`] with a [`Policy`]. Agents are
//! immutable once built; training produces a new agent.

pub mod policy;

use log::debug;
use rand::Rng;

pub use policy::Policy;

use crate::{
    Result,
    inference::{ActionRequest, ActionResponse},
    q_learning::ValueTable,
    tictactoe::BoardState,
};

/// Acting player backed by a value table
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    policy: Policy,
    table: ValueTable,
    optimistic_value: f64,
}

impl Agent {
    /// `optimistic_value` is assumed for actions the table has never seen.
    pub fn new(policy: Policy, table: ValueTable, optimistic_value: f64) -> Self {
        Self {
            policy,
            table,
            optimistic_value,
        }
    }

    /// An agent that knows nothing and explores uniformly
    pub fn random() -> Self {
        Self::new(Policy::Random, ValueTable::new(), 0.0)
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn table(&self) -> &ValueTable {
        &self.table
    }

    pub fn optimistic_value(&self) -> f64 {
        self.optimistic_value
    }

    /// Same policy and defaults over a different table
    pub fn with_table(&self, table: ValueTable) -> Self {
        Self {
            table,
            ..self.clone()
        }
    }

    /// Same table under a different policy
    pub fn with_policy(&self, policy: Policy) -> Self {
        Self {
            policy,
            ..self.clone()
        }
    }

    /// Choose an action for a board in the agent's perspective.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NoLegalActions`] if the board is full.
    pub fn act<R: Rng>(&self, board: &BoardState, rng: &mut R) -> Result<BoardState> {
        self.policy
            .select(board, &self.table, self.optimistic_value, rng)
    }

    /// Answer an inference request in the caller's symbols
    pub fn respond<R: Rng>(&self, request: &ActionRequest, rng: &mut R) -> Result<ActionResponse> {
        let board = request.board()?;
        let action = self.act(&board, rng)?;
        debug!(
            "{} chose cell {:?} for {}",
            self.policy,
            action.action_position(),
            board.code()
        );
        Ok(ActionResponse::success(&action, request.agent_is_x))
    }
}

impl Default for Agent {
    fn default() -> Self {
        Self::new(Policy::default(), ValueTable::new(), 1.0)
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::Error;

    fn symbols(s: &str) -> Vec<String> {
        s.chars().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_respond_as_o_returns_o_symbol() {
        let agent = Agent::random();
        let mut rng = StdRng::seed_from_u64(11);
        let request = ActionRequest {
            state: symbols("X---O---X"),
            agent_is_x: false,
        };

        for _ in 0..20 {
            let response = agent.respond(&request, &mut rng).unwrap();
            let pos = response.position().unwrap();
            assert_eq!(response.action[pos], "O");
            assert_eq!(request.state[pos], "-");
        }
    }

    #[test]
    fn test_respond_on_full_board() {
        let agent = Agent::default();
        let mut rng = StdRng::seed_from_u64(11);
        let request = ActionRequest {
            state: symbols("XOXOXOOXO"),
            agent_is_x: true,
        };
        assert!(matches!(
            agent.respond(&request, &mut rng),
            Err(Error::NoLegalActions)
        ));
    }

    #[test]
    fn test_greedy_agent_follows_learned_win() {
        // Agent to move with two in the top row
        let board = BoardState::from_symbols(&symbols("XX-OO----"), true).unwrap();
        let canonical = board.canonicalize();
        let winning = canonical.to_canonical(&BoardState::placement(2).unwrap());

        let mut table = ValueTable::new();
        table.update(canonical.code(), winning.code(), 1.0);
        let agent = Agent::new(Policy::EpsilonGreedy { epsilon: 0.0 }, table, 0.0);

        let mut rng = StdRng::seed_from_u64(5);
        let action = agent.act(&board, &mut rng).unwrap();
        assert_eq!(action.action_position(), Some(2));
    }

    #[test]
    fn test_with_table_keeps_policy() {
        let agent = Agent::new(Policy::Softmax { temperature: 0.3 }, ValueTable::new(), 0.5);
        let mut table = ValueTable::new();
        table.update(BoardState::new().code(), BoardState::placement(4).unwrap().code(), 1.0);

        let promoted = agent.with_table(table.clone());
        assert_eq!(promoted.policy(), agent.policy());
        assert_eq!(promoted.optimistic_value(), 0.5);
        assert_eq!(promoted.table(), &table);
        assert!(agent.table().is_empty());
    }
}
