//! Tabular Q-learning
//!
//! The value table stores expected returns keyed by canonical state and
//! action codes. Training applies the off-policy TD update
//!
//! ```text
//! Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
//! ```
//!
//! to a private copy of the table; serving code only ever reads.
//!
//! ## Usage Example
//!
//! ```
//! use noughts::q_learning::{LearningConfig, QLearner, ValueTable};
//! use noughts::transition::Transition;
//! use noughts::types::BoardCode;
//!
//! let mut table = ValueTable::new();
//! let learner = QLearner::new(LearningConfig::default());
//! let transition = Transition {
//!     state: BoardCode::EMPTY,
//!     action: BoardCode::new(100_000_000)?,
//!     resultant: BoardCode::new(100_000_000)?,
//!     reward: 1.0,
//! };
//! learner.update(&mut table, &transition);
//! assert_eq!(table.value(transition.state, transition.action), Some(0.5));
//! # Ok::<(), noughts::Error>(())
//! ```

pub mod serialization;
pub mod trainer;
pub mod value_table;

// Public re-exports
pub use serialization::SavedValueTable;
pub use trainer::{LearningConfig, QLearner, TrainingReport};
pub use value_table::ValueTable;
