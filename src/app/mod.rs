//! Application layer: configuration and dependency wiring.
//!
//! ```text
//! ServiceConfig ──▶ App ──owns──▶ adapters (JsonlQueue / InMemoryQueue,
//!                    │                      MsgPackSnapshotRepository)
//!                    │                         │ implement
//!                    │                         ▼
//!                    └──builds──▶ TrainingCoordinator ──uses──▶ ports
//! ```

pub mod config;
pub mod container;

pub use config::ServiceConfig;
pub use container::{App, AppBuilder};
