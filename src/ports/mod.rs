//! Ports (trait boundaries) for external dependencies.
//!
//! The coordinator reaches play-data and snapshot storage only through
//! these traits (implemented in [`crate::adapters`]). Batch self-play
//! reports progress through [`Observer`].

pub mod observer;
pub mod queue;
pub mod repository;

pub use observer::Observer;
pub use queue::{Drained, PlaydataQueue};
pub use repository::SnapshotRepository;
