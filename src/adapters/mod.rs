//! Adapters implementing domain ports.
//!
//! Infrastructure implementations of the traits in [`crate::ports`]:
//! play-data queues and snapshot repositories.

pub mod in_memory_repository;
pub mod jsonl_queue;
pub mod memory_queue;
pub mod msgpack_repository;

pub use in_memory_repository::InMemorySnapshotRepository;
pub use jsonl_queue::JsonlQueue;
pub use memory_queue::InMemoryQueue;
pub use msgpack_repository::MsgPackSnapshotRepository;
