//! Persistence Adapters - JSON Checkpoint Storage
//!
//! Implements the `CheckpointStore` port with an atomic JSON file
//! for resumable deployments, and an ephemeral store for runs that
//! keep no progress. No database dependency.

pub mod checkpoint;

pub use checkpoint::{EphemeralCheckpointStore, JsonCheckpointStore};
