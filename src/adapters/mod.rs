//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (blockchain RPC, file I/O). Each sub-module
//! groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `chain`: contract deployment and marketplace calls via alloy-rs
//! - `persistence`: JSON deployment checkpoints

pub mod chain;
pub mod persistence;
