//! GameAsset Market — Library Root
//!
//! Deployment workflow and trade-offer client for the QuizToken /
//! GameAsset / Marketplace contracts. Re-exports all modules for the
//! binaries and integration tests.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod logging;
pub mod ports;
pub mod usecases;
