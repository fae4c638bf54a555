//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the use cases require from
//! the outside world. Adapters implement these traits; tests swap in
//! mocks and recording fakes.
//!
//! Port categories:
//! - `ContractDeployer`: contract creation and setup transactions
//! - `TradeMarketplace`: trade offer transactions for the form
//! - `CheckpointStore`: deployment progress persistence

pub mod deployer;
pub mod marketplace;
pub mod repository;

pub use deployer::{ChainError, ContractDeployer, Deployment, MintReceipt, TxConfirmation};
pub use marketplace::{TradeConfirmation, TradeMarketplace};
pub use repository::CheckpointStore;
