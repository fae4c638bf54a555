//! Chain Adapters - Blockchain Interaction Layer
//!
//! Provides on-chain access via alloy-rs 0.9 for:
//! - Signer-bound RPC provider with chain id validation
//! - Contract bindings and compiled artifact loading
//! - Contract deployment and setup transactions
//! - Marketplace trade offer transactions
//! - Deployed code checks

pub mod contracts;
pub mod deployer;
pub mod marketplace;
pub mod provider;
pub mod validator;

pub use contracts::ContractArtifacts;
pub use deployer::OnChainDeployer;
pub use marketplace::MarketplaceClient;
pub use provider::ChainConnection;
pub use validator::ContractValidator;
