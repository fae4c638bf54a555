//! Contract Deployer Port - Provisioning Transactions
//!
//! Every method submits exactly one transaction and resolves only
//! after its receipt is available. Callers rely on this to order
//! dependent steps: a returned value means "confirmed", never
//! "submitted".

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use thiserror::Error;

/// Conditions the chain layer detects on a receipt by itself.
///
/// Transport failures, signer rejections and gas errors are not
/// classified; they pass through as `anyhow::Error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
  #[error("transaction {tx_hash} reverted")]
  Reverted { tx_hash: B256 },

  #[error("deployment receipt {tx_hash} carries no contract address")]
  MissingContractAddress { tx_hash: B256 },

  #[error("mint receipt {tx_hash} carries no Transfer event")]
  MissingTransferEvent { tx_hash: B256 },

  #[error("expected chain id {expected}, connected to {actual}")]
  ChainIdMismatch { expected: u64, actual: u64 },
}

/// A confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxConfirmation {
  /// Transaction hash.
  pub tx_hash: B256,
  /// Block that included the transaction.
  pub block_number: Option<u64>,
}

/// A confirmed contract creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
  /// Address of the new contract.
  pub address: Address,
  /// Creation receipt.
  pub confirmation: TxConfirmation,
}

/// A confirmed mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintReceipt {
  /// Id assigned by the NFT contract.
  pub token_id: U256,
  /// Mint receipt.
  pub confirmation: TxConfirmation,
}

/// Trait for the signer-bound connection used by the deployment workflow.
#[async_trait]
pub trait ContractDeployer: Send + Sync + 'static {
  /// Address of the signing identity (owner of minted assets).
  fn deployer(&self) -> Address;

  /// Chain id of the connected network.
  async fn chain_id(&self) -> anyhow::Result<u64>;

  /// Deploy the fungible token contract (no constructor arguments).
  async fn deploy_token(&self) -> anyhow::Result<Deployment>;

  /// Deploy the NFT contract (no constructor arguments).
  async fn deploy_nft(&self) -> anyhow::Result<Deployment>;

  /// Deploy the marketplace bound to the token and NFT contracts.
  async fn deploy_marketplace(&self, token: Address, nft: Address) -> anyhow::Result<Deployment>;

  /// `mint(owner, uri)` on the NFT contract.
  async fn mint(&self, nft: Address, owner: Address, uri: &str) -> anyhow::Result<MintReceipt>;

  /// `approve(spender, tokenId)` on the NFT contract.
  async fn approve(
    &self,
    nft: Address,
    spender: Address,
    token_id: U256,
  ) -> anyhow::Result<TxConfirmation>;

  /// `listAsset(tokenId, price)` on the marketplace.
  async fn list_asset(
    &self,
    marketplace: Address,
    token_id: U256,
    price: U256,
  ) -> anyhow::Result<TxConfirmation>;

  /// Whether `address` holds deployed code.
  async fn has_code(&self, address: Address) -> anyhow::Result<bool>;
}
