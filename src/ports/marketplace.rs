//! Trade Marketplace Port - Offer Transactions
//!
//! The capability the trade form is bound to. Inputs are the raw
//! strings the user typed; turning them into ABI values is the
//! adapter's job, and a value the encoder cannot accept fails the
//! call like any other remote error.

use alloy::primitives::{B256, U256};
use async_trait::async_trait;

/// A confirmed trade transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeConfirmation {
  /// Transaction hash.
  pub tx_hash: B256,
  /// Block that included the transaction.
  pub block_number: Option<u64>,
  /// Trade id returned by `createTradeOffer`, when known.
  pub trade_id: Option<U256>,
}

/// Trait for the signer-bound marketplace connection.
#[async_trait]
pub trait TradeMarketplace: Send + Sync + 'static {
  /// `createTradeOffer(fromTokenId, toAddress, desiredTokenId)`; resolves on confirmation.
  async fn create_trade_offer(
    &self,
    from_token_id: &str,
    to_address: &str,
    desired_token_id: &str,
  ) -> anyhow::Result<TradeConfirmation>;

  /// `acceptTrade(tradeId)`; resolves on confirmation.
  async fn accept_trade(&self, trade_id: &str) -> anyhow::Result<TradeConfirmation>;
}
