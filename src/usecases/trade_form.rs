//! Trade Form - Create and Accept Trade Offers
//!
//! Holds the four user inputs and the two actions on them. The
//! marketplace capability is injected, so the form never opens a
//! connection itself. Inputs are forwarded verbatim: no trimming,
//! no address or id validation.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, instrument};

use crate::domain::trade::TradeNotice;
use crate::ports::marketplace::TradeMarketplace;

/// Create/accept trade offer form bound to a marketplace.
pub struct TradeForm<M: TradeMarketplace> {
  /// Signer-bound marketplace port.
  market: Arc<M>,
  /// Token the user offers.
  pub your_token_id: String,
  /// Counterparty address.
  pub target_address: String,
  /// Token the user wants in return.
  pub desired_token_id: String,
  /// Offer to accept.
  pub trade_id: String,
}

impl<M: TradeMarketplace> TradeForm<M> {
  /// Create an empty form.
  pub const fn new(market: Arc<M>) -> Self {
    Self {
      market,
      your_token_id: String::new(),
      target_address: String::new(),
      desired_token_id: String::new(),
      trade_id: String::new(),
    }
  }

  /// Fill the three create-offer fields.
  #[must_use]
  pub fn with_offer(
    mut self,
    your_token_id: impl Into<String>,
    target_address: impl Into<String>,
    desired_token_id: impl Into<String>,
  ) -> Self {
    self.your_token_id = your_token_id.into();
    self.target_address = target_address.into();
    self.desired_token_id = desired_token_id.into();
    self
  }

  /// Fill the accept-offer field.
  #[must_use]
  pub fn with_trade_id(mut self, trade_id: impl Into<String>) -> Self {
    self.trade_id = trade_id.into();
    self
  }

  /// Submit `createTradeOffer` with the current fields and wait for confirmation.
  #[instrument(skip(self))]
  pub async fn create_trade(&self) -> Result<TradeNotice> {
    let confirmation = self
      .market
      .create_trade_offer(&self.your_token_id, &self.target_address, &self.desired_token_id)
      .await?;

    info!(
      tx_hash = %confirmation.tx_hash,
      trade_id = ?confirmation.trade_id,
      "Trade offer created"
    );
    Ok(TradeNotice::OfferCreated {
      tx_hash: confirmation.tx_hash,
      trade_id: confirmation.trade_id,
    })
  }

  /// Submit `acceptTrade` with the current trade id and wait for confirmation.
  #[instrument(skip(self))]
  pub async fn accept_trade(&self) -> Result<TradeNotice> {
    let confirmation = self.market.accept_trade(&self.trade_id).await?;

    info!(tx_hash = %confirmation.tx_hash, "Trade accepted");
    Ok(TradeNotice::TradeAccepted {
      tx_hash: confirmation.tx_hash,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ports::marketplace::TradeConfirmation;
  use alloy::primitives::{B256, U256};
  use async_trait::async_trait;
  use tokio::sync::Mutex;

  /// Records every call and answers with a fixed confirmation.
  #[derive(Default)]
  struct RecordingMarket {
    calls: Mutex<Vec<Vec<String>>>,
    fail: bool,
  }

  #[async_trait]
  impl TradeMarketplace for RecordingMarket {
    async fn create_trade_offer(
      &self,
      from_token_id: &str,
      to_address: &str,
      desired_token_id: &str,
    ) -> Result<TradeConfirmation> {
      self.calls.lock().await.push(vec![
        "create".to_string(),
        from_token_id.to_string(),
        to_address.to_string(),
        desired_token_id.to_string(),
      ]);
      anyhow::ensure!(!self.fail, "execution reverted: not token owner");
      Ok(TradeConfirmation {
        tx_hash: B256::repeat_byte(0xab),
        block_number: Some(10),
        trade_id: Some(U256::from(4u64)),
      })
    }

    async fn accept_trade(&self, trade_id: &str) -> Result<TradeConfirmation> {
      self
        .calls
        .lock()
        .await
        .push(vec!["accept".to_string(), trade_id.to_string()]);
      anyhow::ensure!(!self.fail, "execution reverted: no such trade");
      Ok(TradeConfirmation {
        tx_hash: B256::repeat_byte(0xcd),
        block_number: Some(11),
        trade_id: None,
      })
    }
  }

  #[tokio::test]
  async fn test_create_trade_forwards_fields_in_order() {
    let market = Arc::new(RecordingMarket::default());
    let form = TradeForm::new(Arc::clone(&market)).with_offer("1", "0xabc", " 2");

    let notice = form.create_trade().await.unwrap();

    assert_eq!(
      *market.calls.lock().await,
      vec![vec!["create", "1", "0xabc", " 2"]]
    );
    assert_eq!(
      notice,
      TradeNotice::OfferCreated {
        tx_hash: B256::repeat_byte(0xab),
        trade_id: Some(U256::from(4u64)),
      }
    );
  }

  #[tokio::test]
  async fn test_accept_trade_forwards_trade_id() {
    let market = Arc::new(RecordingMarket::default());
    let form = TradeForm::new(Arc::clone(&market)).with_trade_id("7");

    let notice = form.accept_trade().await.unwrap();

    assert_eq!(*market.calls.lock().await, vec![vec!["accept", "7"]]);
    assert_eq!(notice.to_string(), "Trade accepted successfully!");
  }

  #[tokio::test]
  async fn test_rejection_propagates_without_notice() {
    let market = Arc::new(RecordingMarket {
      fail: true,
      ..RecordingMarket::default()
    });
    let form = TradeForm::new(Arc::clone(&market)).with_trade_id("99");

    let err = form.accept_trade().await.unwrap_err();
    assert!(err.to_string().contains("no such trade"));
    assert_eq!(market.calls.lock().await.len(), 1);
  }
}
