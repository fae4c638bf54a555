//! Marketplace Client — `TradeMarketplace` over alloy-rs
//!
//! Binds the configured marketplace address to the `sol!` interface
//! and the shared signer. String inputs from the trade form are ABI
//! encoded here; a value that is not a uint256 or an address fails
//! the call before anything is sent. Offers are simulated as the
//! signer first to learn the trade id the contract will assign.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, instrument, warn};

use super::contracts::{Marketplace, confirm};
use super::provider::ChainConnection;
use crate::ports::deployer::TxConfirmation;
use crate::ports::marketplace::{TradeConfirmation, TradeMarketplace};

/// Signer-bound client of one deployed marketplace.
pub struct MarketplaceClient {
    /// Shared signer-bound connection.
    connection: Arc<ChainConnection>,
    /// Marketplace contract address from config.
    address: Address,
}

impl MarketplaceClient {
    /// Bind `address` to the connection's signer.
    pub const fn new(connection: Arc<ChainConnection>, address: Address) -> Self {
        Self {
            connection,
            address,
        }
    }

    /// Marketplace address this client sends to.
    pub const fn address(&self) -> Address {
        self.address
    }
}

fn parse_uint(field: &str, value: &str) -> Result<U256> {
    value
        .trim()
        .parse::<U256>()
        .with_context(|| format!("{field} `{value}` is not a uint256"))
}

fn parse_address(field: &str, value: &str) -> Result<Address> {
    value
        .trim()
        .parse::<Address>()
        .with_context(|| format!("{field} `{value}` is not an address"))
}

impl MarketplaceClient {
    /// Send `input` to the marketplace and wait for a successful receipt.
    async fn transact(&self, label: &str, input: Vec<u8>) -> Result<TxConfirmation> {
        let tx = TransactionRequest::default()
            .to(self.address)
            .input(Bytes::from(input).into());

        let receipt = self
            .connection
            .submit(tx)
            .await
            .with_context(|| format!("{label} failed"))?;
        Ok(confirm(&receipt)?)
    }

    /// Trade id the contract would assign to `call` right now.
    ///
    /// Informational only: a failed simulation is logged and the offer
    /// is still sent, so the node's own checks decide the outcome.
    async fn preview_trade_id(&self, call: &Marketplace::createTradeOfferCall) -> Option<U256> {
        let output = match self
            .connection
            .simulate(self.address, Bytes::from(call.abi_encode()))
            .await
        {
            Ok(output) => output,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "createTradeOffer preview failed; sending anyway");
                return None;
            }
        };

        match Marketplace::createTradeOfferCall::abi_decode_returns(&output, true) {
            Ok(decoded) => Some(decoded._0),
            Err(e) => {
                warn!(error = %e, "Undecodable createTradeOffer preview");
                None
            }
        }
    }
}

#[async_trait]
impl TradeMarketplace for MarketplaceClient {
    #[instrument(skip(self))]
    async fn create_trade_offer(
        &self,
        from_token_id: &str,
        to_address: &str,
        desired_token_id: &str,
    ) -> Result<TradeConfirmation> {
        let call = Marketplace::createTradeOfferCall {
            offeredTokenId: parse_uint("fromTokenId", from_token_id)?,
            to: parse_address("toAddress", to_address)?,
            requestedTokenId: parse_uint("desiredTokenId", desired_token_id)?,
        };

        let trade_id = self.preview_trade_id(&call).await;
        let confirmation = self.transact("createTradeOffer", call.abi_encode()).await?;

        info!(
            trade_id = ?trade_id,
            tx_hash = %confirmation.tx_hash,
            "Trade offer confirmed"
        );
        Ok(TradeConfirmation {
            tx_hash: confirmation.tx_hash,
            block_number: confirmation.block_number,
            trade_id,
        })
    }

    #[instrument(skip(self))]
    async fn accept_trade(&self, trade_id: &str) -> Result<TradeConfirmation> {
        let id = parse_uint("tradeId", trade_id)?;

        let call = Marketplace::acceptTradeCall { tradeId: id };
        let confirmation = self.transact("acceptTrade", call.abi_encode()).await?;

        info!(trade_id = %id, tx_hash = %confirmation.tx_hash, "Trade acceptance confirmed");
        Ok(TradeConfirmation {
            tx_hash: confirmation.tx_hash,
            block_number: confirmation.block_number,
            trade_id: Some(id),
        })
    }
}
