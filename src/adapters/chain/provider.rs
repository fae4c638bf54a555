//! RPC Provider - alloy-rs 0.9 Connection Management
//!
//! Builds the signer-bound provider shared by every chain adapter.
//! The private key is read from the environment variable named in
//! config and never logged. The chain id is checked at startup
//! when `network.expected_chain_id` is set.
//!
//! In alloy 0.9, `ProviderBuilder` returns a deeply nested filler
//! type. We store it as a type-erased `dyn Provider` to keep the
//! API clean across the adapter layer.

use std::sync::Arc;

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, Bytes};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::http::reqwest::Url;
use alloy::transports::http::{Client, Http};
use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use crate::config::NetworkConfig;
use crate::ports::deployer::ChainError;

/// HTTP transport used by every provider in this crate.
pub type HttpTransport = Http<Client>;

/// Type-erased, signer-bound provider.
pub type SharedProvider = Arc<dyn Provider<HttpTransport> + Send + Sync>;

/// Signer-bound connection to the configured network.
///
/// All chain adapters share one instance so nonces are managed by
/// a single filler stack.
pub struct ChainConnection {
    /// Wallet-filled provider (type-erased).
    provider: SharedProvider,
    /// Address of the signing identity.
    signer_address: Address,
    /// Chain id reported by the node at connect time.
    chain_id: u64,
}

impl ChainConnection {
    /// Load the signer, connect to the RPC endpoint and validate the chain id.
    #[instrument(skip_all, fields(rpc_url = %network.rpc_url))]
    pub async fn connect(network: &NetworkConfig) -> Result<Self> {
        let key = std::env::var(&network.private_key_env)
            .with_context(|| format!("{} not set", network.private_key_env))?;
        let signer: PrivateKeySigner = key
            .trim()
            .parse()
            .with_context(|| format!("Invalid private key in {}", network.private_key_env))?;

        Self::with_signer(&network.rpc_url, signer, network.expected_chain_id).await
    }

    /// Connect `signer` to `rpc_url` and validate the chain id.
    pub async fn with_signer(
        rpc_url: &str,
        signer: PrivateKeySigner,
        expected_chain_id: Option<u64>,
    ) -> Result<Self> {
        let signer_address = signer.address();

        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(EthereumWallet::from(signer))
            .on_http(rpc_url.parse::<Url>().context("Invalid RPC URL")?);

        // Wrap in Arc<dyn Provider> for type erasure
        let provider: SharedProvider = Arc::new(provider);

        let chain_id = provider
            .get_chain_id()
            .await
            .context("Failed to query chain ID")?;

        if let Some(expected) = expected_chain_id {
            if chain_id != expected {
                return Err(ChainError::ChainIdMismatch {
                    expected,
                    actual: chain_id,
                }
                .into());
            }
        }

        info!(chain_id, signer = %signer_address, "Connected to RPC");

        Ok(Self {
            provider,
            signer_address,
            chain_id,
        })
    }

    /// Execute a read-only call as the signer.
    ///
    /// Fillers only run on sends, so `from` is set here explicitly;
    /// otherwise the node simulates with `msg.sender = 0x0`.
    pub async fn simulate(&self, to: Address, input: Bytes) -> Result<Bytes> {
        let tx = TransactionRequest::default()
            .from(self.signer_address)
            .to(to)
            .input(input.into());

        self.provider
            .call(&tx)
            .await
            .with_context(|| format!("eth_call to {to} failed"))
    }

    /// Sign and send `tx` from the signer, then wait for its receipt.
    pub async fn submit(&self, tx: TransactionRequest) -> Result<TransactionReceipt> {
        let tx = tx.from(self.signer_address);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .context("Failed to submit transaction")?;
        debug!(tx_hash = %pending.tx_hash(), "Transaction submitted");

        pending
            .get_receipt()
            .await
            .context("Failed waiting for receipt")
    }

    /// Get a shared reference to the alloy provider (type-erased).
    pub fn inner(&self) -> SharedProvider {
        Arc::clone(&self.provider)
    }

    /// Address transactions are signed by.
    pub const fn signer_address(&self) -> Address {
        self.signer_address
    }

    /// Chain id observed at connect time.
    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }
}
