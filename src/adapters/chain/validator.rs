//! Contract Validator — Deployed Code Checks
//!
//! Confirms that an address holds contract code (not an EOA or a
//! typo). Used before the trade client sends to the configured
//! marketplace and when a deployment resumes from a checkpoint.

use alloy::primitives::Address;
use alloy::providers::Provider;
use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use super::provider::SharedProvider;

/// Checks addresses against on-chain state.
pub struct ContractValidator {
    /// Alloy provider for on-chain queries.
    provider: SharedProvider,
}

impl ContractValidator {
    /// Create a new validator with the given provider.
    pub fn new(provider: SharedProvider) -> Self {
        Self { provider }
    }

    /// Whether `address` holds deployed code.
    pub async fn has_code(&self, address: Address) -> Result<bool> {
        let code = self
            .provider
            .get_code_at(address)
            .await
            .with_context(|| format!("Failed to query code at {address}"))?;
        Ok(!code.is_empty())
    }

    /// Fail unless `address` holds deployed code.
    #[instrument(skip(self))]
    pub async fn ensure_deployed(&self, name: &str, address: Address) -> Result<()> {
        if !self.has_code(address).await? {
            warn!(contract = name, %address, "Contract has no code — possible misconfiguration");
            anyhow::bail!("{name} at {address} has no deployed code — check config.toml");
        }
        info!(contract = name, %address, "Contract validated: code exists on-chain");
        Ok(())
    }
}
