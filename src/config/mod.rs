//! Configuration Module - TOML-based Configuration
//!
//! Loads and validates configuration from `config.toml`.
//! The RPC endpoint, artifact locations, asset batch and marketplace
//! address are externalized here; nothing environment-specific is
//! compiled into the binaries.

pub mod loader;

use std::path::PathBuf;

use alloy::primitives::{Address, U256};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use crate::domain::provisioning::ProvisioningPlan;
use crate::domain::units::to_base_units;

/// Top-level configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before any connection is opened.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Application identity and logging.
  #[serde(default)]
  pub app: AppSection,
  /// RPC endpoint and signer.
  pub network: NetworkConfig,
  /// Compiled contract artifacts used for deployment.
  #[serde(default)]
  pub artifacts: ArtifactsConfig,
  /// Optional mint-and-list phase.
  #[serde(default)]
  pub assets: AssetsConfig,
  /// Deployment progress persistence.
  #[serde(default)]
  pub checkpoint: CheckpointConfig,
  /// Marketplace used by the trade client.
  pub marketplace: MarketplaceConfig,
}

/// Application identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
  /// Human-readable name.
  #[serde(default = "default_name")]
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Log output format.
  #[serde(default)]
  pub log_format: LogFormat,
  /// Print the deployment plan without sending transactions.
  #[serde(default)]
  pub dry_run: bool,
}

impl Default for AppSection {
  fn default() -> Self {
    Self {
      name: default_name(),
      log_level: default_log_level(),
      log_format: LogFormat::default(),
      dry_run: false,
    }
  }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
  /// Structured JSON lines.
  #[default]
  Json,
  /// Human-readable lines.
  Pretty,
}

/// Network configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
  /// JSON-RPC endpoint.
  pub rpc_url: String,
  /// Refuse to run against any other chain when set.
  pub expected_chain_id: Option<u64>,
  /// Environment variable holding the hex private key of the signer.
  #[serde(default = "default_private_key_env")]
  pub private_key_env: String,
}

/// Paths to compiled contract artifacts (Hardhat JSON with `bytecode`).
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
  #[serde(default = "default_token_artifact")]
  pub quiz_token: PathBuf,
  #[serde(default = "default_nft_artifact")]
  pub game_asset: PathBuf,
  #[serde(default = "default_marketplace_artifact")]
  pub marketplace: PathBuf,
}

impl Default for ArtifactsConfig {
  fn default() -> Self {
    Self {
      quiz_token: default_token_artifact(),
      game_asset: default_nft_artifact(),
      marketplace: default_marketplace_artifact(),
    }
  }
}

/// Mint-and-list phase configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetsConfig {
  /// Run the phase at all.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// URIs minted to the deployer, in order.
  #[serde(default = "default_metadata_uris")]
  pub metadata_uris: Vec<String>,
  /// Listing price in whole QuizToken units.
  #[serde(default = "default_listing_price")]
  pub listing_price: Decimal,
  /// Decimals of the QuizToken.
  #[serde(default = "default_token_decimals")]
  pub token_decimals: u32,
}

impl Default for AssetsConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      metadata_uris: default_metadata_uris(),
      listing_price: default_listing_price(),
      token_decimals: default_token_decimals(),
    }
  }
}

impl AssetsConfig {
  /// Listing price in token base units.
  pub fn listing_price_units(&self) -> Result<U256> {
    to_base_units(self.listing_price, self.token_decimals)
      .context("Invalid assets.listing_price")
  }
}

/// Checkpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckpointConfig {
  /// Persist progress and resume unfinished runs.
  #[serde(default)]
  pub enabled: bool,
  /// Checkpoint file location.
  #[serde(default = "default_checkpoint_path")]
  pub path: PathBuf,
}

impl Default for CheckpointConfig {
  fn default() -> Self {
    Self {
      enabled: false,
      path: default_checkpoint_path(),
    }
  }
}

/// Marketplace configuration for the trade client.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketplaceConfig {
  /// Deployed marketplace address.
  pub address: Address,
}

impl AppConfig {
  /// Build the provisioning plan described by `[assets]`.
  pub fn provisioning_plan(&self) -> Result<ProvisioningPlan> {
    if !self.assets.enabled {
      return Ok(ProvisioningPlan::contracts_only());
    }
    Ok(ProvisioningPlan::with_assets(
      self.assets.metadata_uris.clone(),
      self.assets.listing_price_units()?,
    ))
  }
}

// Default value functions for serde

fn default_name() -> String {
  "game-asset-market".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_private_key_env() -> String {
  "PRIVATE_KEY".to_string()
}

fn default_true() -> bool {
  true
}

fn default_token_artifact() -> PathBuf {
  PathBuf::from("artifacts/contracts/QuizToken.sol/QuizToken.json")
}

fn default_nft_artifact() -> PathBuf {
  PathBuf::from("artifacts/contracts/GameAsset.sol/GameAsset.json")
}

fn default_marketplace_artifact() -> PathBuf {
  PathBuf::from("artifacts/contracts/Marketplace.sol/Marketplace.json")
}

fn default_metadata_uris() -> Vec<String> {
  [
    "ipfs://game-assets/sword.json",
    "ipfs://game-assets/shield.json",
    "ipfs://game-assets/helmet.json",
    "ipfs://game-assets/potion.json",
  ]
  .into_iter()
  .map(String::from)
  .collect()
}

fn default_listing_price() -> Decimal {
  dec!(5)
}

fn default_token_decimals() -> u32 {
  18
}

fn default_checkpoint_path() -> PathBuf {
  PathBuf::from("data/deployment.json")
}
