//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;
use crate::domain::units::MAX_TOKEN_DECIMALS;

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "GAME_MARKET_CONFIG";

/// Default config file location.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Config path from `GAME_MARKET_CONFIG`, or `config.toml`.
pub fn config_path() -> String {
  std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    rpc_url = %config.network.rpc_url,
    assets = config.assets.enabled,
    checkpoint = config.checkpoint.enabled,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig = toml::from_str(content).context("Failed to parse config.toml")?;
  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - A usable RPC endpoint and signer variable name
/// - A non-empty asset batch when the asset phase is on
/// - A listing price representable in token base units
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    !config.network.rpc_url.trim().is_empty(),
    "network.rpc_url must not be empty"
  );
  anyhow::ensure!(
    !config.network.private_key_env.trim().is_empty(),
    "network.private_key_env must not be empty"
  );

  if config.assets.enabled {
    anyhow::ensure!(
      !config.assets.metadata_uris.is_empty(),
      "assets.metadata_uris must list at least one URI when assets.enabled = true"
    );
    for (i, uri) in config.assets.metadata_uris.iter().enumerate() {
      anyhow::ensure!(!uri.trim().is_empty(), "assets.metadata_uris[{i}] is empty");
    }
    anyhow::ensure!(
      config.assets.token_decimals <= MAX_TOKEN_DECIMALS,
      "assets.token_decimals must be at most {MAX_TOKEN_DECIMALS}, got {}",
      config.assets.token_decimals
    );
    config.assets.listing_price_units()?;
  }

  if config.checkpoint.enabled {
    anyhow::ensure!(
      !config.checkpoint.path.as_os_str().is_empty(),
      "checkpoint.path must not be empty when checkpoint.enabled = true"
    );
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::LogFormat;
  use alloy::primitives::{U256, address};
  use rust_decimal_macros::dec;

  const MINIMAL: &str = r#"
    [network]
    rpc_url = "http://127.0.0.1:8545"

    [marketplace]
    address = "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0"
  "#;

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_config("nonexistent.toml");
    assert!(result.is_err());
  }

  #[test]
  fn test_minimal_config_defaults() {
    let config = parse_config(MINIMAL).unwrap();
    assert_eq!(config.app.log_level, "info");
    assert_eq!(config.app.log_format, LogFormat::Json);
    assert!(!config.app.dry_run);
    assert_eq!(config.network.private_key_env, "PRIVATE_KEY");
    assert_eq!(config.network.expected_chain_id, None);
    assert!(config.assets.enabled);
    assert_eq!(config.assets.metadata_uris.len(), 4);
    assert_eq!(config.assets.listing_price, dec!(5));
    assert!(!config.checkpoint.enabled);
    assert_eq!(
      config.marketplace.address,
      address!("9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0")
    );
  }

  #[test]
  fn test_default_plan_prices_five_tokens() {
    let config = parse_config(MINIMAL).unwrap();
    let plan = config.provisioning_plan().unwrap();
    let expected = U256::from(5u64) * U256::from(10u64).pow(U256::from(18u64));
    assert_eq!(plan.listing_price, expected);
    assert_eq!(plan.total_steps(), 15);
  }

  #[test]
  fn test_disabled_assets_plan() {
    let content = format!("{MINIMAL}\n[assets]\nenabled = false\n");
    let config = parse_config(&content).unwrap();
    let plan = config.provisioning_plan().unwrap();
    assert!(!plan.has_asset_phase());
    assert_eq!(plan.total_steps(), 3);
  }

  #[test]
  fn test_rejects_empty_uri_list() {
    let content = format!("{MINIMAL}\n[assets]\nmetadata_uris = []\n");
    assert!(parse_config(&content).is_err());
  }

  #[test]
  fn test_rejects_unscalable_price() {
    let content = format!("{MINIMAL}\n[assets]\nlisting_price = \"0.001\"\ntoken_decimals = 2\n");
    assert!(parse_config(&content).is_err());
  }

  #[test]
  fn test_rejects_bad_marketplace_address() {
    let content = r#"
      [network]
      rpc_url = "http://127.0.0.1:8545"

      [marketplace]
      address = "not-an-address"
    "#;
    assert!(parse_config(content).is_err());
  }

  #[test]
  fn test_rejects_empty_rpc_url() {
    let content = MINIMAL.replace("http://127.0.0.1:8545", "");
    assert!(parse_config(&content).is_err());
  }
}
