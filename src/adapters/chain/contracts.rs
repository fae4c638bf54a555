//! Contract Bindings and Artifacts
//!
//! `sol!` bindings for the calls this crate issues against GameAsset
//! and Marketplace, plus loading of the compiled creation bytecode
//! (Hardhat artifact JSON) for all three contracts.

use std::path::Path;

use alloy::network::ReceiptResponse;
use alloy::primitives::Bytes;
use alloy::rpc::types::TransactionReceipt;
use alloy::sol;
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::config::ArtifactsConfig;
use crate::domain::provisioning::{MARKETPLACE_CONTRACT, NFT_CONTRACT, TOKEN_CONTRACT};
use crate::ports::deployer::{ChainError, TxConfirmation};

sol! {
    /// ERC-721 collection minted by the deployer.
    contract GameAsset {
        event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);

        function mint(address to, string memory uri) external returns (uint256);
        function approve(address to, uint256 tokenId) external;
    }

    /// Listing and trade-offer marketplace.
    contract Marketplace {
        function listAsset(uint256 tokenId, uint256 price) external;
        function createTradeOffer(uint256 offeredTokenId, address to, uint256 requestedTokenId) external returns (uint256);
        function acceptTrade(uint256 tradeId) external;
    }
}

/// The fields of a Hardhat artifact this crate reads.
#[derive(Debug, Deserialize)]
struct HardhatArtifact {
    #[serde(rename = "contractName")]
    contract_name: Option<String>,
    bytecode: Bytes,
}

/// Creation bytecode of the three contracts.
#[derive(Debug, Clone)]
pub struct ContractArtifacts {
    pub quiz_token: Bytes,
    pub game_asset: Bytes,
    pub marketplace: Bytes,
}

impl ContractArtifacts {
    /// Load all three artifacts named in `[artifacts]`.
    pub fn load(config: &ArtifactsConfig) -> Result<Self> {
        Ok(Self {
            quiz_token: load_bytecode(TOKEN_CONTRACT, &config.quiz_token)?,
            game_asset: load_bytecode(NFT_CONTRACT, &config.game_asset)?,
            marketplace: load_bytecode(MARKETPLACE_CONTRACT, &config.marketplace)?,
        })
    }
}

/// Read the `bytecode` field of one artifact file.
pub fn load_bytecode(name: &str, path: &Path) -> Result<Bytes> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {name} artifact: {}", path.display()))?;
    let artifact: HardhatArtifact = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {name} artifact: {}", path.display()))?;

    anyhow::ensure!(
        !artifact.bytecode.is_empty(),
        "{name} artifact {} has empty bytecode (abstract contract or interface?)",
        path.display()
    );

    debug!(
        contract = name,
        artifact_name = ?artifact.contract_name,
        bytes = artifact.bytecode.len(),
        "Loaded contract artifact"
    );
    Ok(artifact.bytecode)
}

/// Turn a receipt into a confirmation, failing on a reverted status.
pub fn confirm(receipt: &TransactionReceipt) -> Result<TxConfirmation, ChainError> {
    if !receipt.status() {
        return Err(ChainError::Reverted {
            tx_hash: receipt.transaction_hash,
        });
    }
    Ok(TxConfirmation {
        tx_hash: receipt.transaction_hash,
        block_number: receipt.block_number,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_artifact(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{name}-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_hardhat_bytecode() {
        let path = write_artifact(
            "QuizToken",
            r#"{"_format":"hh-sol-artifact-1","contractName":"QuizToken","abi":[],"bytecode":"0x6080604052"}"#,
        );
        let code = load_bytecode(TOKEN_CONTRACT, &path).unwrap();
        assert_eq!(code.as_ref(), &[0x60, 0x80, 0x60, 0x40, 0x52]);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_rejects_empty_bytecode() {
        let path = write_artifact("IMarket", r#"{"contractName":"IMarket","bytecode":"0x"}"#);
        assert!(load_bytecode("IMarket", &path).is_err());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_artifact_names_contract() {
        let err = load_bytecode(NFT_CONTRACT, Path::new("does/not/exist.json")).unwrap_err();
        assert!(err.to_string().contains("GameAsset"));
    }
}
