//! On-chain Deployer — `ContractDeployer` over alloy-rs
//!
//! Sends creation transactions built from the loaded artifacts and
//! the GameAsset/Marketplace setup calls. Every method waits for the
//! receipt and checks its status before returning.

use std::sync::Arc;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::sol_types::{SolCall, SolValue};
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, instrument};

use super::contracts::{ContractArtifacts, GameAsset, Marketplace, confirm};
use super::provider::ChainConnection;
use super::validator::ContractValidator;
use crate::domain::provisioning::{MARKETPLACE_CONTRACT, NFT_CONTRACT, TOKEN_CONTRACT};
use crate::ports::deployer::{
    ChainError, ContractDeployer, Deployment, MintReceipt, TxConfirmation,
};

/// Implements the deployment workflow's remote calls via alloy-rs 0.9.
pub struct OnChainDeployer {
    /// Shared signer-bound connection.
    connection: Arc<ChainConnection>,
    /// Creation bytecode for the three contracts.
    artifacts: ContractArtifacts,
    /// Code existence checks for resumed runs.
    validator: ContractValidator,
}

impl OnChainDeployer {
    /// Create a deployer over an established connection.
    pub fn new(connection: Arc<ChainConnection>, artifacts: ContractArtifacts) -> Self {
        let validator = ContractValidator::new(connection.inner());
        Self {
            connection,
            artifacts,
            validator,
        }
    }

    /// Send a contract creation transaction and wait for its receipt.
    async fn deploy(&self, name: &str, code: Bytes) -> Result<Deployment> {
        let tx = TransactionRequest::default().with_deploy_code(code);

        let receipt = self
            .connection
            .submit(tx)
            .await
            .with_context(|| format!("{name} deployment failed"))?;
        let confirmation = confirm(&receipt)?;
        let address = receipt
            .contract_address
            .ok_or(ChainError::MissingContractAddress {
                tx_hash: confirmation.tx_hash,
            })?;

        info!(contract = name, %address, tx_hash = %confirmation.tx_hash, "Contract deployed");
        Ok(Deployment {
            address,
            confirmation,
        })
    }

    /// Send `input` to `to` and wait for a successful receipt.
    async fn transact(
        &self,
        label: &str,
        to: Address,
        input: Vec<u8>,
    ) -> Result<(TransactionReceipt, TxConfirmation)> {
        let tx = TransactionRequest::default()
            .to(to)
            .input(Bytes::from(input).into());

        let receipt = self
            .connection
            .submit(tx)
            .await
            .with_context(|| format!("{label} failed"))?;
        let confirmation = confirm(&receipt)?;
        Ok((receipt, confirmation))
    }
}

#[async_trait]
impl ContractDeployer for OnChainDeployer {
    fn deployer(&self) -> Address {
        self.connection.signer_address()
    }

    async fn chain_id(&self) -> Result<u64> {
        Ok(self.connection.chain_id())
    }

    #[instrument(skip(self))]
    async fn deploy_token(&self) -> Result<Deployment> {
        self.deploy(TOKEN_CONTRACT, self.artifacts.quiz_token.clone())
            .await
    }

    #[instrument(skip(self))]
    async fn deploy_nft(&self) -> Result<Deployment> {
        self.deploy(NFT_CONTRACT, self.artifacts.game_asset.clone())
            .await
    }

    #[instrument(skip(self))]
    async fn deploy_marketplace(&self, token: Address, nft: Address) -> Result<Deployment> {
        // Creation code followed by the ABI-encoded constructor(token, nft)
        let mut code = self.artifacts.marketplace.to_vec();
        code.extend_from_slice(&(token, nft).abi_encode_params());
        self.deploy(MARKETPLACE_CONTRACT, Bytes::from(code)).await
    }

    #[instrument(skip(self))]
    async fn mint(&self, nft: Address, owner: Address, uri: &str) -> Result<MintReceipt> {
        let call = GameAsset::mintCall {
            to: owner,
            uri: uri.to_string(),
        };
        let (receipt, confirmation) = self.transact("mint", nft, call.abi_encode()).await?;

        let token_id = receipt
            .inner
            .logs()
            .iter()
            .filter(|log| log.address() == nft)
            .filter_map(|log| log.log_decode::<GameAsset::Transfer>().ok())
            .map(|decoded| decoded.inner.data)
            .find(|transfer| transfer.from == Address::ZERO)
            .map(|transfer| transfer.tokenId)
            .ok_or(ChainError::MissingTransferEvent {
                tx_hash: confirmation.tx_hash,
            })?;

        info!(%token_id, %uri, tx_hash = %confirmation.tx_hash, "Asset minted");
        Ok(MintReceipt {
            token_id,
            confirmation,
        })
    }

    #[instrument(skip(self))]
    async fn approve(
        &self,
        nft: Address,
        spender: Address,
        token_id: U256,
    ) -> Result<TxConfirmation> {
        let call = GameAsset::approveCall {
            to: spender,
            tokenId: token_id,
        };
        let (_, confirmation) = self.transact("approve", nft, call.abi_encode()).await?;

        info!(%token_id, %spender, tx_hash = %confirmation.tx_hash, "Marketplace approved");
        Ok(confirmation)
    }

    #[instrument(skip(self))]
    async fn list_asset(
        &self,
        marketplace: Address,
        token_id: U256,
        price: U256,
    ) -> Result<TxConfirmation> {
        let call = Marketplace::listAssetCall {
            tokenId: token_id,
            price,
        };
        let (_, confirmation) = self
            .transact("listAsset", marketplace, call.abi_encode())
            .await?;

        info!(%token_id, %price, tx_hash = %confirmation.tx_hash, "Asset listed");
        Ok(confirmation)
    }

    async fn has_code(&self, address: Address) -> Result<bool> {
        self.validator.has_code(address).await
    }
}
