//! Provisioning State Machine
//!
//! Models the deployment workflow as an explicit state machine over a
//! `DeploymentCheckpoint`. The checkpoint records what is confirmed
//! on-chain; `next_step` derives the single step that may run next.
//!
//! Ordering encoded here:
//! 1. QuizToken, then GameAsset
//! 2. One mint per metadata URI, in list order
//! 3. Marketplace, only once both dependency addresses are recorded
//! 4. Per minted token: approve, then list
//!
//! No I/O happens in this module. The `Provisioner` use case executes
//! the returned steps and feeds the outcomes back through `record`.

use std::fmt;

use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Contract name of the fungible payment token.
pub const TOKEN_CONTRACT: &str = "QuizToken";
/// Contract name of the NFT collection.
pub const NFT_CONTRACT: &str = "GameAsset";
/// Contract name of the marketplace.
pub const MARKETPLACE_CONTRACT: &str = "Marketplace";

/// Errors detected while driving the state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvisionError {
    #[error("checkpoint was recorded on chain {recorded}, connected chain is {current}")]
    ChainMismatch { recorded: u64, current: u64 },

    #[error("checkpoint was recorded by deployer {recorded}, current signer is {current}")]
    DeployerMismatch { recorded: Address, current: Address },

    #[error("checkpoint minted `{recorded}` at position {position}, plan expects {expected:?}")]
    AssetPlanMismatch {
        position: usize,
        recorded: String,
        expected: Option<String>,
    },

    #[error("checkpoint listed token {token_id} at {recorded}, plan price is {expected}")]
    PriceMismatch {
        token_id: U256,
        recorded: U256,
        expected: U256,
    },

    #[error("{contract} recorded at {address} has no deployed code")]
    MissingCode {
        contract: &'static str,
        address: Address,
    },

    #[error("step `{step}` produced an unexpected outcome: {outcome:?}")]
    UnexpectedOutcome { step: String, outcome: StepOutcome },
}

/// What a run should do once the three contracts exist.
///
/// An empty URI list disables the mint-and-list phase entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningPlan {
    /// Metadata URIs minted to the deployer, in order.
    pub metadata_uris: Vec<String>,
    /// Listing price in token base units.
    pub listing_price: U256,
}

impl ProvisioningPlan {
    /// Deploy the three contracts and nothing else.
    pub const fn contracts_only() -> Self {
        Self {
            metadata_uris: Vec::new(),
            listing_price: U256::ZERO,
        }
    }

    /// Deploy, then mint and list one asset per URI at `listing_price`.
    pub const fn with_assets(metadata_uris: Vec<String>, listing_price: U256) -> Self {
        Self {
            metadata_uris,
            listing_price,
        }
    }

    /// Whether the mint-and-list phase runs.
    pub fn has_asset_phase(&self) -> bool {
        !self.metadata_uris.is_empty()
    }

    /// Number of state-changing remote calls a fresh run issues.
    pub fn total_steps(&self) -> usize {
        3 + 3 * self.metadata_uris.len()
    }
}

/// A single remote operation, carrying every input it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningStep {
    /// Deploy QuizToken with no constructor arguments.
    DeployToken,
    /// Deploy GameAsset with no constructor arguments.
    DeployNft,
    /// `mint(owner, uri)` on the NFT contract.
    Mint {
        nft: Address,
        owner: Address,
        position: usize,
        uri: String,
    },
    /// Deploy the marketplace bound to both dependencies.
    DeployMarketplace { token: Address, nft: Address },
    /// `approve(marketplace, tokenId)` on the NFT contract.
    Approve {
        nft: Address,
        marketplace: Address,
        token_id: U256,
    },
    /// `listAsset(tokenId, price)` on the marketplace.
    List {
        marketplace: Address,
        token_id: U256,
        price: U256,
    },
}

impl fmt::Display for ProvisioningStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeployToken => write!(f, "deploy {TOKEN_CONTRACT}"),
            Self::DeployNft => write!(f, "deploy {NFT_CONTRACT}"),
            Self::Mint { position, uri, .. } => write!(f, "mint #{position} ({uri})"),
            Self::DeployMarketplace { .. } => write!(f, "deploy {MARKETPLACE_CONTRACT}"),
            Self::Approve { token_id, .. } => write!(f, "approve token {token_id}"),
            Self::List {
                token_id, price, ..
            } => write!(f, "list token {token_id} at {price}"),
        }
    }
}

/// Confirmed result of executing a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// A contract creation receipt with its address.
    Deployed(Address),
    /// A mint receipt with the assigned token id.
    Minted(U256),
    /// Any other confirmed transaction.
    Confirmed,
}

/// One minted asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintedAsset {
    /// Zero-based position of the URI in the plan.
    pub position: usize,
    /// Metadata URI passed to `mint`.
    pub uri: String,
    /// Id assigned by the NFT contract.
    pub token_id: U256,
}

/// Approval and listing progress of one minted asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedAsset {
    pub token_id: U256,
    pub price: U256,
    pub approved: bool,
    pub listed: bool,
}

/// Persisted progress of one deployment run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentCheckpoint {
    /// Unique run identifier.
    pub run_id: Uuid,
    /// Chain the run targets.
    pub chain_id: u64,
    /// Signer that owns every transaction of the run.
    pub deployer: Address,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// QuizToken address once confirmed.
    pub token: Option<Address>,
    /// GameAsset address once confirmed.
    pub nft: Option<Address>,
    /// Minted assets in plan order.
    #[serde(default)]
    pub minted: Vec<MintedAsset>,
    /// Marketplace address once confirmed.
    pub marketplace: Option<Address>,
    /// Approval/listing progress in mint order.
    #[serde(default)]
    pub listings: Vec<ListedAsset>,
    /// Set once every step of the plan is confirmed.
    #[serde(default)]
    pub completed: bool,
}

impl DeploymentCheckpoint {
    /// Start a fresh run.
    pub fn new(chain_id: u64, deployer: Address) -> Self {
        let now = Utc::now();
        Self {
            run_id: Uuid::new_v4(),
            chain_id,
            deployer,
            started_at: now,
            updated_at: now,
            token: None,
            nft: None,
            minted: Vec::new(),
            marketplace: None,
            listings: Vec::new(),
            completed: false,
        }
    }

    /// The next step to execute, or `None` when the plan is done.
    pub fn next_step(&self, plan: &ProvisioningPlan) -> Option<ProvisioningStep> {
        let Some(token) = self.token else {
            return Some(ProvisioningStep::DeployToken);
        };
        let Some(nft) = self.nft else {
            return Some(ProvisioningStep::DeployNft);
        };

        if let Some(uri) = plan.metadata_uris.get(self.minted.len()) {
            return Some(ProvisioningStep::Mint {
                nft,
                owner: self.deployer,
                position: self.minted.len(),
                uri: uri.clone(),
            });
        }

        let Some(marketplace) = self.marketplace else {
            return Some(ProvisioningStep::DeployMarketplace { token, nft });
        };

        for asset in &self.minted {
            match self.listing(asset.token_id) {
                Some(listing) if listing.listed => {}
                Some(listing) if listing.approved => {
                    return Some(ProvisioningStep::List {
                        marketplace,
                        token_id: asset.token_id,
                        price: listing.price,
                    });
                }
                _ => {
                    return Some(ProvisioningStep::Approve {
                        nft,
                        marketplace,
                        token_id: asset.token_id,
                    });
                }
            }
        }

        None
    }

    /// Apply the confirmed outcome of `step`.
    ///
    /// `plan` supplies the listing price recorded at approval time.
    pub fn record(
        &mut self,
        plan: &ProvisioningPlan,
        step: &ProvisioningStep,
        outcome: StepOutcome,
    ) -> Result<(), ProvisionError> {
        match (step, &outcome) {
            (ProvisioningStep::DeployToken, StepOutcome::Deployed(address)) => {
                self.token = Some(*address);
            }
            (ProvisioningStep::DeployNft, StepOutcome::Deployed(address)) => {
                self.nft = Some(*address);
            }
            (ProvisioningStep::Mint { position, uri, .. }, StepOutcome::Minted(token_id)) => {
                self.minted.push(MintedAsset {
                    position: *position,
                    uri: uri.clone(),
                    token_id: *token_id,
                });
            }
            (ProvisioningStep::DeployMarketplace { .. }, StepOutcome::Deployed(address)) => {
                self.marketplace = Some(*address);
            }
            (ProvisioningStep::Approve { token_id, .. }, StepOutcome::Confirmed) => {
                self.listings.push(ListedAsset {
                    token_id: *token_id,
                    price: plan.listing_price,
                    approved: true,
                    listed: false,
                });
            }
            (ProvisioningStep::List { token_id, .. }, StepOutcome::Confirmed) => {
                match self.listings.iter_mut().find(|l| l.token_id == *token_id) {
                    Some(listing) => listing.listed = true,
                    None => {
                        return Err(ProvisionError::UnexpectedOutcome {
                            step: step.to_string(),
                            outcome: outcome.clone(),
                        });
                    }
                }
            }
            _ => {
                return Err(ProvisionError::UnexpectedOutcome {
                    step: step.to_string(),
                    outcome: outcome.clone(),
                });
            }
        }

        self.updated_at = Utc::now();
        Ok(())
    }

    /// Mark the run complete once `next_step` returns `None`.
    pub fn finish(&mut self) {
        self.completed = true;
        self.updated_at = Utc::now();
    }

    /// Check that this checkpoint can be resumed by the current run.
    pub fn ensure_compatible(
        &self,
        chain_id: u64,
        deployer: Address,
        plan: &ProvisioningPlan,
    ) -> Result<(), ProvisionError> {
        if self.chain_id != chain_id {
            return Err(ProvisionError::ChainMismatch {
                recorded: self.chain_id,
                current: chain_id,
            });
        }
        if self.deployer != deployer {
            return Err(ProvisionError::DeployerMismatch {
                recorded: self.deployer,
                current: deployer,
            });
        }

        for asset in &self.minted {
            let expected = plan.metadata_uris.get(asset.position);
            if expected != Some(&asset.uri) {
                return Err(ProvisionError::AssetPlanMismatch {
                    position: asset.position,
                    recorded: asset.uri.clone(),
                    expected: expected.cloned(),
                });
            }
        }

        for listing in &self.listings {
            if listing.price != plan.listing_price {
                return Err(ProvisionError::PriceMismatch {
                    token_id: listing.token_id,
                    recorded: listing.price,
                    expected: plan.listing_price,
                });
            }
        }

        Ok(())
    }

    /// Contracts recorded so far, by name.
    pub fn deployed_contracts(&self) -> Vec<(&'static str, Address)> {
        [
            (TOKEN_CONTRACT, self.token),
            (NFT_CONTRACT, self.nft),
            (MARKETPLACE_CONTRACT, self.marketplace),
        ]
        .into_iter()
        .filter_map(|(name, address)| address.map(|a| (name, a)))
        .collect()
    }

    fn listing(&self, token_id: U256) -> Option<&ListedAsset> {
        self.listings.iter().find(|l| l.token_id == token_id)
    }
}

/// Every step a fresh run of `plan` would issue, in order.
///
/// Contract addresses are placeholders (zero) and token ids follow
/// mint order, so this is only meant for previews.
pub fn planned_steps(deployer: Address, plan: &ProvisioningPlan) -> Vec<ProvisioningStep> {
    let mut checkpoint = DeploymentCheckpoint::new(0, deployer);
    let mut steps = Vec::with_capacity(plan.total_steps());

    while let Some(step) = checkpoint.next_step(plan) {
        let outcome = match &step {
            ProvisioningStep::DeployToken
            | ProvisioningStep::DeployNft
            | ProvisioningStep::DeployMarketplace { .. } => StepOutcome::Deployed(Address::ZERO),
            ProvisioningStep::Mint { position, .. } => StepOutcome::Minted(U256::from(*position)),
            ProvisioningStep::Approve { .. } | ProvisioningStep::List { .. } => {
                StepOutcome::Confirmed
            }
        };
        if checkpoint.record(plan, &step, outcome).is_err() {
            break;
        }
        steps.push(step);
    }

    steps
}
