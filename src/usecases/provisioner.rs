//! Provisioner - Deployment Workflow Execution
//!
//! Drives `DeploymentCheckpoint::next_step` until the plan is done:
//! - Execute exactly one remote step and await its confirmation
//! - Record the outcome and save the checkpoint
//! - Only then ask the state machine for the next step
//!
//! Any failure aborts the run. With a durable checkpoint store the
//! next run resumes after the last confirmed step; otherwise it
//! starts over with fresh contracts. An optional reporter receives
//! one line per confirmed step as soon as it is recorded, so a failed
//! run still leaves the addresses it created on stdout.

use std::fmt;
use std::sync::Arc;

use alloy::primitives::{Address, U256};
use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use crate::domain::provisioning::{
  DeploymentCheckpoint, MARKETPLACE_CONTRACT, NFT_CONTRACT, ProvisionError, ProvisioningPlan,
  ProvisioningStep, StepOutcome, TOKEN_CONTRACT,
};
use crate::ports::deployer::ContractDeployer;
use crate::ports::repository::CheckpointStore;

/// Summary of a finished run.
#[derive(Debug, Clone)]
pub struct ProvisioningReport {
  /// Final checkpoint (completed).
  pub checkpoint: DeploymentCheckpoint,
  /// Whether the run continued an earlier checkpoint.
  pub resumed: bool,
  /// Steps executed by this process.
  pub steps_executed: usize,
}

impl ProvisioningReport {
  /// QuizToken address.
  pub const fn token(&self) -> Option<Address> {
    self.checkpoint.token
  }

  /// GameAsset address.
  pub const fn nft(&self) -> Option<Address> {
    self.checkpoint.nft
  }

  /// Marketplace address.
  pub const fn marketplace(&self) -> Option<Address> {
    self.checkpoint.marketplace
  }
}

impl fmt::Display for ProvisioningReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let cp = &self.checkpoint;
    if let Some(address) = cp.token {
      writeln!(f, "{TOKEN_CONTRACT} deployed at: {address}")?;
    }
    if let Some(address) = cp.nft {
      writeln!(f, "{NFT_CONTRACT} deployed at: {address}")?;
    }
    for asset in &cp.minted {
      writeln!(f, "Minted token {} with URI {}", asset.token_id, asset.uri)?;
    }
    if let Some(address) = cp.marketplace {
      writeln!(f, "{MARKETPLACE_CONTRACT} deployed at: {address}")?;
    }
    for listing in cp.listings.iter().filter(|l| l.listed) {
      writeln!(f, "Listed token {} at price {}", listing.token_id, listing.price)?;
    }
    Ok(())
  }
}

/// Receives the user-facing line of each confirmed step.
pub type ProgressReporter = Box<dyn Fn(&str) + Send + Sync>;

/// The line announcing a confirmed step, if it has one.
///
/// Approvals are silent; everything else matches the report lines.
pub fn progress_line(step: &ProvisioningStep, outcome: &StepOutcome) -> Option<String> {
  match (step, outcome) {
    (ProvisioningStep::DeployToken, StepOutcome::Deployed(address)) => {
      Some(format!("{TOKEN_CONTRACT} deployed at: {address}"))
    }
    (ProvisioningStep::DeployNft, StepOutcome::Deployed(address)) => {
      Some(format!("{NFT_CONTRACT} deployed at: {address}"))
    }
    (ProvisioningStep::Mint { uri, .. }, StepOutcome::Minted(token_id)) => {
      Some(format!("Minted token {token_id} with URI {uri}"))
    }
    (ProvisioningStep::DeployMarketplace { .. }, StepOutcome::Deployed(address)) => {
      Some(format!("{MARKETPLACE_CONTRACT} deployed at: {address}"))
    }
    (ProvisioningStep::List { token_id, price, .. }, StepOutcome::Confirmed) => {
      Some(format!("Listed token {token_id} at price {price}"))
    }
    _ => None,
  }
}

/// Runs a `ProvisioningPlan` against a `ContractDeployer`.
pub struct Provisioner<D: ContractDeployer> {
  /// Signer-bound chain port.
  deployer: Arc<D>,
  /// Progress persistence.
  store: Arc<dyn CheckpointStore>,
  /// What to deploy, mint and list.
  plan: ProvisioningPlan,
  /// Per-step output, if any.
  reporter: Option<ProgressReporter>,
}

impl<D: ContractDeployer> Provisioner<D> {
  /// Create a new provisioner.
  pub fn new(deployer: Arc<D>, store: Arc<dyn CheckpointStore>, plan: ProvisioningPlan) -> Self {
    Self {
      deployer,
      store,
      plan,
      reporter: None,
    }
  }

  /// Announce each confirmed step through `reporter`.
  #[must_use]
  pub fn with_reporter(mut self, reporter: ProgressReporter) -> Self {
    self.reporter = Some(reporter);
    self
  }

  /// Execute every remaining step, strictly one after another.
  #[instrument(skip(self), fields(assets = self.plan.metadata_uris.len()))]
  pub async fn run(&self) -> Result<ProvisioningReport> {
    let chain_id = self
      .deployer
      .chain_id()
      .await
      .context("Failed to read chain id")?;
    let deployer = self.deployer.deployer();

    let (mut checkpoint, resumed) = self.start(chain_id, deployer).await?;
    let mut steps_executed = 0;

    while let Some(step) = checkpoint.next_step(&self.plan) {
      info!(
        run_id = %checkpoint.run_id,
        step = %step,
        "Executing provisioning step"
      );

      let outcome = self
        .execute(&step)
        .await
        .with_context(|| format!("Provisioning step `{step}` failed"))?;

      let line = progress_line(&step, &outcome);
      checkpoint.record(&self.plan, &step, outcome)?;
      if let (Some(report), Some(line)) = (&self.reporter, line) {
        report(line.as_str());
      }
      self
        .store
        .save(&checkpoint)
        .await
        .context("Failed to save deployment checkpoint")?;
      steps_executed += 1;
    }

    checkpoint.finish();
    self
      .store
      .save(&checkpoint)
      .await
      .context("Failed to save completed checkpoint")?;

    info!(
      run_id = %checkpoint.run_id,
      steps_executed,
      resumed,
      "Provisioning complete"
    );

    Ok(ProvisioningReport {
      checkpoint,
      resumed,
      steps_executed,
    })
  }

  /// Resume an unfinished checkpoint or open a fresh one.
  async fn start(&self, chain_id: u64, deployer: Address) -> Result<(DeploymentCheckpoint, bool)> {
    let existing = self
      .store
      .load()
      .await
      .context("Failed to load deployment checkpoint")?;

    match existing {
      Some(checkpoint) if !checkpoint.completed => {
        checkpoint.ensure_compatible(chain_id, deployer, &self.plan)?;
        self.verify_recorded_code(&checkpoint).await?;
        info!(
          run_id = %checkpoint.run_id,
          minted = checkpoint.minted.len(),
          listed = checkpoint.listings.iter().filter(|l| l.listed).count(),
          "Resuming unfinished deployment"
        );
        Ok((checkpoint, true))
      }
      Some(previous) => {
        info!(
          previous_run = %previous.run_id,
          "Previous deployment completed, starting a new run"
        );
        Ok((DeploymentCheckpoint::new(chain_id, deployer), false))
      }
      None => Ok((DeploymentCheckpoint::new(chain_id, deployer), false)),
    }
  }

  /// Every contract a checkpoint recorded must still have code.
  async fn verify_recorded_code(&self, checkpoint: &DeploymentCheckpoint) -> Result<()> {
    for (contract, address) in checkpoint.deployed_contracts() {
      let has_code = self
        .deployer
        .has_code(address)
        .await
        .with_context(|| format!("Failed to verify recorded {contract}"))?;
      if !has_code {
        return Err(ProvisionError::MissingCode { contract, address }.into());
      }
    }
    Ok(())
  }

  /// Issue one remote call and wait for its confirmation.
  async fn execute(&self, step: &ProvisioningStep) -> Result<StepOutcome> {
    let outcome = match step {
      ProvisioningStep::DeployToken => {
        StepOutcome::Deployed(self.deployer.deploy_token().await?.address)
      }
      ProvisioningStep::DeployNft => {
        StepOutcome::Deployed(self.deployer.deploy_nft().await?.address)
      }
      ProvisioningStep::Mint {
        nft,
        owner,
        position,
        uri,
      } => {
        let receipt = self.deployer.mint(*nft, *owner, uri).await?;
        if receipt.token_id != U256::from(*position) {
          warn!(
            position,
            token_id = %receipt.token_id,
            "Minted id differs from URI position; using on-chain id"
          );
        }
        StepOutcome::Minted(receipt.token_id)
      }
      ProvisioningStep::DeployMarketplace { token, nft } => {
        StepOutcome::Deployed(self.deployer.deploy_marketplace(*token, *nft).await?.address)
      }
      ProvisioningStep::Approve {
        nft,
        marketplace,
        token_id,
      } => {
        self.deployer.approve(*nft, *marketplace, *token_id).await?;
        StepOutcome::Confirmed
      }
      ProvisioningStep::List {
        marketplace,
        token_id,
        price,
      } => {
        self.deployer.list_asset(*marketplace, *token_id, *price).await?;
        StepOutcome::Confirmed
      }
    };
    Ok(outcome)
  }
}
