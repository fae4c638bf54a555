//! Repository Port - Deployment Progress Persistence
//!
//! Stores the single `DeploymentCheckpoint` of the current run so a
//! failed deployment can resume where it stopped instead of
//! redeploying confirmed contracts.

use async_trait::async_trait;

use crate::domain::provisioning::DeploymentCheckpoint;

/// Trait for checkpoint persistence providers.
#[async_trait]
pub trait CheckpointStore: Send + Sync + 'static {
  /// Load the stored checkpoint, `None` if nothing was saved.
  async fn load(&self) -> anyhow::Result<Option<DeploymentCheckpoint>>;

  /// Replace the stored checkpoint.
  async fn save(&self, checkpoint: &DeploymentCheckpoint) -> anyhow::Result<()>;
}
