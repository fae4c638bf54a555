//! Checkpoint Store - Atomic JSON Deployment Progress
//!
//! Saves the deployment checkpoint to a JSON file using atomic writes
//! (write to tmp file, then rename), so the file is always either
//! the previous or the new checkpoint, never a partial write.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info, instrument};

use crate::domain::provisioning::DeploymentCheckpoint;
use crate::ports::repository::CheckpointStore;

/// Atomic JSON checkpoint file.
pub struct JsonCheckpointStore {
    /// Path to the checkpoint file.
    path: PathBuf,
    /// Temporary path for atomic writes.
    tmp_path: PathBuf,
}

impl JsonCheckpointStore {
    /// Create a store at `path`, creating its parent directory.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await.with_context(|| {
                format!("Failed to create checkpoint directory {}", dir.display())
            })?;
        }

        let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);

        Ok(Self { path, tmp_path })
    }

    /// Location of the checkpoint file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CheckpointStore for JsonCheckpointStore {
    /// Load the checkpoint, `None` if no file exists (first run).
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Option<DeploymentCheckpoint>> {
        if !fs::try_exists(&self.path)
            .await
            .context("Failed to stat checkpoint file")?
        {
            info!("No checkpoint found, starting fresh");
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path)
            .await
            .context("Failed to read checkpoint file")?;
        let checkpoint: DeploymentCheckpoint =
            serde_json::from_str(&json).context("Failed to parse checkpoint JSON")?;

        info!(
            run_id = %checkpoint.run_id,
            completed = checkpoint.completed,
            minted = checkpoint.minted.len(),
            "Checkpoint loaded"
        );
        Ok(Some(checkpoint))
    }

    /// Save a checkpoint atomically (tmp → rename).
    #[instrument(skip(self, checkpoint), fields(run_id = %checkpoint.run_id))]
    async fn save(&self, checkpoint: &DeploymentCheckpoint) -> Result<()> {
        let json =
            serde_json::to_string_pretty(checkpoint).context("Failed to serialize checkpoint")?;

        fs::write(&self.tmp_path, &json)
            .await
            .context("Failed to write tmp checkpoint file")?;

        fs::rename(&self.tmp_path, &self.path)
            .await
            .context("Failed to rename checkpoint file")?;

        debug!(path = %self.path.display(), "Checkpoint saved");
        Ok(())
    }
}

/// Discards every checkpoint.
///
/// Used when `checkpoint.enabled = false`: every run starts fresh.
#[derive(Debug, Default)]
pub struct EphemeralCheckpointStore;

impl EphemeralCheckpointStore {
    /// Create the store.
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CheckpointStore for EphemeralCheckpointStore {
    async fn load(&self) -> Result<Option<DeploymentCheckpoint>> {
        Ok(None)
    }

    async fn save(&self, checkpoint: &DeploymentCheckpoint) -> Result<()> {
        debug!(run_id = %checkpoint.run_id, "Checkpointing disabled, progress not kept");
        Ok(())
    }
}
