//! GameAsset Market — Deployment Entry Point
//!
//! Provisions QuizToken, GameAsset and Marketplace, then optionally
//! mints and lists the configured asset batch. Takes no arguments.
//!
//! Wiring sequence:
//! 1. Load config.toml + validate
//! 2. Init tracing (JSON structured logging on stderr)
//! 3. Dry run: print the step plan and exit
//! 4. Load contract artifacts
//! 5. Connect signer-bound RPC provider (validates chain id)
//! 6. Pick checkpoint store (JSON file or in-memory)
//! 7. Run the provisioner, printing each address and asset as it confirms
//!
//! Any failure returns an error: the chain is printed and the process
//! exits non-zero.

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use tracing::{info, warn};

use game_asset_market::adapters::chain::{ChainConnection, ContractArtifacts, OnChainDeployer};
use game_asset_market::adapters::persistence::{EphemeralCheckpointStore, JsonCheckpointStore};
use game_asset_market::config;
use game_asset_market::domain::provisioning::planned_steps;
use game_asset_market::logging;
use game_asset_market::ports::repository::CheckpointStore;
use game_asset_market::usecases::Provisioner;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration from config.toml ──────────────
    let config = config::loader::load_config(&config::loader::config_path())
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured logging ────────────────────
    logging::init(&config.app);

    info!(
        name = %config.app.name,
        version = env!("CARGO_PKG_VERSION"),
        dry_run = config.app.dry_run,
        assets = config.assets.enabled,
        checkpoint = config.checkpoint.enabled,
        "Starting deployment"
    );

    let plan = config.provisioning_plan()?;

    // ── 3. Dry run: show the plan, send nothing ─────────────
    if config.app.dry_run {
        warn!("Dry-run mode — no transactions will be sent");
        for (i, step) in planned_steps(Address::ZERO, &plan).iter().enumerate() {
            println!("{:>2}. {step}", i + 1);
        }
        return Ok(());
    }

    // ── 4. Load creation bytecode ───────────────────────────
    let artifacts =
        ContractArtifacts::load(&config.artifacts).context("Failed to load contract artifacts")?;

    // ── 5. Connect signer-bound provider ────────────────────
    let connection = Arc::new(
        ChainConnection::connect(&config.network)
            .await
            .context("Failed to connect to network")?,
    );
    println!("Deploying contracts with: {}", connection.signer_address());

    // ── 6. Checkpoint store ─────────────────────────────────
    let store: Arc<dyn CheckpointStore> = if config.checkpoint.enabled {
        let store = JsonCheckpointStore::new(&config.checkpoint.path).await?;
        info!(path = %store.path().display(), "Checkpointing enabled");
        Arc::new(store)
    } else {
        Arc::new(EphemeralCheckpointStore::new())
    };

    // ── 7. Provision ────────────────────────────────────────
    let deployer = Arc::new(OnChainDeployer::new(Arc::clone(&connection), artifacts));
    let provisioner = Provisioner::new(deployer, store, plan)
        .with_reporter(Box::new(|line| println!("{line}")));
    let report = provisioner.run().await?;

    // Steps confirmed by an earlier process were not announced above
    if report.resumed {
        println!("Resumed run {}; full deployment:", report.checkpoint.run_id);
        print!("{report}");
    }

    Ok(())
}
