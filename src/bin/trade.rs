//! GameAsset Market — Trade Offer Client
//!
//! Command-line counterpart of the trade form: creates a trade offer
//! or accepts one on the marketplace configured in config.toml, waits
//! for confirmation and prints the result.
//!
//! Wiring sequence:
//! 1. Parse arguments
//! 2. Load config.toml + init tracing
//! 3. Connect signer-bound RPC provider
//! 4. Check the marketplace address holds code
//! 5. Fill the form and submit

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use game_asset_market::adapters::chain::{ChainConnection, ContractValidator, MarketplaceClient};
use game_asset_market::config;
use game_asset_market::domain::TradeNotice;
use game_asset_market::domain::provisioning::MARKETPLACE_CONTRACT;
use game_asset_market::logging;
use game_asset_market::usecases::TradeForm;

/// Create or accept NFT trade offers on the GameAsset marketplace.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Config file (defaults to config.toml).
    #[arg(short, long, env = "GAME_MARKET_CONFIG", default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Offer one of your tokens for a counterparty's token.
    Create {
        /// Token you offer.
        #[arg(long)]
        your_token_id: String,
        /// Counterparty address.
        #[arg(long)]
        target_address: String,
        /// Token you want in return.
        #[arg(long)]
        desired_token_id: String,
    },
    /// Accept an open trade offer.
    Accept {
        /// Trade id assigned by the marketplace.
        #[arg(long)]
        trade_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::loader::load_config(&cli.config).context("Failed to load configuration")?;
    logging::init(&config.app);

    let connection = Arc::new(
        ChainConnection::connect(&config.network)
            .await
            .context("Failed to connect to network")?,
    );

    let market_address = config.marketplace.address;
    ContractValidator::new(connection.inner())
        .ensure_deployed(MARKETPLACE_CONTRACT, market_address)
        .await?;

    let market = Arc::new(MarketplaceClient::new(connection, market_address));
    info!(marketplace = %market.address(), "Trade client ready");

    let form = TradeForm::new(market);
    let notice = match cli.action {
        Action::Create {
            your_token_id,
            target_address,
            desired_token_id,
        } => {
            form.with_offer(your_token_id, target_address, desired_token_id)
                .create_trade()
                .await?
        }
        Action::Accept { trade_id } => form.with_trade_id(trade_id).accept_trade().await?,
    };

    println!("{notice}");
    if let TradeNotice::OfferCreated {
        trade_id: Some(id), ..
    } = &notice
    {
        println!("Trade id: {id}");
    }
    println!("Transaction: {}", notice.tx_hash());

    Ok(())
}
