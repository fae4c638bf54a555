//! Use Cases Layer - Application Orchestration
//!
//! Coordinates domain logic with ports:
//! - `Provisioner`: runs the deployment state machine step by step
//! - `TradeForm`: the create/accept trade offer actions

pub mod provisioner;
pub mod trade_form;

pub use provisioner::{ProgressReporter, Provisioner, ProvisioningReport};
pub use trade_form::TradeForm;
