//! Domain layer - Core models with no I/O.
//!
//! Contains the provisioning state machine, token amount scaling and
//! the trade notice type. Everything here is pure and testable in
//! isolation; ports and adapters live outside this module.

pub mod provisioning;
pub mod trade;
pub mod units;

// Re-export core types for convenience
pub use provisioning::{
    DeploymentCheckpoint, ListedAsset, MintedAsset, ProvisionError, ProvisioningPlan,
    ProvisioningStep, StepOutcome, planned_steps,
};
pub use trade::TradeNotice;
pub use units::{AmountError, to_base_units};
