//! Trade offer domain types.
//!
//! The marketplace contract owns offers; this side only needs the
//! user-facing notice produced once a trade transaction confirms.

use std::fmt;

use alloy::primitives::{B256, U256};
use serde::{Deserialize, Serialize};

/// Message shown after a trade transaction is included on-chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeNotice {
    /// `createTradeOffer` confirmed.
    OfferCreated {
        tx_hash: B256,
        /// Id the marketplace assigned, when the preview call returned one.
        trade_id: Option<U256>,
    },
    /// `acceptTrade` confirmed.
    TradeAccepted { tx_hash: B256 },
}

impl TradeNotice {
    /// Hash of the confirmed transaction.
    pub const fn tx_hash(&self) -> B256 {
        match self {
            Self::OfferCreated { tx_hash, .. } | Self::TradeAccepted { tx_hash } => *tx_hash,
        }
    }
}

impl fmt::Display for TradeNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OfferCreated { .. } => write!(f, "Trade offer created!"),
            Self::TradeAccepted { .. } => write!(f, "Trade accepted successfully!"),
        }
    }
}
