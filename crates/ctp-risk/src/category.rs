//! Risk categories and the capability guard.
//!
//! A gate applied to an account's market or trading capability first
//! verifies that the capability is actually connected; the check runs
//! before any hook or action.

use serde::{Deserialize, Serialize};

use crate::error::{RiskError, RiskResult};

/// Connection state of the target the gate is applied to.
pub trait ConnectionStatus: Send + Sync {
    /// Whether a market-data capability is connected.
    fn market_connected(&self) -> bool;

    /// Whether a trading capability is connected.
    fn trader_connected(&self) -> bool;
}

/// Recognized risk-check categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskCategory {
    /// Requires a connected market-data capability.
    Market,
    /// Requires a connected trading capability.
    Trader,
}

impl RiskCategory {
    /// Parse a category name. Exactly `"market"` and `"trader"` are
    /// accepted; anything else is an invalid argument.
    pub fn parse(name: &str) -> RiskResult<Self> {
        match name {
            "market" => Ok(Self::Market),
            "trader" => Ok(Self::Trader),
            other => Err(RiskError::InvalidCategory(other.to_string())),
        }
    }

    /// Verify the target carries the capability this category requires.
    pub fn ensure(&self, status: &dyn ConnectionStatus) -> RiskResult<()> {
        let (connected, what) = match self {
            Self::Market => (status.market_connected(), "market-data"),
            Self::Trader => (status.trader_connected(), "trading"),
        };

        if connected {
            Ok(())
        } else {
            Err(RiskError::MissingCapability(format!(
                "{self} gate requires a connected {what} capability on the target"
            )))
        }
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Market => write!(f, "market"),
            Self::Trader => write!(f, "trader"),
        }
    }
}
