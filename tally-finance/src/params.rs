//! Analysis parameters as supplied by a host, with documented defaults.
//!
//! Hosts send loosely-typed JSON. A missing or zero value means "use the
//! default" (`use_mock` defaults to true), and parameters that fail to parse
//! fall back to defaults in mock mode.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::subscriptions::{DEFAULT_MAX_AMOUNT, DEFAULT_MIN_AMOUNT};

pub const DEFAULT_DAYS: u32 = 30;
pub const DEFAULT_TIMEFRAME_MONTHS: u32 = 6;

fn default_use_mock() -> bool {
    true
}

/// Parameters for a spending analysis
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SpendingParams {
    #[serde(default)]
    pub days: u32,
    #[serde(default = "default_use_mock")]
    pub use_mock: bool,
}

impl Default for SpendingParams {
    fn default() -> Self {
        Self {
            days: DEFAULT_DAYS,
            use_mock: true,
        }
    }
}

impl SpendingParams {
    /// Parse host JSON. Unparseable input yields the defaults.
    pub fn from_json(input: &str) -> Self {
        match serde_json::from_str::<Self>(input) {
            Ok(p) => p.resolved(),
            Err(e) => {
                warn!("Bad spending parameters ({}), using defaults", e);
                Self::default()
            }
        }
    }

    /// Replace zero values with defaults
    pub fn resolved(mut self) -> Self {
        if self.days == 0 {
            self.days = DEFAULT_DAYS;
        }
        self
    }
}

/// Parameters for a subscription analysis
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionParams {
    #[serde(default)]
    pub timeframe_months: u32,
    #[serde(default)]
    pub min_amount: f64,
    #[serde(default)]
    pub max_amount: f64,
    #[serde(default = "default_use_mock")]
    pub use_mock: bool,
}

impl Default for SubscriptionParams {
    fn default() -> Self {
        Self {
            timeframe_months: DEFAULT_TIMEFRAME_MONTHS,
            min_amount: DEFAULT_MIN_AMOUNT,
            max_amount: DEFAULT_MAX_AMOUNT,
            use_mock: true,
        }
    }
}

impl SubscriptionParams {
    /// Parse host JSON. Unparseable input yields the defaults.
    pub fn from_json(input: &str) -> Self {
        match serde_json::from_str::<Self>(input) {
            Ok(p) => p.resolved(),
            Err(e) => {
                warn!("Bad subscription parameters ({}), using defaults", e);
                Self::default()
            }
        }
    }

    /// Replace zero values with defaults
    pub fn resolved(mut self) -> Self {
        if self.timeframe_months == 0 {
            self.timeframe_months = DEFAULT_TIMEFRAME_MONTHS;
        }
        if self.min_amount == 0.0 {
            self.min_amount = DEFAULT_MIN_AMOUNT;
        }
        if self.max_amount == 0.0 {
            self.max_amount = DEFAULT_MAX_AMOUNT;
        }
        self
    }
}
