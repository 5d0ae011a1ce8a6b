//! Trade settings shared by every commune.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Switches and limits for inter-zone and market trading.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TradeSettings {
    /// Whether the market may be used at all.
    #[serde(default = "default_true")]
    pub market_usage: bool,

    /// Whether allied requests are answered.
    #[serde(default = "default_true")]
    pub ally_communication: bool,

    /// Credits below which no buying happens.
    #[serde(default = "default_min_credits")]
    pub min_credits: Decimal,

    /// Ceiling on standing orders we own across all zones.
    #[serde(default = "default_max_standing_orders")]
    pub max_standing_orders: usize,
}

impl Default for TradeSettings {
    fn default() -> Self {
        Self {
            market_usage: true,
            ally_communication: true,
            min_credits: default_min_credits(),
            max_standing_orders: default_max_standing_orders(),
        }
    }
}

const fn default_true() -> bool {
    true
}

fn default_min_credits() -> Decimal {
    Decimal::from(10_000)
}

const fn default_max_standing_orders() -> usize {
    300
}
