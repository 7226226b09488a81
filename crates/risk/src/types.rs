// In crates/risk/src/types.rs

use rust_decimal::Decimal;
use serde::Deserialize;

/// Optional protective exits, as percentages of the entry price (e.g. 2.0 for 2%).
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ExitSettings {
    #[serde(default)]
    pub stop_loss_percent: Option<Decimal>,
    #[serde(default)]
    pub take_profit_percent: Option<Decimal>,
}
