// In crates/risk/src/exits.rs

use crate::types::ExitSettings;
use crate::{Error, Result};
use core_types::Holding;
use rust_decimal::Decimal;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::StopLoss => f.write_str("stop-loss"),
            ExitReason::TakeProfit => f.write_str("take-profit"),
        }
    }
}

/// Checks an open holding against fixed stop-loss and take-profit levels.
///
/// Both levels are optional; with neither configured no exit ever fires.
#[derive(Debug, Clone)]
pub struct ProtectiveExits {
    settings: ExitSettings,
}

impl ProtectiveExits {
    pub fn new(settings: ExitSettings) -> Result<Self> {
        for (name, value) in [
            ("stop_loss_percent", settings.stop_loss_percent),
            ("take_profit_percent", settings.take_profit_percent),
        ] {
            if let Some(v) = value {
                if v <= Decimal::ZERO {
                    return Err(Error::InvalidParameters(format!(
                        "{name} must be positive, got {v}"
                    )));
                }
            }
        }
        if let Some(sl) = settings.stop_loss_percent {
            if sl >= Decimal::ONE_HUNDRED {
                return Err(Error::InvalidParameters(format!(
                    "stop_loss_percent must be below 100, got {sl}"
                )));
            }
        }
        Ok(Self { settings })
    }

    /// Returns the exit that `last_price` triggers for `holding`, if any.
    /// Stop-loss wins if both levels are somehow breached.
    pub fn check(&self, holding: &Holding, last_price: Decimal) -> Option<ExitReason> {
        if let Some(sl) = self.settings.stop_loss_percent {
            let stop_price = holding.entry_price * (Decimal::ONE - sl / Decimal::ONE_HUNDRED);
            if last_price <= stop_price {
                tracing::info!(
                    symbol = %holding.symbol,
                    entry_price = %holding.entry_price,
                    %last_price,
                    %stop_price,
                    "Stop-loss triggered."
                );
                return Some(ExitReason::StopLoss);
            }
        }
        if let Some(tp) = self.settings.take_profit_percent {
            let target_price = holding.entry_price * (Decimal::ONE + tp / Decimal::ONE_HUNDRED);
            if last_price >= target_price {
                tracing::info!(
                    symbol = %holding.symbol,
                    entry_price = %holding.entry_price,
                    %last_price,
                    %target_price,
                    "Take-profit triggered."
                );
                return Some(ExitReason::TakeProfit);
            }
        }
        None
    }
}
