// In crates/execution/src/error.rs

use crate::gateway::GatewayError;
use crate::ledger::LedgerError;
use core_types::{IdempotencyKey, Symbol};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("A position in {0} is already open")]
    AlreadyPositioned(Symbol),

    #[error("No open position in {0} to sell")]
    NoPosition(Symbol),

    #[error("Insufficient funds: {available} available, {required} required")]
    InsufficientFunds { available: Decimal, required: Decimal },

    #[error(transparent)]
    InvalidTransition(#[from] LedgerError),

    #[error("Order {key} for {symbol} could not be confirmed; manual reconciliation required")]
    UnresolvedOrder { symbol: Symbol, key: IdempotencyKey },

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

impl Error {
    /// True for signals refused locally before anything was sent to the venue.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::AlreadyPositioned(_) | Error::NoPosition(_) | Error::InsufficientFunds { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
