// In crates/execution/src/lib.rs

pub mod error;
pub mod executor;
pub mod gateway;
pub mod ledger;
pub mod live;
pub mod retry;
pub mod simulated;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export public types
pub use error::{Error, Result};
pub use executor::OrderExecutor;
pub use gateway::{Gateway, GatewayError};
pub use ledger::{LedgerError, PositionLedger};
pub use live::BinanceGateway;
pub use simulated::PaperGateway;
pub use types::ExecutionReport;
