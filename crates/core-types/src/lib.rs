// In crates/core-types/src/lib.rs

pub mod numeric;
pub mod position;
pub mod types;

// Re-export the most important types for easy access from other crates.
pub use numeric::{notional_quantity, profit_percent};
pub use position::{Holding, Position, PositionSide, PositionStatus};
pub use types::{
    Fill, IdempotencyKey, Kline, OrderAmount, OrderOutcome, OrderRequest, OrderSide, OrderStatus,
    OrderType, Signal, Symbol,
};
