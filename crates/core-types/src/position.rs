// In crates/core-types/src/position.rs

use crate::Symbol;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Spot positions are long-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionSide {
    Long,
}

/// The details of a holding the bot believes it has.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: Symbol,
    pub side: PositionSide,
    pub entry_price: Decimal,
    pub quantity: Decimal,
    /// The venue's id for the buy order that opened this holding.
    pub opening_order_id: String,
}

/// The bot's belief about its holding for one symbol.
///
/// `Closing` exists while a sell is in flight so that a second sell, or a
/// re-buy, cannot be issued against the same holding.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Position {
    #[default]
    None,
    Open(Holding),
    Closing(Holding),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionStatus {
    None,
    Open,
    Closing,
}

impl fmt::Display for PositionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PositionStatus::None => "NONE",
            PositionStatus::Open => "OPEN",
            PositionStatus::Closing => "CLOSING",
        };
        f.write_str(s)
    }
}

impl Position {
    pub fn status(&self) -> PositionStatus {
        match self {
            Position::None => PositionStatus::None,
            Position::Open(_) => PositionStatus::Open,
            Position::Closing(_) => PositionStatus::Closing,
        }
    }

    pub fn holding(&self) -> Option<&Holding> {
        match self {
            Position::None => None,
            Position::Open(h) | Position::Closing(h) => Some(h),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Position::None)
    }
}
