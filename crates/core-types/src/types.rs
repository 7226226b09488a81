// In crates/core-types/src/types.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A trading pair as the venue names it (e.g. "BTCUSDT").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(pub String);

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single OHLCV candlestick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kline {
    pub open_time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub close_time: i64,
}

/// The discrete decision a strategy produces for the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
    Wait,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Wait => "WAIT",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// The side as the venue spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Market,
    /// Immediate-or-cancel limit order, used to bound slippage.
    Limit,
}

/// How much to trade: either a quote-currency amount or a base-asset quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OrderAmount {
    Notional(Decimal),
    Quantity(Decimal),
}

/// A caller-chosen identifier that stays the same across every retry of one
/// trading intent. The venue sees it as the client order id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Mints a key for a new intent. The result is at most 36 characters,
    /// which is the longest client order id Binance accepts.
    pub fn mint(side: OrderSide) -> Self {
        let tag = match side {
            OrderSide::Buy => "b",
            OrderSide::Sell => "s",
        };
        Self(format!("{}-{}", tag, Uuid::new_v4().simple()))
    }

    /// Wraps an identifier that was minted elsewhere (e.g. read back from the venue).
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An intent to submit one order to the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub idempotency_key: IdempotencyKey,
    pub symbol: Symbol,
    pub side: OrderSide,
    pub amount: OrderAmount,
    pub order_type: OrderType,
    pub limit_price: Option<Decimal>,
}

impl OrderRequest {
    /// A market buy for a quote-currency amount, under a freshly minted key.
    pub fn market_buy(symbol: Symbol, notional: Decimal) -> Self {
        Self {
            idempotency_key: IdempotencyKey::mint(OrderSide::Buy),
            symbol,
            side: OrderSide::Buy,
            amount: OrderAmount::Notional(notional),
            order_type: OrderType::Market,
            limit_price: None,
        }
    }

    /// An immediate-or-cancel limit buy that will not pay more than `limit_price`.
    pub fn limit_buy(symbol: Symbol, quantity: Decimal, limit_price: Decimal) -> Self {
        Self {
            idempotency_key: IdempotencyKey::mint(OrderSide::Buy),
            symbol,
            side: OrderSide::Buy,
            amount: OrderAmount::Quantity(quantity),
            order_type: OrderType::Limit,
            limit_price: Some(limit_price),
        }
    }

    /// A market sell of a base-asset quantity, under a freshly minted key.
    pub fn market_sell(symbol: Symbol, quantity: Decimal) -> Self {
        Self {
            idempotency_key: IdempotencyKey::mint(OrderSide::Sell),
            symbol,
            side: OrderSide::Sell,
            amount: OrderAmount::Quantity(quantity),
            order_type: OrderType::Market,
            limit_price: None,
        }
    }
}

/// The confirmed result of an order that traded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    /// Average execution price.
    pub price: Decimal,
    /// Executed base-asset quantity. May be less than requested on a partial fill.
    pub quantity: Decimal,
    pub exchange_order_id: String,
}

/// The gateway's resolution of a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrderOutcome {
    Filled(Fill),
    Rejected { reason: String },
    /// No confirmation either way. Must be reconciled, never assumed.
    Unknown,
}

/// The answer to a reconciliation query for one idempotency key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrderStatus {
    Filled(Fill),
    Rejected { reason: String },
    /// The venue has no order under this key.
    NotFound,
    /// The venue knows the order but it has not reached a final state.
    Pending,
}
