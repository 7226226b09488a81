// In crates/execution/src/gateway.rs

use async_trait::async_trait;
use core_types::{IdempotencyKey, OrderOutcome, OrderRequest, OrderStatus, Symbol};
use rust_decimal::Decimal;
use thiserror::Error;

/// A failure talking to the venue, classified by whether retrying can help.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request timed out: {0}")]
    Timeout(String),
    #[error("Authentication failed: {0}")]
    Authentication(String),
    #[error("Refused by the venue: {0}")]
    Rejected(String),
    #[error("Unexpected venue response: {0}")]
    Unexpected(String),
}

impl GatewayError {
    /// Network and timeout failures may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, GatewayError::Network(_) | GatewayError::Timeout(_))
    }
}

/// The universal interface to a trading venue.
///
/// Implementations must treat `request.idempotency_key` as the venue-side
/// client order id, so that resubmitting the same request never creates a
/// second order.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// The name of the gateway (e.g., "BinanceGateway", "PaperGateway").
    fn name(&self) -> &'static str;

    /// Free balance of `asset` available for new orders.
    async fn get_quote_balance(&self, asset: &str) -> Result<Decimal, GatewayError>;

    async fn get_last_price(&self, symbol: &Symbol) -> Result<Decimal, GatewayError>;

    /// Submits one order. A business refusal is `Ok(OrderOutcome::Rejected)`;
    /// an answer that never arrived is `Ok(OrderOutcome::Unknown)` or a
    /// transient `Err`.
    async fn submit_order(&self, request: &OrderRequest) -> Result<OrderOutcome, GatewayError>;

    /// Looks up what happened to the order submitted under `key`.
    async fn get_order_status(
        &self,
        symbol: &Symbol,
        key: &IdempotencyKey,
    ) -> Result<OrderStatus, GatewayError>;
}
