// In crates/execution/src/live.rs

use crate::gateway::{Gateway, GatewayError};
use api_client::{ApiClient, OrderResponse, OrderState};
use async_trait::async_trait;
use core_types::{Fill, IdempotencyKey, OrderOutcome, OrderRequest, OrderStatus, Symbol};
use rust_decimal::Decimal;

/// A gateway that places real orders on Binance Spot.
///
/// The idempotency key is sent as `newClientOrderId` and used to look the
/// order up again. Binance only refuses a repeated client order id while the
/// first order is still open; a market order that already filled does not
/// block a second one. Callers must query the key before resubmitting.
#[derive(Debug, Clone)]
pub struct BinanceGateway {
    /// The API client for communicating with Binance.
    api_client: ApiClient,
}

impl BinanceGateway {
    pub fn new(api_client: ApiClient) -> Self {
        Self { api_client }
    }
}

#[async_trait]
impl Gateway for BinanceGateway {
    fn name(&self) -> &'static str {
        "BinanceGateway"
    }

    async fn get_quote_balance(&self, asset: &str) -> Result<Decimal, GatewayError> {
        let account = self.api_client.get_account().await.map_err(classify)?;
        Ok(account.free(asset))
    }

    async fn get_last_price(&self, symbol: &Symbol) -> Result<Decimal, GatewayError> {
        self.api_client
            .get_ticker_price(symbol)
            .await
            .map_err(classify)
    }

    async fn submit_order(&self, request: &OrderRequest) -> Result<OrderOutcome, GatewayError> {
        match self.api_client.place_order(request).await {
            Ok(response) => {
                tracing::info!(
                    key = %request.idempotency_key,
                    order_id = response.order_id,
                    status = ?response.status,
                    executed_qty = %response.executed_qty,
                    "Order acknowledged."
                );
                Ok(match order_status(&response) {
                    OrderStatus::Filled(fill) => OrderOutcome::Filled(fill),
                    OrderStatus::Rejected { reason } => OrderOutcome::Rejected { reason },
                    OrderStatus::NotFound | OrderStatus::Pending => OrderOutcome::Unknown,
                })
            }
            // An earlier attempt with this key is still open on the venue.
            Err(e) if e.is_duplicate_order() => {
                tracing::warn!(key = %request.idempotency_key, error = %e, "Duplicate client order id.");
                Ok(OrderOutcome::Unknown)
            }
            // The order may have been accepted even though the answer was unreadable.
            Err(api_client::Error::DeserializationFailed(e)) => {
                tracing::warn!(key = %request.idempotency_key, error = %e, "Unreadable order response.");
                Ok(OrderOutcome::Unknown)
            }
            Err(e) => match classify(e) {
                GatewayError::Rejected(reason) => Ok(OrderOutcome::Rejected { reason }),
                other => Err(other),
            },
        }
    }

    async fn get_order_status(
        &self,
        symbol: &Symbol,
        key: &IdempotencyKey,
    ) -> Result<OrderStatus, GatewayError> {
        match self.api_client.query_order(symbol, key).await {
            Ok(response) => Ok(order_status(&response)),
            Err(e) if e.is_order_not_found() => Ok(OrderStatus::NotFound),
            Err(e) => Err(classify(e)),
        }
    }
}

/// Maps an API client failure onto the gateway's retry taxonomy.
fn classify(error: api_client::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Timeout(error.to_string())
    } else if error.is_transient() {
        GatewayError::Network(error.to_string())
    } else if error.is_auth() {
        GatewayError::Authentication(error.to_string())
    } else {
        match error {
            api_client::Error::ApiError { code, msg } => {
                GatewayError::Rejected(format!("{} (code {})", msg, code))
            }
            other => GatewayError::Unexpected(other.to_string()),
        }
    }
}

/// Reads the venue's view of an order. Anything that traded counts as filled
/// at the executed quantity, including an immediate-or-cancel order that
/// expired after a partial fill.
fn order_status(response: &OrderResponse) -> OrderStatus {
    let traded = response.executed_qty > Decimal::ZERO;
    let fill = || Fill {
        price: response.avg_price().unwrap_or(Decimal::ZERO),
        quantity: response.executed_qty,
        exchange_order_id: response.order_id.to_string(),
    };

    match response.status {
        OrderState::Filled => OrderStatus::Filled(fill()),
        OrderState::Canceled | OrderState::Expired | OrderState::ExpiredInMatch if traded => {
            OrderStatus::Filled(fill())
        }
        OrderState::Canceled
        | OrderState::Expired
        | OrderState::ExpiredInMatch
        | OrderState::Rejected => OrderStatus::Rejected {
            reason: format!("order {:?} without any fill", response.status),
        },
        OrderState::New
        | OrderState::PartiallyFilled
        | OrderState::PendingCancel
        | OrderState::Other => OrderStatus::Pending,
    }
}
