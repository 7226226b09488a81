// In crates/api-client/src/types.rs

use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

/// The main client for interacting with the Binance Spot REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// The persistent HTTP client.
    pub http_client: Client,
    /// The user's Binance API key.
    pub api_key: String,
    /// The user's Binance secret key.
    pub secret_key: String,
    /// The base URL, e.g. `https://api.binance.com`.
    pub base_url: String,
    /// `recvWindow` sent with every signed request.
    pub recv_window_ms: u64,
}

/// Free and locked amounts of one asset.
#[derive(Debug, Deserialize, Clone)]
pub struct Balance {
    pub asset: String,
    pub free: Decimal,
    pub locked: Decimal,
}

/// The subset of `GET /api/v3/account` the bot uses.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub can_trade: bool,
    pub balances: Vec<Balance>,
}

impl AccountInfo {
    /// The free balance of `asset`, zero if the account does not hold it.
    pub fn free(&self, asset: &str) -> Decimal {
        self.balances
            .iter()
            .find(|b| b.asset.eq_ignore_ascii_case(asset))
            .map(|b| b.free)
            .unwrap_or(Decimal::ZERO)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TickerPrice {
    pub symbol: String,
    pub price: Decimal,
}

/// Temporary struct to deserialize the kline response from Binance,
/// which is a JSON array of mixed types.
#[derive(Debug, Deserialize)]
pub struct RawKline(
    pub i64,         // 0: Open time
    pub String,      // 1: Open
    pub String,      // 2: High
    pub String,      // 3: Low
    pub String,      // 4: Close
    pub String,      // 5: Volume
    pub i64,         // 6: Close time
    pub String,      // 7: Quote asset volume
    pub i64,         // 8: Number of trades
    pub String,      // 9: Taker buy base asset volume
    pub String,      // 10: Taker buy quote asset volume
    pub String,      // 11: Ignore
);

/// Lifecycle state of a spot order.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderState {
    New,
    PartiallyFilled,
    Filled,
    Canceled,
    PendingCancel,
    Rejected,
    Expired,
    ExpiredInMatch,
    #[serde(other)]
    Other,
}

/// An order as returned by both `POST /api/v3/order` (`newOrderRespType=RESULT`)
/// and `GET /api/v3/order`.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub symbol: String,
    pub order_id: i64,
    pub client_order_id: String,
    pub status: OrderState,
    pub side: String,   // "BUY" or "SELL"
    pub r#type: String, // "MARKET", "LIMIT", etc.
    /// The actual filled quantity.
    pub executed_qty: Decimal,
    /// The cumulative quote asset transacted (Binance's spelling).
    pub cummulative_quote_qty: Decimal,
}

impl OrderResponse {
    /// Average fill price, if anything traded.
    pub fn avg_price(&self) -> Option<Decimal> {
        if self.executed_qty > Decimal::ZERO {
            self.cummulative_quote_qty.checked_div(self.executed_qty)
        } else {
            None
        }
    }
}
