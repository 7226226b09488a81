// In crates/api-client/src/lib.rs

use app_config::types::BinanceSettings;
use chrono::Utc;
use core_types::{IdempotencyKey, Kline, OrderAmount, OrderRequest, OrderType, Symbol};
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use serde_json::Value;
use sha2::Sha256;
use std::time::Duration;
// Create a type alias for the HMAC-SHA256 implementation.
type HmacSha256 = Hmac<Sha256>;

pub mod error;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use types::*;

impl ApiClient {
    /// Constructs a new ApiClient from BinanceSettings.
    pub fn new(settings: &BinanceSettings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| Error::ClientBuildError(e.to_string()))?;

        Ok(ApiClient {
            http_client,
            api_key: settings.api_key.clone(),
            secret_key: settings.secret_key.clone(),
            base_url: settings.rest_base_url.trim_end_matches('/').to_string(),
            recv_window_ms: settings.recv_window_ms,
        })
    }

    /// Generates an HMAC-SHA256 signature for a given query string.
    ///
    /// # Arguments
    ///
    /// * `query_string`: The URL-encoded query string to be signed.
    ///
    /// # Returns
    ///
    /// A hexadecimal string representation of the signature.
    fn sign(&self, query_string: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret_key.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(query_string.as_bytes());
        let result = mac.finalize();
        hex::encode(result.into_bytes())
    }

    /// Appends `recvWindow`, the current timestamp and the signature to `params`.
    fn create_signed_query(&self, params: &mut String) {
        // Get the current timestamp in milliseconds.
        let timestamp = Utc::now().timestamp_millis();

        if !params.is_empty() {
            params.push('&');
        }
        params.push_str(&format!(
            "recvWindow={}&timestamp={}",
            self.recv_window_ms, timestamp
        ));

        let signature = self.sign(params);
        params.push_str(&format!("&signature={}", signature));
    }

    /// Reads a response body and turns Binance's `{code, msg}` error objects
    /// and non-success statuses into errors.
    async fn read_json(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let text = response.text().await.map_err(Error::RequestFailed)?;

        match serde_json::from_str::<Value>(&text) {
            Ok(value) => {
                if let Some(code) = value.get("code").and_then(Value::as_i64) {
                    if code != 0 {
                        let msg = value
                            .get("msg")
                            .and_then(Value::as_str)
                            .unwrap_or("Unknown error")
                            .to_string();
                        return Err(Error::ApiError { code, msg });
                    }
                }
                if !status.is_success() {
                    return Err(Error::HttpStatus {
                        status: status.as_u16(),
                        body: text,
                    });
                }
                Ok(value)
            }
            Err(_) if !status.is_success() => Err(Error::HttpStatus {
                status: status.as_u16(),
                body: text,
            }),
            Err(e) => Err(Error::DeserializationFailed(e)),
        }
    }

    async fn signed_get(&self, path: &str, mut params: String) -> Result<Value> {
        self.create_signed_query(&mut params);
        let url = format!("{}{}?{}", self.base_url, path, params);

        let response = self
            .http_client
            .get(&url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await
            .map_err(Error::RequestFailed)?;

        Self::read_json(response).await
    }

    /// Fetches recent klines. Corresponds to the public `GET /api/v3/klines`.
    ///
    /// # Arguments
    ///
    /// * `symbol`: The symbol to fetch klines for.
    /// * `interval`: The kline interval (e.g., "1m", "15m", "1h").
    /// * `limit`: Number of klines to return (max 1000).
    pub async fn get_klines(&self, symbol: &Symbol, interval: &str, limit: u16) -> Result<Vec<Kline>> {
        let url = format!(
            "{}/api/v3/klines?symbol={}&interval={}&limit={}",
            self.base_url, symbol.0, interval, limit
        );

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(Error::RequestFailed)?;
        let value = Self::read_json(response).await?;

        parse_klines(value)
    }

    /// Fetches the last traded price. Corresponds to `GET /api/v3/ticker/price`.
    pub async fn get_ticker_price(&self, symbol: &Symbol) -> Result<Decimal> {
        let url = format!("{}/api/v3/ticker/price?symbol={}", self.base_url, symbol.0);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(Error::RequestFailed)?;
        let value = Self::read_json(response).await?;
        let ticker: TickerPrice = serde_json::from_value(value).map_err(Error::DeserializationFailed)?;

        Ok(ticker.price)
    }

    /// Fetches the account's balances. Corresponds to the signed `GET /api/v3/account`.
    pub async fn get_account(&self) -> Result<AccountInfo> {
        let value = self
            .signed_get("/api/v3/account", "omitZeroBalances=true".to_string())
            .await?;
        let account: AccountInfo = serde_json::from_value(value).map_err(Error::DeserializationFailed)?;

        Ok(account)
    }

    /// Submits a new order with the request's idempotency key as `newClientOrderId`.
    /// Corresponds to the signed `POST /api/v3/order`.
    pub async fn place_order(&self, request: &OrderRequest) -> Result<OrderResponse> {
        let mut params = order_params(request);
        self.create_signed_query(&mut params);

        let url = format!("{}/api/v3/order?{}", self.base_url, params);
        tracing::debug!(key = %request.idempotency_key, symbol = %request.symbol, "Submitting order.");

        let response = self
            .http_client
            .post(&url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await
            .map_err(Error::RequestFailed)?;
        let value = Self::read_json(response).await?;
        let order: OrderResponse = serde_json::from_value(value).map_err(Error::DeserializationFailed)?;

        Ok(order)
    }

    /// Looks an order up by the client order id it was submitted with.
    /// Corresponds to the signed `GET /api/v3/order`.
    pub async fn query_order(&self, symbol: &Symbol, key: &IdempotencyKey) -> Result<OrderResponse> {
        let params = format!("symbol={}&origClientOrderId={}", symbol.0, key.as_str());
        let value = self.signed_get("/api/v3/order", params).await?;
        let order: OrderResponse = serde_json::from_value(value).map_err(Error::DeserializationFailed)?;

        Ok(order)
    }
}

// Free function to allow api_client::new usage
pub fn new(settings: &BinanceSettings) -> Result<ApiClient> {
    ApiClient::new(settings)
}

/// Builds the unsigned parameter string for a new order.
fn order_params(request: &OrderRequest) -> String {
    let mut params = format!(
        "symbol={}&side={}&newClientOrderId={}&newOrderRespType=RESULT",
        request.symbol.0,
        request.side.as_str(),
        request.idempotency_key.as_str()
    );

    match request.order_type {
        OrderType::Market => params.push_str("&type=MARKET"),
        OrderType::Limit => {
            params.push_str("&type=LIMIT&timeInForce=IOC");
            if let Some(price) = request.limit_price {
                params.push_str(&format!("&price={}", price.normalize()));
            }
        }
    }

    match request.amount {
        OrderAmount::Notional(notional) => {
            params.push_str(&format!("&quoteOrderQty={}", notional.normalize()))
        }
        OrderAmount::Quantity(quantity) => {
            params.push_str(&format!("&quantity={}", quantity.normalize()))
        }
    }

    params
}

/// Converts the raw kline arrays into our clean, internal Kline type.
fn parse_klines(value: Value) -> Result<Vec<Kline>> {
    let raw_klines: Vec<RawKline> = serde_json::from_value(value).map_err(Error::DeserializationFailed)?;

    let klines = raw_klines
        .into_iter()
        .map(|raw| Kline {
            open_time: raw.0,
            open: raw.1.parse().unwrap_or_default(),
            high: raw.2.parse().unwrap_or_default(),
            low: raw.3.parse().unwrap_or_default(),
            close: raw.4.parse().unwrap_or_default(),
            volume: raw.5.parse().unwrap_or_default(),
            close_time: raw.6,
        })
        .collect();

    Ok(klines)
}
