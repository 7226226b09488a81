// In crates/engine/src/market_data.rs

use api_client::ApiClient;
use async_trait::async_trait;
use core_types::{Kline, Symbol};

/// A source of recent candles, oldest first.
#[async_trait]
pub trait MarketData: Send + Sync {
    async fn fetch_klines(
        &self,
        symbol: &Symbol,
        interval: &str,
        limit: u16,
    ) -> anyhow::Result<Vec<Kline>>;
}

#[async_trait]
impl MarketData for ApiClient {
    async fn fetch_klines(
        &self,
        symbol: &Symbol,
        interval: &str,
        limit: u16,
    ) -> anyhow::Result<Vec<Kline>> {
        Ok(self.get_klines(symbol, interval, limit).await?)
    }
}
