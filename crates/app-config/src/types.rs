// In crates/app-config/src/types.rs

use core_types::Symbol;
use risk::types::ExitSettings;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use strategies::types::{EmaCrossoverSettings, RsiEmaSettings};

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// The application's general settings.
    pub app: AppSettings,
    /// Settings for the Binance API.
    pub binance: BinanceSettings,
    /// What to trade and how often.
    pub trading: TradingSettings,
    /// Order sizing, retry and reconciliation.
    pub execution: ExecutionSettings,
    /// Fill simulation used when `trading.dry_run` is set.
    #[serde(default)]
    pub simulation: SimulationSettings,
    #[serde(default)]
    pub notifier: NotifierSettings,
    #[serde(default)]
    pub strategies: StrategySettings,
    /// Stop-loss / take-profit levels.
    #[serde(default)]
    pub risk: ExitSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    pub log_level: String,
    /// Every log line is also appended here when set.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BinanceSettings {
    /// The API key for Binance.
    #[serde(default)]
    pub api_key: String,
    /// The secret key for Binance.
    #[serde(default)]
    pub secret_key: String,
    /// The REST API base URL (e.g. `https://api.binance.com` or the testnet).
    pub rest_base_url: String,
    /// How long a signed request stays valid on the venue side.
    #[serde(default = "default_recv_window_ms")]
    pub recv_window_ms: u64,
    /// Per-request HTTP timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TradingSettings {
    /// The venue symbol, e.g. "BTCUSDT".
    pub symbol: String,
    /// The currency position sizes and balances are denominated in, e.g. "USDT".
    pub quote_asset: String,
    /// Kline interval, e.g. "15m".
    pub interval: String,
    #[serde(default = "default_candle_limit")]
    pub candle_limit: u16,
    #[serde(default = "default_loop_interval_secs")]
    pub loop_interval_secs: u64,
    /// Consecutive failed cycles after which the run loop halts.
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
    /// When set, orders are filled by the paper gateway instead of the venue.
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,
}

impl TradingSettings {
    pub fn symbol(&self) -> Symbol {
        Symbol(self.symbol.clone())
    }

    pub fn loop_interval(&self) -> Duration {
        Duration::from_secs(self.loop_interval_secs)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ExecutionSettings {
    /// Quote-currency amount spent on each entry.
    pub position_size: Decimal,
    /// When set, entries are placed as immediate-or-cancel limit orders this
    /// many percent above the last price instead of plain market orders.
    #[serde(default)]
    pub max_slippage_percent: Option<Decimal>,
    /// Decimal places a limit order's base quantity is truncated to.
    #[serde(default = "default_quantity_precision")]
    pub quantity_precision: u32,
    pub retry: RetrySettings,
    pub reconcile: ReconcileSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct RetrySettings {
    /// Total submission attempts for one intent, including the first.
    pub max_attempts: u32,
    pub delay_ms: u64,
}

impl RetrySettings {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ReconcileSettings {
    /// Status queries made before an ambiguous order is escalated.
    pub max_polls: u32,
    pub poll_interval_ms: u64,
}

impl ReconcileSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct SimulationSettings {
    /// The taker fee charged on simulated fills (e.g., 0.001 for 0.1%).
    pub taker_fee: Decimal,
    /// Simulated slippage as a fraction of the quote (e.g., 0.0005 for 0.05%).
    pub slippage_rate: Decimal,
    /// Quote balance the paper account starts with.
    pub starting_balance: Decimal,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            taker_fee: Decimal::new(1, 3),
            slippage_rate: Decimal::new(5, 4),
            starting_balance: Decimal::new(1000, 0),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct NotifierSettings {
    /// LINE Notify access token. Notifications only go to the log without it.
    #[serde(default)]
    pub line_token: Option<String>,
}

impl NotifierSettings {
    pub fn line_token(&self) -> Option<&str> {
        self.line_token.as_deref().filter(|t| !t.trim().is_empty())
    }
}

// Define the container for all strategy settings
#[derive(Deserialize, Debug, Clone)]
pub struct StrategySettings {
    /// Which strategy block below drives the bot.
    #[serde(default = "default_active_strategy")]
    pub active: String,
    pub rsi_ema: Option<RsiEmaSettings>,
    pub ema_crossover: Option<EmaCrossoverSettings>,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            active: default_active_strategy(),
            rsi_ema: Some(RsiEmaSettings::default()),
            ema_crossover: None,
        }
    }
}

/// Helper functions for serde defaults
fn default_recv_window_ms() -> u64 { 5_000 }
fn default_request_timeout_secs() -> u64 { 10 }
fn default_candle_limit() -> u16 { 200 }
fn default_loop_interval_secs() -> u64 { 60 }
fn default_max_consecutive_failures() -> u32 { 5 }
fn default_dry_run() -> bool { true }
fn default_quantity_precision() -> u32 { 5 }
fn default_active_strategy() -> String { "rsi_ema".to_string() }
