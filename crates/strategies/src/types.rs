// In crates/strategies/src/types.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RsiEmaSettings {
    /// Trend filter: only buy while the close is above this EMA.
    #[serde(default = "default_ema_trend_period")]
    pub ema_trend_period: usize,
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
    #[serde(default = "default_volume_period")]
    pub volume_period: usize,
    #[serde(default = "default_oversold")]
    pub rsi_oversold: f64,
    #[serde(default = "default_overbought")]
    pub rsi_overbought: f64,
}

impl Default for RsiEmaSettings {
    fn default() -> Self {
        Self {
            ema_trend_period: default_ema_trend_period(),
            rsi_period: default_rsi_period(),
            volume_period: default_volume_period(),
            rsi_oversold: default_oversold(),
            rsi_overbought: default_overbought(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EmaCrossoverSettings {
    pub fast_period: usize,
    pub slow_period: usize,
}

fn default_ema_trend_period() -> usize { 200 }
fn default_rsi_period() -> usize { 14 }
fn default_volume_period() -> usize { 20 }
fn default_oversold() -> f64 { 30.0 }
fn default_overbought() -> f64 { 70.0 }
