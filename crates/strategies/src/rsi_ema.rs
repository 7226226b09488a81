// In crates/strategies/src/rsi_ema.rs

use crate::types::RsiEmaSettings;
use crate::{Signal, Strategy};
use core_types::Kline;
use num_traits::cast::ToPrimitive;
use ta::Next;
use ta::indicators::{ExponentialMovingAverage as Ema, SimpleMovingAverage as Sma};

/// RSI reversal entries filtered by a long EMA trend and above-average volume.
///
/// - Setup: the close is above the trend EMA.
/// - Filter: the bar's volume is above its moving average.
/// - Trigger: RSI crosses up through the oversold line (buy) or down
///   through the overbought line (sell). Sells are not trend-filtered.
#[derive(Debug)]
pub struct RsiEma {
    settings: RsiEmaSettings,
    // Prototypes, cloned fresh for every evaluation.
    trend_ema: Ema,
    rsi: SimpleRsi,
    volume_sma: Sma,
}

/// RSI over simple rolling means of gains and losses (Cutler's RSI), not
/// Wilder's smoothed averages. NaN until `period` price changes are seen.
#[derive(Debug, Clone)]
struct SimpleRsi {
    period: usize,
    gains: Sma,
    losses: Sma,
    previous_close: Option<f64>,
    changes: usize,
}

impl SimpleRsi {
    fn new(period: usize) -> anyhow::Result<Self> {
        let gains = Sma::new(period).map_err(|e| anyhow::anyhow!("invalid rsi_period: {:?}", e))?;
        let losses = Sma::new(period).map_err(|e| anyhow::anyhow!("invalid rsi_period: {:?}", e))?;
        Ok(Self {
            period,
            gains,
            losses,
            previous_close: None,
            changes: 0,
        })
    }
}

impl Next<f64> for SimpleRsi {
    type Output = f64;

    fn next(&mut self, close: f64) -> f64 {
        let Some(previous) = self.previous_close.replace(close) else {
            return f64::NAN;
        };

        let change = close - previous;
        let gain = self.gains.next(change.max(0.0));
        let loss = self.losses.next((-change).max(0.0));
        self.changes += 1;

        if self.changes < self.period {
            f64::NAN
        } else if loss == 0.0 {
            // Flat window has no defined RSI; a window without losses is 100.
            if gain == 0.0 { f64::NAN } else { 100.0 }
        } else {
            100.0 - 100.0 / (1.0 + gain / loss)
        }
    }
}

impl RsiEma {
    pub fn new(settings: RsiEmaSettings) -> anyhow::Result<Self> {
        let trend_ema = Ema::new(settings.ema_trend_period)
            .map_err(|e| anyhow::anyhow!("invalid ema_trend_period: {:?}", e))?;
        let rsi = SimpleRsi::new(settings.rsi_period)?;
        let volume_sma = Sma::new(settings.volume_period)
            .map_err(|e| anyhow::anyhow!("invalid volume_period: {:?}", e))?;

        Ok(Self {
            settings,
            trend_ema,
            rsi,
            volume_sma,
        })
    }
}

impl Strategy for RsiEma {
    fn name(&self) -> &'static str {
        "RsiEma"
    }

    fn evaluate(&self, klines: &[Kline]) -> Signal {
        let required = self.settings.ema_trend_period.max(2);
        if klines.len() < required {
            tracing::warn!(
                bars = klines.len(),
                required,
                "Not enough klines to evaluate the strategy."
            );
            return Signal::Wait;
        }

        let mut trend_ema = self.trend_ema.clone();
        let mut rsi = self.rsi.clone();
        let mut volume_sma = self.volume_sma.clone();

        let mut previous_rsi = f64::NAN;
        let mut current_rsi = f64::NAN;
        let mut current_ema = 0.0;
        let mut current_volume_avg = 0.0;

        for kline in klines {
            let close = kline.close.to_f64().unwrap_or(0.0);
            let volume = kline.volume.to_f64().unwrap_or(0.0);

            current_ema = trend_ema.next(close);
            current_volume_avg = volume_sma.next(volume);
            previous_rsi = current_rsi;
            current_rsi = rsi.next(close);
        }

        // The length check above guarantees a last bar.
        let Some(current) = klines.last() else {
            return Signal::Wait;
        };
        let close = current.close.to_f64().unwrap_or(0.0);
        let volume = current.volume.to_f64().unwrap_or(0.0);

        let setup_long = close > current_ema;
        let filter_volume = volume > current_volume_avg;
        let trigger_buy =
            previous_rsi < self.settings.rsi_oversold && current_rsi > self.settings.rsi_oversold;
        let trigger_sell = previous_rsi > self.settings.rsi_overbought
            && current_rsi < self.settings.rsi_overbought;

        if setup_long && filter_volume && trigger_buy {
            tracing::info!(price = %current.close, rsi = current_rsi, volume = %current.volume, "BUY signal detected.");
            Signal::Buy
        } else if trigger_sell {
            tracing::info!(price = %current.close, rsi = current_rsi, "SELL signal detected.");
            Signal::Sell
        } else {
            Signal::Wait
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::klines;

    fn small_settings() -> RsiEmaSettings {
        RsiEmaSettings {
            ema_trend_period: 5,
            rsi_period: 3,
            volume_period: 3,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
        }
    }

    fn uptrend(bars: usize) -> Vec<(f64, f64)> {
        (0..bars).map(|i| (100.0 + i as f64, 10.0)).collect()
    }

    #[test]
    fn rsi_averages_gains_and_losses_over_a_simple_window() {
        let mut rsi = SimpleRsi::new(3).unwrap();
        let values: Vec<f64> = [10.0, 11.0, 12.0, 11.0, 13.0]
            .into_iter()
            .map(|close| rsi.next(close))
            .collect();

        assert!(values[..3].iter().all(|v| v.is_nan()));
        // Changes +1 +1 -1: gains 2/3, losses 1/3, RS 2.
        assert!((values[3] - 200.0 / 3.0).abs() < 1e-9);
        // Changes +1 -1 +2: gains 1, losses 1/3, RS 3.
        assert!((values[4] - 75.0).abs() < 1e-9);
    }

    #[test]
    fn rsi_without_losses_is_100() {
        let mut rsi = SimpleRsi::new(2).unwrap();
        let last = [1.0, 2.0, 3.0, 4.0].into_iter().map(|c| rsi.next(c)).last().unwrap();
        assert_eq!(last, 100.0);
    }

    #[test]
    fn waits_without_enough_history() {
        let strategy = RsiEma::new(RsiEmaSettings::default()).unwrap();
        let window = klines(&uptrend(50));
        assert_eq!(strategy.evaluate(&window), Signal::Wait);
    }

    #[test]
    fn buys_when_rsi_recovers_above_trend_on_volume() {
        let strategy = RsiEma::new(small_settings()).unwrap();
        let mut bars = uptrend(20);
        bars.push((110.0, 10.0)); // sharp dip pushes RSI under 30
        bars.push((130.0, 50.0)); // recovery above the EMA on heavy volume

        assert_eq!(strategy.evaluate(&klines(&bars)), Signal::Buy);
    }

    #[test]
    fn recovery_on_thin_volume_is_filtered_out() {
        let strategy = RsiEma::new(small_settings()).unwrap();
        let mut bars = uptrend(20);
        bars.push((110.0, 10.0));
        bars.push((130.0, 1.0));

        assert_eq!(strategy.evaluate(&klines(&bars)), Signal::Wait);
    }

    #[test]
    fn sells_when_rsi_falls_out_of_overbought() {
        let strategy = RsiEma::new(small_settings()).unwrap();
        let mut bars = uptrend(12);
        bars.push((80.0, 10.0));

        assert_eq!(strategy.evaluate(&klines(&bars)), Signal::Sell);
    }

    #[test]
    fn evaluation_is_repeatable() {
        let strategy = RsiEma::new(small_settings()).unwrap();
        let mut bars = uptrend(20);
        bars.push((110.0, 10.0));
        bars.push((130.0, 50.0));
        let window = klines(&bars);

        assert_eq!(strategy.evaluate(&window), strategy.evaluate(&window));
    }

    #[test]
    fn rejects_zero_periods() {
        let settings = RsiEmaSettings {
            rsi_period: 0,
            ..small_settings()
        };
        assert!(RsiEma::new(settings).is_err());
    }
}
