// In crates/strategies/src/ema_crossover.rs

use crate::types::EmaCrossoverSettings;
use crate::{Signal, Strategy};
use core_types::Kline;
use num_traits::cast::ToPrimitive;
use ta::Next;
use ta::indicators::ExponentialMovingAverage as Ema;

/// Golden cross / death cross of a fast and a slow EMA on the close.
#[derive(Debug)]
pub struct EmaCrossover {
    settings: EmaCrossoverSettings,
    fast_ema: Ema,
    slow_ema: Ema,
}

impl EmaCrossover {
    pub fn new(settings: EmaCrossoverSettings) -> anyhow::Result<Self> {
        if settings.fast_period >= settings.slow_period {
            anyhow::bail!(
                "fast_period ({}) must be shorter than slow_period ({})",
                settings.fast_period,
                settings.slow_period
            );
        }
        let fast_ema = Ema::new(settings.fast_period)
            .map_err(|e| anyhow::anyhow!("invalid fast_period: {:?}", e))?;
        let slow_ema = Ema::new(settings.slow_period)
            .map_err(|e| anyhow::anyhow!("invalid slow_period: {:?}", e))?;

        Ok(Self {
            settings,
            fast_ema,
            slow_ema,
        })
    }
}

impl Strategy for EmaCrossover {
    fn name(&self) -> &'static str {
        "EmaCrossover"
    }

    fn evaluate(&self, klines: &[Kline]) -> Signal {
        if klines.len() < self.settings.slow_period.max(2) {
            return Signal::Wait;
        }

        let mut fast_ema = self.fast_ema.clone();
        let mut slow_ema = self.slow_ema.clone();
        let (mut prev_fast, mut prev_slow) = (0.0, 0.0);
        let (mut fast, mut slow) = (0.0, 0.0);

        for kline in klines {
            let close = kline.close.to_f64().unwrap_or(0.0);
            prev_fast = fast;
            prev_slow = slow;
            fast = fast_ema.next(close);
            slow = slow_ema.next(close);
        }

        if prev_fast <= prev_slow && fast > slow {
            tracing::info!(fast, slow, "Golden cross detected.");
            Signal::Buy
        } else if prev_fast >= prev_slow && fast < slow {
            tracing::info!(fast, slow, "Death cross detected.");
            Signal::Sell
        } else {
            Signal::Wait
        }
    }
}
