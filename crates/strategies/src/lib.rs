// In crates/strategies/src/lib.rs

use core_types::{Kline, Signal};
pub mod ema_crossover;
pub mod rsi_ema;
pub mod types;

#[cfg(test)]
mod test_support;

/// The universal interface for a trading strategy.
///
/// A strategy turns a window of klines (oldest first) into a single `Signal`
/// for the most recent bar. The window comes straight from the venue, so its
/// last bar is usually the candle still forming. Implementations are pure
/// over their input: evaluating the same window twice yields the same signal.
pub trait Strategy {
    /// The name of the strategy.
    fn name(&self) -> &'static str;

    fn evaluate(&self, klines: &[Kline]) -> Signal;
}
