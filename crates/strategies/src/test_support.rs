use core_types::Kline;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

/// Builds klines from `(close, volume)` pairs, one minute apart.
pub fn klines(bars: &[(f64, f64)]) -> Vec<Kline> {
    bars.iter()
        .enumerate()
        .map(|(i, (close, volume))| {
            let close = Decimal::from_f64(*close).unwrap();
            Kline {
                open_time: i as i64 * 60_000,
                open: close,
                high: close,
                low: close,
                close,
                volume: Decimal::from_f64(*volume).unwrap(),
                close_time: i as i64 * 60_000 + 59_999,
            }
        })
        .collect()
}
