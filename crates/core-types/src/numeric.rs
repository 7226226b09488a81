// In crates/core-types/src/numeric.rs

use rust_decimal::Decimal;

/// Percentage change from `entry_price` to `exit_price`.
///
/// Returns zero when the entry price is zero.
pub fn profit_percent(entry_price: Decimal, exit_price: Decimal) -> Decimal {
    (exit_price - entry_price)
        .checked_div(entry_price)
        .map(|ratio| ratio * Decimal::ONE_HUNDRED)
        .unwrap_or(Decimal::ZERO)
}

/// Base-asset quantity bought by spending `notional` at `fill_price`.
///
/// Always computed from the actual fill price, never from a pre-trade quote.
pub fn notional_quantity(notional: Decimal, fill_price: Decimal) -> Decimal {
    notional.checked_div(fill_price).unwrap_or(Decimal::ZERO)
}
