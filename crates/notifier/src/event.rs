// In crates/notifier/src/event.rs

use chrono::{DateTime, Utc};
use core_types::Symbol;
use rust_decimal::Decimal;
use serde::Serialize;

const RULE: &str = "━━━━━━━━━━━━━━";

/// Something the operator should hear about.
/// `tag` and `content` are used by serde for clean JSON representation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum TradeEvent {
    BuyFilled {
        symbol: Symbol,
        price: Decimal,
        /// Quote-currency amount the entry was sized at.
        notional: Decimal,
        quantity: Decimal,
        dry_run: bool,
    },
    SellFilled {
        symbol: Symbol,
        price: Decimal,
        quantity: Decimal,
        profit_percent: Decimal,
        dry_run: bool,
    },
    Error {
        message: String,
    },
}

impl TradeEvent {
    pub fn error(message: impl Into<String>) -> Self {
        TradeEvent::Error {
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, TradeEvent::Error { .. })
    }

    /// Renders the event as the plain-text message sent to chat services.
    pub fn message(&self, at: DateTime<Utc>) -> String {
        let time = at.format("%Y-%m-%d %H:%M:%S UTC");
        match self {
            TradeEvent::BuyFilled {
                symbol,
                price,
                notional,
                quantity,
                dry_run,
            } => format!(
                "{} BUY ORDER\n{RULE}\nSymbol: {}\nPrice: {:.2}\nAmount: {}\nQuantity: {}\nTime: {}",
                mode(*dry_run),
                symbol,
                price,
                notional.normalize(),
                quantity.normalize(),
                time
            ),
            TradeEvent::SellFilled {
                symbol,
                price,
                quantity,
                profit_percent,
                dry_run,
            } => {
                let sign = if profit_percent.is_sign_negative() { "" } else { "+" };
                format!(
                    "{} SELL ORDER\n{RULE}\nSymbol: {}\nPrice: {:.2}\nQuantity: {}\nProfit: {}{:.2}%\nTime: {}",
                    mode(*dry_run),
                    symbol,
                    price,
                    quantity.normalize(),
                    sign,
                    profit_percent,
                    time
                )
            }
            TradeEvent::Error { message } => {
                format!("BOT ERROR\n{RULE}\n{}\nTime: {}", message, time)
            }
        }
    }
}

fn mode(dry_run: bool) -> &'static str {
    if dry_run { "[DRY RUN]" } else { "[LIVE]" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn buy_message_is_labelled_with_mode() {
        let event = TradeEvent::BuyFilled {
            symbol: Symbol("BTCUSDT".to_string()),
            price: dec!(50000),
            notional: dec!(20.00),
            quantity: dec!(0.00040000),
            dry_run: true,
        };

        let msg = event.message(at());
        assert!(msg.starts_with("[DRY RUN] BUY ORDER"));
        assert!(msg.contains("Symbol: BTCUSDT"));
        assert!(msg.contains("Price: 50000.00"));
        assert!(msg.contains("Amount: 20\n"));
        assert!(msg.contains("Quantity: 0.0004"));
        assert!(msg.ends_with("Time: 2024-03-01 12:30:00 UTC"));
    }

    #[test]
    fn sell_message_shows_signed_profit() {
        let gain = TradeEvent::SellFilled {
            symbol: Symbol("BTCUSDT".to_string()),
            price: dec!(51500),
            quantity: dec!(0.0004),
            profit_percent: dec!(3),
            dry_run: false,
        };
        let loss = TradeEvent::SellFilled {
            symbol: Symbol("BTCUSDT".to_string()),
            price: dec!(97),
            quantity: dec!(1),
            profit_percent: dec!(-3),
            dry_run: false,
        };

        assert!(gain.message(at()).starts_with("[LIVE] SELL ORDER"));
        assert!(gain.message(at()).contains("Profit: +3.00%"));
        assert!(loss.message(at()).contains("Profit: -3.00%"));
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(TradeEvent::error("boom")).unwrap();
        assert_eq!(json["type"], "Error");
        assert_eq!(json["payload"]["message"], "boom");
    }
}
