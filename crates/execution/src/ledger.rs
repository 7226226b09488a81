// In crates/execution/src/ledger.rs

use core_types::{Holding, Position, PositionSide, PositionStatus, Symbol};
use rust_decimal::Decimal;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Cannot {action} {symbol}: position is {from}")]
pub struct LedgerError {
    pub symbol: Symbol,
    pub from: PositionStatus,
    pub action: &'static str,
}

/// The bot's record of what it holds, one entry per symbol.
///
/// Every state change goes through a checked transition; an untracked symbol
/// reads as `Position::None`. The ledger lives in memory only.
#[derive(Debug, Default)]
pub struct PositionLedger {
    positions: HashMap<Symbol, Position>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self, symbol: &Symbol) -> Position {
        self.positions.get(symbol).cloned().unwrap_or_default()
    }

    /// NONE -> OPEN, after a confirmed buy fill.
    pub fn open(
        &mut self,
        symbol: &Symbol,
        entry_price: Decimal,
        quantity: Decimal,
        order_id: impl Into<String>,
    ) -> Result<(), LedgerError> {
        let from = self.status(symbol);
        if from != PositionStatus::None {
            return Err(LedgerError {
                symbol: symbol.clone(),
                from,
                action: "open",
            });
        }

        let holding = Holding {
            symbol: symbol.clone(),
            side: PositionSide::Long,
            entry_price,
            quantity,
            opening_order_id: order_id.into(),
        };
        self.positions.insert(symbol.clone(), Position::Open(holding));
        Ok(())
    }

    /// OPEN -> CLOSING. Returns the holding being closed.
    pub fn begin_close(&mut self, symbol: &Symbol) -> Result<Holding, LedgerError> {
        match self.positions.remove(symbol) {
            Some(Position::Open(holding)) => {
                self.positions
                    .insert(symbol.clone(), Position::Closing(holding.clone()));
                Ok(holding)
            }
            other => Err(self.restore(symbol, other, "begin closing")),
        }
    }

    /// CLOSING -> NONE, after a confirmed sell fill. Returns the closed holding.
    pub fn close(&mut self, symbol: &Symbol) -> Result<Holding, LedgerError> {
        match self.positions.remove(symbol) {
            Some(Position::Closing(holding)) => Ok(holding),
            other => Err(self.restore(symbol, other, "close")),
        }
    }

    /// CLOSING -> OPEN, when the sell was definitively not executed.
    pub fn abort_close(&mut self, symbol: &Symbol) -> Result<(), LedgerError> {
        match self.positions.remove(symbol) {
            Some(Position::Closing(holding)) => {
                self.positions.insert(symbol.clone(), Position::Open(holding));
                Ok(())
            }
            other => Err(self.restore(symbol, other, "abort closing")),
        }
    }

    fn status(&self, symbol: &Symbol) -> PositionStatus {
        self.positions
            .get(symbol)
            .map(Position::status)
            .unwrap_or(PositionStatus::None)
    }

    /// Puts back an entry taken out by a refused transition and builds the error.
    fn restore(
        &mut self,
        symbol: &Symbol,
        taken: Option<Position>,
        action: &'static str,
    ) -> LedgerError {
        let from = taken
            .as_ref()
            .map(Position::status)
            .unwrap_or(PositionStatus::None);
        if let Some(position) = taken {
            if !position.is_none() {
                self.positions.insert(symbol.clone(), position);
            }
        }
        LedgerError {
            symbol: symbol.clone(),
            from,
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn btc() -> Symbol {
        Symbol("BTCUSDT".to_string())
    }

    #[test]
    fn untracked_symbol_is_none() {
        let ledger = PositionLedger::new();
        assert_eq!(ledger.current(&btc()), Position::None);
    }

    #[test]
    fn full_lifecycle() {
        let mut ledger = PositionLedger::new();
        ledger.open(&btc(), dec!(50000), dec!(0.0004), "28").unwrap();
        assert_eq!(ledger.current(&btc()).status(), PositionStatus::Open);

        let holding = ledger.begin_close(&btc()).unwrap();
        assert_eq!(holding.quantity, dec!(0.0004));
        assert_eq!(holding.opening_order_id, "28");
        assert_eq!(ledger.current(&btc()).status(), PositionStatus::Closing);

        let closed = ledger.close(&btc()).unwrap();
        assert_eq!(closed.entry_price, dec!(50000));
        assert_eq!(ledger.current(&btc()), Position::None);
    }

    #[test]
    fn open_refuses_when_positioned() {
        let mut ledger = PositionLedger::new();
        ledger.open(&btc(), dec!(100), dec!(1), "1").unwrap();

        let err = ledger.open(&btc(), dec!(101), dec!(1), "2").unwrap_err();
        assert_eq!(err.from, PositionStatus::Open);
        assert_eq!(ledger.current(&btc()).holding().unwrap().entry_price, dec!(100));

        ledger.begin_close(&btc()).unwrap();
        let err = ledger.open(&btc(), dec!(101), dec!(1), "2").unwrap_err();
        assert_eq!(err.from, PositionStatus::Closing);
    }

    #[test]
    fn abort_close_returns_to_open() {
        let mut ledger = PositionLedger::new();
        ledger.open(&btc(), dec!(100), dec!(1), "1").unwrap();
        ledger.begin_close(&btc()).unwrap();
        ledger.abort_close(&btc()).unwrap();

        assert_eq!(ledger.current(&btc()).status(), PositionStatus::Open);
    }

    #[test]
    fn refused_transitions_leave_state_untouched() {
        let mut ledger = PositionLedger::new();
        assert_eq!(ledger.begin_close(&btc()).unwrap_err().from, PositionStatus::None);
        assert_eq!(ledger.close(&btc()).unwrap_err().from, PositionStatus::None);
        assert_eq!(ledger.abort_close(&btc()).unwrap_err().from, PositionStatus::None);
        assert_eq!(ledger.current(&btc()), Position::None);

        ledger.open(&btc(), dec!(100), dec!(1), "1").unwrap();
        assert!(ledger.close(&btc()).is_err());
        assert!(ledger.abort_close(&btc()).is_err());
        assert_eq!(ledger.current(&btc()).status(), PositionStatus::Open);

        ledger.begin_close(&btc()).unwrap();
        assert!(ledger.begin_close(&btc()).is_err());
        assert_eq!(ledger.current(&btc()).status(), PositionStatus::Closing);
    }
}
