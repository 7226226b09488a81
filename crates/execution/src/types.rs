// In crates/execution/src/types.rs

use core_types::{Fill, IdempotencyKey, OrderOutcome, OrderSide, Symbol};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// What a call to `OrderExecutor::handle_signal` did.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionReport {
    /// The signal asked for nothing.
    NoAction,
    /// A buy filled and the position is now OPEN.
    Opened {
        symbol: Symbol,
        fill: Fill,
        /// The quantity recorded in the ledger.
        quantity: Decimal,
    },
    /// A sell filled and the position is now NONE.
    Closed {
        symbol: Symbol,
        fill: Fill,
        profit_percent: Decimal,
    },
    /// The venue definitively refused the order; the position is unchanged.
    Rejected { side: OrderSide, reason: String },
}

/// Represents the state of the paper trading account.
#[derive(Debug)]
pub struct PaperBook {
    /// Quote-currency balance (e.g., in USDT).
    pub cash: Decimal,
    /// Base-asset holdings, keyed by symbol.
    pub holdings: HashMap<Symbol, Decimal>,
    /// Every order the book has decided, keyed by client order id.
    pub orders: HashMap<IdempotencyKey, OrderOutcome>,
    next_order_id: u64,
}

impl PaperBook {
    /// Creates a new book with an initial cash balance.
    pub fn new(initial_cash: Decimal) -> Self {
        Self {
            cash: initial_cash,
            holdings: HashMap::new(),
            orders: HashMap::new(),
            next_order_id: 1,
        }
    }

    pub fn holding(&self, symbol: &Symbol) -> Decimal {
        self.holdings.get(symbol).copied().unwrap_or(Decimal::ZERO)
    }

    pub(crate) fn next_order_id(&mut self) -> String {
        let id = self.next_order_id;
        self.next_order_id += 1;
        format!("paper-{}", id)
    }
}
