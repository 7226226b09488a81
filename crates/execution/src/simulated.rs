// In crates/execution/src/simulated.rs

use crate::gateway::{Gateway, GatewayError};
use crate::types::PaperBook;
use app_config::types::SimulationSettings;
use async_trait::async_trait;
use core_types::{
    Fill, IdempotencyKey, OrderAmount, OrderOutcome, OrderRequest, OrderSide, OrderStatus,
    OrderType, Symbol,
};
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Base-asset precision applied to simulated fills.
const QUANTITY_DP: u32 = 8;

/// A gateway that fills orders against a paper account.
///
/// Prices come from `prices` (normally the live venue); fills, fees and
/// balances are simulated. Orders are remembered by idempotency key, so a
/// resubmission returns the first outcome instead of trading twice.
pub struct PaperGateway {
    prices: Arc<dyn Gateway>,
    settings: SimulationSettings,
    book: Mutex<PaperBook>,
}

impl PaperGateway {
    pub fn new(prices: Arc<dyn Gateway>, settings: SimulationSettings) -> Self {
        let book = PaperBook::new(settings.starting_balance);
        Self {
            prices,
            settings,
            book: Mutex::new(book),
        }
    }

    /// Quote-currency cash left in the paper account.
    pub async fn cash(&self) -> Decimal {
        self.book.lock().await.cash
    }

    pub async fn holding(&self, symbol: &Symbol) -> Decimal {
        self.book.lock().await.holding(symbol)
    }

    /// Fills a buy. The fee is taken from the received base asset.
    fn process_buy(&self, order: &OrderRequest, quote: Decimal, book: &mut PaperBook) -> OrderOutcome {
        // --- 1. Execution price with slippage (worse, i.e. higher, for a buy) ---
        let execution_price = quote * (Decimal::ONE + self.settings.slippage_rate);
        if order.order_type == OrderType::Limit {
            if let Some(limit) = order.limit_price {
                if execution_price > limit {
                    return rejected("immediate-or-cancel limit not reached");
                }
            }
        }

        // --- 2. Quantity and cost ---
        let quantity = match order.amount {
            OrderAmount::Notional(notional) => match notional.checked_div(execution_price) {
                Some(q) => q,
                None => return rejected("no price"),
            },
            OrderAmount::Quantity(quantity) => quantity,
        }
        .round_dp_with_strategy(QUANTITY_DP, RoundingStrategy::ToZero);
        if quantity <= Decimal::ZERO {
            return rejected("quantity rounds to zero");
        }

        let cost = quantity * execution_price;
        if book.cash < cost {
            return rejected("Account has insufficient balance for requested action.");
        }

        // --- 3. Update the book ---
        let received = (quantity * (Decimal::ONE - self.settings.taker_fee))
            .round_dp_with_strategy(QUANTITY_DP, RoundingStrategy::ToZero);
        book.cash -= cost;
        *book.holdings.entry(order.symbol.clone()).or_insert(Decimal::ZERO) += received;

        OrderOutcome::Filled(Fill {
            price: execution_price,
            quantity: received,
            exchange_order_id: book.next_order_id(),
        })
    }

    /// Fills a sell. The fee is taken from the quote proceeds.
    fn process_sell(&self, order: &OrderRequest, quote: Decimal, book: &mut PaperBook) -> OrderOutcome {
        let quantity = match order.amount {
            OrderAmount::Quantity(quantity) => quantity,
            OrderAmount::Notional(_) => return rejected("sells must be sized in base units"),
        };
        let held = book.holding(&order.symbol);
        if quantity <= Decimal::ZERO || held < quantity {
            return rejected("Account has insufficient balance for requested action.");
        }

        // Slippage makes a sell worse, i.e. lower.
        let execution_price = quote * (Decimal::ONE - self.settings.slippage_rate);
        let proceeds = quantity * execution_price;
        let fee = proceeds * self.settings.taker_fee;

        book.cash += proceeds - fee;
        book.holdings.insert(order.symbol.clone(), held - quantity);

        OrderOutcome::Filled(Fill {
            price: execution_price,
            quantity,
            exchange_order_id: book.next_order_id(),
        })
    }
}

fn rejected(reason: &str) -> OrderOutcome {
    OrderOutcome::Rejected {
        reason: reason.to_string(),
    }
}

#[async_trait]
impl Gateway for PaperGateway {
    fn name(&self) -> &'static str {
        "PaperGateway"
    }

    async fn get_quote_balance(&self, _asset: &str) -> Result<Decimal, GatewayError> {
        Ok(self.book.lock().await.cash)
    }

    async fn get_last_price(&self, symbol: &Symbol) -> Result<Decimal, GatewayError> {
        self.prices.get_last_price(symbol).await
    }

    async fn submit_order(&self, request: &OrderRequest) -> Result<OrderOutcome, GatewayError> {
        let mut book = self.book.lock().await;
        if let Some(outcome) = book.orders.get(&request.idempotency_key) {
            tracing::debug!(key = %request.idempotency_key, "Duplicate paper order collapsed.");
            return Ok(outcome.clone());
        }

        let quote = self.prices.get_last_price(&request.symbol).await?;
        let outcome = match request.side {
            OrderSide::Buy => self.process_buy(request, quote, &mut book),
            OrderSide::Sell => self.process_sell(request, quote, &mut book),
        };

        tracing::info!(
            key = %request.idempotency_key,
            side = %request.side,
            %quote,
            cash = %book.cash,
            ?outcome,
            "Paper order processed."
        );
        book.orders
            .insert(request.idempotency_key.clone(), outcome.clone());
        Ok(outcome)
    }

    async fn get_order_status(
        &self,
        _symbol: &Symbol,
        key: &IdempotencyKey,
    ) -> Result<OrderStatus, GatewayError> {
        let book = self.book.lock().await;
        Ok(match book.orders.get(key) {
            Some(OrderOutcome::Filled(fill)) => OrderStatus::Filled(fill.clone()),
            Some(OrderOutcome::Rejected { reason }) => OrderStatus::Rejected {
                reason: reason.clone(),
            },
            Some(OrderOutcome::Unknown) => OrderStatus::Pending,
            None => OrderStatus::NotFound,
        })
    }
}
