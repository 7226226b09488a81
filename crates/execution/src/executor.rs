// In crates/execution/src/executor.rs

use crate::gateway::Gateway;
use crate::ledger::PositionLedger;
use crate::retry::{reconcile, submit_with_retry};
use crate::types::ExecutionReport;
use crate::{Error, Result};
use app_config::types::ExecutionSettings;
use core_types::{
    notional_quantity, profit_percent, Fill, OrderAmount, OrderOutcome, OrderRequest, OrderSide,
    Position, Signal, Symbol,
};
use notifier::{Notifier, TradeEvent};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;
use std::sync::Arc;

/// Turns signals into orders while keeping at most one position per symbol.
///
/// The executor owns the ledger. An order whose outcome could not be
/// confirmed is remembered per symbol and blocks every further order for
/// that symbol until reconciliation settles it.
pub struct OrderExecutor {
    gateway: Arc<dyn Gateway>,
    notifier: Arc<dyn Notifier>,
    settings: ExecutionSettings,
    quote_asset: String,
    dry_run: bool,
    ledger: PositionLedger,
    unresolved: HashMap<Symbol, OrderRequest>,
}

impl OrderExecutor {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        notifier: Arc<dyn Notifier>,
        settings: ExecutionSettings,
        quote_asset: impl Into<String>,
        dry_run: bool,
    ) -> Self {
        Self {
            gateway,
            notifier,
            settings,
            quote_asset: quote_asset.into(),
            dry_run,
            ledger: PositionLedger::new(),
            unresolved: HashMap::new(),
        }
    }

    /// The bot's current belief about `symbol`.
    pub fn position(&self, symbol: &Symbol) -> Position {
        self.ledger.current(symbol)
    }

    /// The order for `symbol` still awaiting confirmation, if any.
    pub fn unresolved_order(&self, symbol: &Symbol) -> Option<&OrderRequest> {
        self.unresolved.get(symbol)
    }

    pub async fn handle_signal(&mut self, signal: Signal, symbol: &Symbol) -> Result<ExecutionReport> {
        match signal {
            Signal::Wait => Ok(ExecutionReport::NoAction),
            Signal::Buy => {
                self.settle_unresolved(symbol).await?;
                self.buy(symbol).await
            }
            Signal::Sell => {
                self.settle_unresolved(symbol).await?;
                self.sell(symbol).await
            }
        }
    }

    async fn buy(&mut self, symbol: &Symbol) -> Result<ExecutionReport> {
        if !self.ledger.current(symbol).is_none() {
            return Err(Error::AlreadyPositioned(symbol.clone()));
        }

        let size = self.settings.position_size;
        let available = self.gateway.get_quote_balance(&self.quote_asset).await?;
        if available < size {
            return Err(Error::InsufficientFunds {
                available,
                required: size,
            });
        }

        let request = match self.bounded_buy(symbol, size).await? {
            Some(request) => request,
            None => {
                let reason = "position size is below the minimum tradable quantity".to_string();
                tracing::warn!(%symbol, %size, "{}", reason);
                return Ok(ExecutionReport::Rejected {
                    side: OrderSide::Buy,
                    reason,
                });
            }
        };

        tracing::info!(%symbol, key = %request.idempotency_key, %size, "Submitting buy.");
        let outcome = self.submit(&request).await?;
        self.apply_buy(&request, outcome).await
    }

    /// Builds the entry order: a notional market buy, or an immediate-or-cancel
    /// limit buy when a slippage bound is configured. `None` if the bounded
    /// quantity truncates to zero.
    async fn bounded_buy(&self, symbol: &Symbol, size: Decimal) -> Result<Option<OrderRequest>> {
        let Some(max_slippage) = self.settings.max_slippage_percent else {
            return Ok(Some(OrderRequest::market_buy(symbol.clone(), size)));
        };

        let last_price = self.gateway.get_last_price(symbol).await?;
        let limit_price = last_price * (Decimal::ONE + max_slippage / Decimal::ONE_HUNDRED);
        let quantity = notional_quantity(size, limit_price).round_dp_with_strategy(
            self.settings.quantity_precision,
            RoundingStrategy::ToZero,
        );
        if quantity <= Decimal::ZERO {
            return Ok(None);
        }

        Ok(Some(OrderRequest::limit_buy(symbol.clone(), quantity, limit_price)))
    }

    async fn sell(&mut self, symbol: &Symbol) -> Result<ExecutionReport> {
        if self.ledger.current(symbol).is_none() {
            return Err(Error::NoPosition(symbol.clone()));
        }

        let holding = self.ledger.begin_close(symbol)?;
        let request = OrderRequest::market_sell(symbol.clone(), holding.quantity);

        tracing::info!(%symbol, key = %request.idempotency_key, quantity = %holding.quantity, "Submitting sell.");
        let outcome = self.submit(&request).await?;
        self.apply_sell(&request, outcome).await
    }

    /// Submits with retries and, if the outcome is unknown, reconciles it.
    /// An order that stays unresolved is parked and reported as fatal.
    async fn submit(&mut self, request: &OrderRequest) -> Result<OrderOutcome> {
        let outcome =
            submit_with_retry(self.gateway.as_ref(), request, &self.settings.retry).await;
        if outcome != OrderOutcome::Unknown {
            return Ok(outcome);
        }

        self.unresolved
            .insert(request.symbol.clone(), request.clone());
        tracing::warn!(symbol = %request.symbol, key = %request.idempotency_key, "Order outcome unknown, reconciling.");

        let outcome = reconcile(self.gateway.as_ref(), request, &self.settings.reconcile).await;
        if outcome == OrderOutcome::Unknown {
            return Err(self.unresolved_error(request).await);
        }

        self.unresolved.remove(&request.symbol);
        Ok(outcome)
    }

    /// Retries reconciliation of a parked order for `symbol` and applies the
    /// result. Fails with `UnresolvedOrder` if it is still unresolved.
    pub async fn settle_unresolved(&mut self, symbol: &Symbol) -> Result<()> {
        let Some(request) = self.unresolved.get(symbol).cloned() else {
            return Ok(());
        };

        tracing::info!(%symbol, key = %request.idempotency_key, "Reconciling previously unresolved order.");
        let outcome = reconcile(self.gateway.as_ref(), &request, &self.settings.reconcile).await;
        if outcome == OrderOutcome::Unknown {
            return Err(self.unresolved_error(&request).await);
        }

        self.unresolved.remove(symbol);
        let report = match request.side {
            OrderSide::Buy => self.apply_buy(&request, outcome).await?,
            OrderSide::Sell => self.apply_sell(&request, outcome).await?,
        };
        tracing::info!(%symbol, ?report, "Previously unresolved order settled.");
        Ok(())
    }

    async fn apply_buy(&mut self, request: &OrderRequest, outcome: OrderOutcome) -> Result<ExecutionReport> {
        let symbol = &request.symbol;
        match outcome {
            OrderOutcome::Filled(fill) => {
                let quantity = recorded_quantity(request, &fill);
                self.ledger
                    .open(symbol, fill.price, quantity, fill.exchange_order_id.clone())?;
                tracing::info!(%symbol, price = %fill.price, %quantity, order_id = %fill.exchange_order_id, "Position opened.");

                let notional = match request.amount {
                    OrderAmount::Notional(notional) => notional,
                    OrderAmount::Quantity(_) => fill.price * quantity,
                };
                self.notify(TradeEvent::BuyFilled {
                    symbol: symbol.clone(),
                    price: fill.price,
                    notional,
                    quantity,
                    dry_run: self.dry_run,
                })
                .await;

                Ok(ExecutionReport::Opened {
                    symbol: symbol.clone(),
                    fill,
                    quantity,
                })
            }
            OrderOutcome::Rejected { reason } => {
                tracing::warn!(%symbol, key = %request.idempotency_key, %reason, "Buy rejected.");
                self.notify(TradeEvent::error(format!("BUY {} rejected: {}", symbol, reason)))
                    .await;
                Ok(ExecutionReport::Rejected {
                    side: OrderSide::Buy,
                    reason,
                })
            }
            OrderOutcome::Unknown => Err(self.unresolved_error(request).await),
        }
    }

    async fn apply_sell(&mut self, request: &OrderRequest, outcome: OrderOutcome) -> Result<ExecutionReport> {
        let symbol = &request.symbol;
        match outcome {
            OrderOutcome::Filled(fill) => {
                let holding = self.ledger.close(symbol)?;
                let profit = profit_percent(holding.entry_price, fill.price);
                if fill.quantity > Decimal::ZERO && fill.quantity < holding.quantity {
                    tracing::warn!(
                        %symbol,
                        held = %holding.quantity,
                        sold = %fill.quantity,
                        "Sell filled partially; the remainder is no longer tracked."
                    );
                }
                tracing::info!(%symbol, price = %fill.price, profit_percent = %profit.round_dp(2), "Position closed.");

                self.notify(TradeEvent::SellFilled {
                    symbol: symbol.clone(),
                    price: fill.price,
                    quantity: holding.quantity,
                    profit_percent: profit,
                    dry_run: self.dry_run,
                })
                .await;

                Ok(ExecutionReport::Closed {
                    symbol: symbol.clone(),
                    fill,
                    profit_percent: profit,
                })
            }
            OrderOutcome::Rejected { reason } => {
                self.ledger.abort_close(symbol)?;
                tracing::warn!(%symbol, key = %request.idempotency_key, %reason, "Sell rejected; position stays open.");
                self.notify(TradeEvent::error(format!("SELL {} rejected: {}", symbol, reason)))
                    .await;
                Ok(ExecutionReport::Rejected {
                    side: OrderSide::Sell,
                    reason,
                })
            }
            OrderOutcome::Unknown => Err(self.unresolved_error(request).await),
        }
    }

    async fn unresolved_error(&self, request: &OrderRequest) -> Error {
        tracing::error!(
            symbol = %request.symbol,
            key = %request.idempotency_key,
            side = %request.side,
            "Order could not be confirmed; manual reconciliation required."
        );
        self.notify(TradeEvent::error(format!(
            "{} {} order {} could not be confirmed. Check the account manually.",
            request.side, request.symbol, request.idempotency_key
        )))
        .await;

        Error::UnresolvedOrder {
            symbol: request.symbol.clone(),
            key: request.idempotency_key.clone(),
        }
    }

    async fn notify(&self, event: TradeEvent) {
        if let Err(e) = self.notifier.notify(&event).await {
            tracing::warn!(notifier = self.notifier.name(), error = %e, "Failed to deliver notification.");
        }
    }
}

/// The venue-reported quantity, or the requested amount converted at the fill price.
fn recorded_quantity(request: &OrderRequest, fill: &Fill) -> Decimal {
    if fill.quantity > Decimal::ZERO {
        return fill.quantity;
    }
    match request.amount {
        OrderAmount::Notional(notional) => notional_quantity(notional, fill.price),
        OrderAmount::Quantity(quantity) => quantity,
    }
}
