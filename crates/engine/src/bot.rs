// In crates/engine/src/bot.rs

use crate::market_data::MarketData;
use anyhow::Context;
use app_config::types::TradingSettings;
use core_types::{Position, Signal, Symbol};
use execution::{ExecutionReport, OrderExecutor};
use notifier::{Notifier, TradeEvent};
use risk::ProtectiveExits;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use strategies::Strategy;

/// Represents a single trading instance for one symbol.
///
/// Each cycle fetches candles, checks protective exits, asks the strategy
/// for a signal and hands it to the executor. Cycles never overlap.
pub struct TradingBot {
    symbol: Symbol,
    interval: String,
    candle_limit: u16,
    loop_interval: Duration,
    max_consecutive_failures: u32,
    market_data: Arc<dyn MarketData>,
    strategy: Box<dyn Strategy + Send + Sync>,
    exits: ProtectiveExits,
    executor: OrderExecutor,
    notifier: Arc<dyn Notifier>,
}

impl TradingBot {
    pub fn new(
        settings: &TradingSettings,
        market_data: Arc<dyn MarketData>,
        strategy: Box<dyn Strategy + Send + Sync>,
        exits: ProtectiveExits,
        executor: OrderExecutor,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        tracing::info!(
            symbol = %settings.symbol,
            interval = %settings.interval,
            strategy = strategy.name(),
            "Creating trading bot."
        );
        Self {
            symbol: settings.symbol(),
            interval: settings.interval.clone(),
            candle_limit: settings.candle_limit,
            loop_interval: settings.loop_interval(),
            max_consecutive_failures: settings.max_consecutive_failures.max(1),
            market_data,
            strategy,
            exits,
            executor,
            notifier,
        }
    }

    pub fn position(&self) -> Position {
        self.executor.position(&self.symbol)
    }

    /// Runs one cycle. Signals the executor refuses locally (already
    /// positioned, nothing to sell, not enough funds) are logged and do not
    /// count as a failure.
    pub async fn run_once(&mut self) -> anyhow::Result<ExecutionReport> {
        // An order left unconfirmed by an earlier cycle is settled first.
        if self.executor.unresolved_order(&self.symbol).is_some() {
            self.executor.settle_unresolved(&self.symbol).await?;
        }

        let klines = self
            .market_data
            .fetch_klines(&self.symbol, &self.interval, self.candle_limit)
            .await
            .with_context(|| format!("Failed to fetch klines for {}", self.symbol))?;
        let Some(last) = klines.last() else {
            anyhow::bail!("No klines returned for {}", self.symbol);
        };
        let last_close = last.close;

        // --- 1. Protective exits take precedence over the strategy ---
        let exit = match self.executor.position(&self.symbol) {
            Position::Open(holding) => self.exits.check(&holding, last_close),
            _ => None,
        };
        let signal = match exit {
            Some(reason) => {
                tracing::info!(symbol = %self.symbol, %reason, %last_close, "Protective exit; selling.");
                Signal::Sell
            }
            None => self.strategy.evaluate(&klines),
        };
        tracing::info!(
            symbol = %self.symbol,
            %signal,
            %last_close,
            position = %self.executor.position(&self.symbol).status(),
            "Cycle evaluated."
        );

        // --- 2. Execute ---
        match self.executor.handle_signal(signal, &self.symbol).await {
            Ok(report) => {
                if report != ExecutionReport::NoAction {
                    tracing::info!(symbol = %self.symbol, ?report, "Signal executed.");
                }
                Ok(report)
            }
            Err(e) if e.is_validation() => {
                tracing::info!(symbol = %self.symbol, %signal, reason = %e, "Signal skipped.");
                Ok(ExecutionReport::NoAction)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Runs cycles until `shutdown` resolves or too many cycles fail in a row.
    ///
    /// `shutdown` is only observed while sleeping between cycles, so a cycle
    /// that has started always runs to completion.
    pub async fn run_until<F>(&mut self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut consecutive_failures = 0u32;

        tracing::info!(symbol = %self.symbol, interval_secs = self.loop_interval.as_secs(), "Starting run loop.");
        loop {
            match self.run_once().await {
                Ok(_) => {
                    if consecutive_failures > 0 {
                        tracing::info!(after = consecutive_failures, "Cycle succeeded; failure count reset.");
                    }
                    consecutive_failures = 0;
                }
                Err(e) => {
                    consecutive_failures += 1;
                    tracing::error!(
                        symbol = %self.symbol,
                        error = %format!("{:#}", e),
                        consecutive_failures,
                        max = self.max_consecutive_failures,
                        "Cycle failed."
                    );

                    if consecutive_failures >= self.max_consecutive_failures {
                        let message = format!(
                            "Bot stopped after {} consecutive failed cycles. Last error: {:#}",
                            consecutive_failures, e
                        );
                        self.notify_error(message.clone()).await;
                        anyhow::bail!(message);
                    }

                    // The executor has already reported orders it could not confirm.
                    let reported = matches!(
                        e.downcast_ref::<execution::Error>(),
                        Some(execution::Error::UnresolvedOrder { .. })
                    );
                    if !reported {
                        self.notify_error(format!(
                            "Cycle failed ({}/{}): {:#}",
                            consecutive_failures, self.max_consecutive_failures, e
                        ))
                        .await;
                    }
                }
            }

            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!(symbol = %self.symbol, "Shutdown requested; stopping between cycles.");
                    return Ok(());
                }
                _ = tokio::time::sleep(self.loop_interval) => {}
            }
        }
    }

    async fn notify_error(&self, message: String) {
        if let Err(e) = self.notifier.notify(&TradeEvent::error(message)).await {
            tracing::warn!(notifier = self.notifier.name(), error = %e, "Failed to deliver error notification.");
        }
    }
}
