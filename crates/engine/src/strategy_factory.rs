//! This module provides a factory for creating strategy instances from configuration.

use anyhow::{Context, Result};
use app_config::types::StrategySettings;
use strategies::{Strategy, ema_crossover::EmaCrossover, rsi_ema::RsiEma};

/// Creates the strategy named by `settings.active` from its parameter block.
pub fn create_strategy(settings: &StrategySettings) -> Result<Box<dyn Strategy + Send + Sync>> {
    let strategy: Box<dyn Strategy + Send + Sync> = match settings.active.as_str() {
        "rsi_ema" => {
            let params = settings
                .rsi_ema
                .clone()
                .context("Strategy `rsi_ema` is active but [strategies.rsi_ema] is missing")?;
            Box::new(RsiEma::new(params)?)
        }
        "ema_crossover" => {
            let params = settings.ema_crossover.clone().context(
                "Strategy `ema_crossover` is active but [strategies.ema_crossover] is missing",
            )?;
            Box::new(EmaCrossover::new(params)?)
        }
        other => anyhow::bail!("Unknown strategy `{}`", other),
    };

    tracing::info!(name = strategy.name(), "Strategy created.");
    Ok(strategy)
}
