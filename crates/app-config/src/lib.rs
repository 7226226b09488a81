// In crates/app-config/src/lib.rs

use config::{Config, Environment, File};

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::Settings;

const PLACEHOLDER_KEYS: [&str; 2] = ["your_api_key_here", "your_api_secret_here"];

/// Loads the application settings from various sources.
///
/// This function orchestrates the layered configuration loading:
/// 1. Reads from a default `base.toml` file.
/// 2. Merges settings from an environment-specific file (e.g., `development.toml`).
/// 3. Merges settings from environment variables.
///
/// The result is validated before it is returned.
pub fn load_settings() -> Result<Settings> {
    // Get the current environment. Default to "development" if not set.
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

    let settings = Config::builder()
        // 1. Load the base configuration file.
        .add_source(File::with_name("config/base"))
        // 2. Load the environment-specific configuration file.
        .add_source(File::with_name(&format!("config/{}", environment)).required(false))
        // 3. Load settings from environment variables (e.g., `APP_BINANCE__API_KEY=...`).
        .add_source(environment_source())
        .build()?;

    // Deserialize the configuration into our `Settings` struct.
    let settings: Settings = settings.try_deserialize()?;
    settings.validate()?;

    Ok(settings)
}

/// Environment variables named `APP_<SECTION>__<KEY>`. The prefix is joined
/// with a single `_`; nested keys are split on `__`.
fn environment_source() -> Environment {
    Environment::with_prefix("APP")
        .prefix_separator("_")
        .separator("__")
}

impl Settings {
    /// Rejects settings the bot cannot trade with.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if !self.trading.dry_run {
            if self.binance.api_key.trim().is_empty()
                || PLACEHOLDER_KEYS.contains(&self.binance.api_key.as_str())
            {
                problems.push("binance.api_key is not set".to_string());
            }
            if self.binance.secret_key.trim().is_empty()
                || PLACEHOLDER_KEYS.contains(&self.binance.secret_key.as_str())
            {
                problems.push("binance.secret_key is not set".to_string());
            }
        }
        if self.trading.symbol.trim().is_empty() {
            problems.push("trading.symbol is empty".to_string());
        }
        if self.trading.candle_limit == 0 || self.trading.candle_limit > 1000 {
            problems.push(format!(
                "trading.candle_limit must be within 1..=1000, got {}",
                self.trading.candle_limit
            ));
        }
        if self.trading.max_consecutive_failures == 0 {
            problems.push("trading.max_consecutive_failures must be at least 1".to_string());
        }
        if self.execution.position_size <= rust_decimal::Decimal::ZERO {
            problems.push("execution.position_size must be positive".to_string());
        }
        if self.execution.retry.max_attempts == 0 {
            problems.push("execution.retry.max_attempts must be at least 1".to_string());
        }
        if self.execution.reconcile.max_polls == 0 {
            problems.push("execution.reconcile.max_polls must be at least 1".to_string());
        }
        let strategy_configured = match self.strategies.active.as_str() {
            "rsi_ema" => self.strategies.rsi_ema.is_some(),
            "ema_crossover" => self.strategies.ema_crossover.is_some(),
            _ => false,
        };
        if !strategy_configured {
            problems.push(format!(
                "strategies.active = \"{}\" has no parameter block",
                self.strategies.active
            ));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::Invalid(problems.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{FileFormat, Map};
    use rust_decimal_macros::dec;

    const BASE: &str = r#"
        [app]
        environment = "test"
        log_level = "info"

        [binance]
        rest_base_url = "https://testnet.binance.vision"

        [trading]
        symbol = "BTCUSDT"
        quote_asset = "USDT"
        interval = "15m"

        [execution]
        position_size = 20

        [execution.retry]
        max_attempts = 3
        delay_ms = 500

        [execution.reconcile]
        max_polls = 5
        poll_interval_ms = 1000
    "#;

    fn parse(extra: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(BASE, FileFormat::Toml))
            .add_source(File::from_str(extra, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn environment_variables_override_files() {
        let mut vars = Map::new();
        vars.insert("APP_BINANCE__API_KEY".to_string(), "key-from-env".to_string());
        vars.insert("APP_BINANCE__SECRET_KEY".to_string(), "secret-from-env".to_string());
        vars.insert("APP_TRADING__DRY_RUN".to_string(), "false".to_string());
        vars.insert("APP_EXECUTION__POSITION_SIZE".to_string(), "35".to_string());

        let settings: Settings = Config::builder()
            .add_source(File::from_str(BASE, FileFormat::Toml))
            .add_source(environment_source().source(Some(vars)))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.binance.api_key, "key-from-env");
        assert_eq!(settings.binance.secret_key, "secret-from-env");
        assert!(!settings.trading.dry_run);
        assert_eq!(settings.execution.position_size, dec!(35));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn defaults_fill_in_optional_sections() {
        let settings = parse("");

        assert!(settings.trading.dry_run);
        assert_eq!(settings.trading.candle_limit, 200);
        assert_eq!(settings.trading.max_consecutive_failures, 5);
        assert_eq!(settings.execution.position_size, dec!(20));
        assert_eq!(settings.execution.max_slippage_percent, None);
        assert_eq!(settings.execution.quantity_precision, 5);
        assert_eq!(settings.app.log_file, None);
        assert_eq!(settings.strategies.active, "rsi_ema");
        assert!(settings.strategies.rsi_ema.is_some());
        assert!(settings.notifier.line_token().is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn live_trading_requires_credentials() {
        let settings = parse(
            r#"
            [trading]
            symbol = "BTCUSDT"
            quote_asset = "USDT"
            interval = "15m"
            dry_run = false
            "#,
        );

        let err = settings.validate().unwrap_err().to_string();
        assert!(err.contains("api_key"));
        assert!(err.contains("secret_key"));
    }

    #[test]
    fn active_strategy_needs_its_parameters() {
        let settings = parse(
            r#"
            [strategies]
            active = "ema_crossover"
            "#,
        );

        let err = settings.validate().unwrap_err().to_string();
        assert!(err.contains("ema_crossover"));
    }

    #[test]
    fn simulation_rates_and_log_file_are_read() {
        let settings = parse(
            r#"
            [app]
            environment = "test"
            log_level = "info"
            log_file = "logs/bot.log"

            [simulation]
            taker_fee = 0.001
            slippage_rate = 0.0005
            starting_balance = 500
            "#,
        );

        assert_eq!(settings.simulation.slippage_rate, dec!(0.0005));
        assert_eq!(settings.simulation.starting_balance, dec!(500));
        assert_eq!(
            settings.app.log_file.as_deref(),
            Some(std::path::Path::new("logs/bot.log"))
        );
    }

    #[test]
    fn zero_attempts_is_invalid() {
        let mut settings = parse("");
        settings.execution.retry.max_attempts = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn blank_line_token_counts_as_unset() {
        let settings = parse(
            r#"
            [notifier]
            line_token = "  "
            "#,
        );
        assert!(settings.notifier.line_token().is_none());
    }
}
