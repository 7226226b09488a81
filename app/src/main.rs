// In app/src/main.rs

use anyhow::{Context, Result};
use app_config::Settings;
use app_config::types::AppSettings;
use clap::{Parser, Subcommand};
use engine::{TradingBot, create_strategy};
use execution::{BinanceGateway, Gateway, OrderExecutor, PaperGateway};
use notifier::{LineNotifier, LogNotifier, Notifier};
use risk::ProtectiveExits;
use std::path::Path;
use std::sync::Arc;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "A single-symbol Binance Spot trading bot.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Runs the trading loop until Ctrl-C or too many consecutive failed cycles.
    Run,

    /// Runs a single trading cycle and exits.
    Once,

    /// Validates the configuration and checks that the venue is reachable.
    Check,
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    // Parse command-line arguments.
    let cli = Cli::parse();

    let settings = app_config::load_settings().context("Failed to load settings")?;
    init_tracing(&settings.app)?;

    tracing::info!(
        environment = %settings.app.environment,
        symbol = %settings.trading.symbol,
        dry_run = settings.trading.dry_run,
        "Starting spotbot"
    );

    // Match on the parsed command and call the appropriate handler.
    match cli.command {
        Commands::Run => {
            let mut bot = build_bot(&settings)?;
            bot.run_until(shutdown_signal()).await?;
        }
        Commands::Once => {
            let mut bot = build_bot(&settings)?;
            let report = bot.run_once().await?;
            tracing::info!(?report, position = %bot.position().status(), "Single cycle finished.");
        }
        Commands::Check => {
            handle_check(&settings).await?;
        }
    }

    tracing::info!("spotbot has finished successfully.");

    Ok(())
}

/// Installs the console layer and, when `app.log_file` is set, a plain-text
/// file layer. Both are filtered at `log_level` with HTTP internals held at WARN.
fn init_tracing(app: &AppSettings) -> Result<()> {
    let level: tracing::Level = app
        .log_level
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid app.log_level `{}`", app.log_level))?;

    let filter = tracing_subscriber::filter::Targets::new()
        .with_target("reqwest", tracing::Level::WARN)
        .with_target("hyper", tracing::Level::WARN)
        .with_target("hyper_util", tracing::Level::WARN)
        .with_default(level);

    let file_layer = match &app.log_file {
        Some(path) => Some(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender(path)?)
                .with_ansi(false)
                .with_filter(filter.clone()),
        ),
        None => None,
    };
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(filter);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(file_layer)
        .init();

    Ok(())
}

/// Opens `path` for appending, creating its directory if needed. The file is never rotated.
fn file_appender(path: &Path) -> Result<RollingFileAppender> {
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("app.log_file `{}` has no file name", path.display()))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create log directory `{}`", directory.display()))?;

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(directory)
        .with_context(|| format!("Failed to open log file `{}`", path.display()))
}

/// Resolves on Ctrl-C. The run loop only looks at it between cycles.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C; running until halted.");
        std::future::pending::<()>().await;
    }
    tracing::info!("Ctrl-C received; the bot will stop after the current cycle.");
}

// --- Component Instantiation ---

fn build_bot(settings: &Settings) -> Result<TradingBot> {
    let api_client = api_client::new(&settings.binance)?;

    // Conditionally instantiate the gateway based on the dry-run flag.
    let live: Arc<dyn Gateway> = Arc::new(BinanceGateway::new(api_client.clone()));
    let gateway: Arc<dyn Gateway> = if settings.trading.dry_run {
        tracing::info!(
            starting_balance = %settings.simulation.starting_balance,
            "DRY RUN: orders are simulated against live prices."
        );
        Arc::new(PaperGateway::new(live, settings.simulation.clone()))
    } else {
        tracing::warn!("LIVE TRADING IS ENABLED. REAL ORDERS WILL BE PLACED.");
        live
    };

    let notifier: Arc<dyn Notifier> = match settings.notifier.line_token() {
        Some(token) => Arc::new(LineNotifier::new(token)?),
        None => {
            tracing::info!("No LINE token configured; notifications go to the log only.");
            Arc::new(LogNotifier)
        }
    };

    let strategy = create_strategy(&settings.strategies)?;
    let exits = ProtectiveExits::new(settings.risk.clone())?;
    let executor = OrderExecutor::new(
        gateway,
        notifier.clone(),
        settings.execution.clone(),
        settings.trading.quote_asset.clone(),
        settings.trading.dry_run,
    );

    Ok(TradingBot::new(
        &settings.trading,
        Arc::new(api_client),
        strategy,
        exits,
        executor,
        notifier,
    ))
}

// --- "Check" Subcommand Logic ---

/// Confirms the venue answers and, when trading live, that the keys work.
async fn handle_check(settings: &Settings) -> Result<()> {
    let api_client = api_client::new(&settings.binance)?;
    let symbol = settings.trading.symbol();

    let price = api_client
        .get_ticker_price(&symbol)
        .await
        .with_context(|| format!("Failed to fetch the price of {}", symbol))?;
    tracing::info!(%symbol, %price, "Market data reachable.");

    let klines = api_client
        .get_klines(&symbol, &settings.trading.interval, settings.trading.candle_limit)
        .await?;
    tracing::info!(count = klines.len(), interval = %settings.trading.interval, "Klines fetched.");

    if settings.trading.dry_run {
        tracing::info!("Dry run: account access not checked.");
        return Ok(());
    }

    let account = api_client
        .get_account()
        .await
        .context("Failed to read the account; check the API key and secret")?;
    let quote = &settings.trading.quote_asset;
    tracing::info!(
        can_trade = account.can_trade,
        asset = %quote,
        free = %account.free(quote),
        "Account reachable."
    );
    if !account.can_trade {
        anyhow::bail!("The account is not permitted to trade.");
    }

    Ok(())
}
