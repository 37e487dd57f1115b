//! SignalTrader - Main Entry Point
//!
//! Polls one symbol on one market, trades on indicator verdicts and
//! journals every action until interrupted.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use signal_trader::common::display::TableReporter;
use signal_trader::config::load_config;
use signal_trader::exchange::build_exchange;
use signal_trader::journal::{FileJournal, PgJournal, SharedActionLog};
use signal_trader::strategy::{
    bootstrap, build_indicator, FixedResolver, IntervalTicker, LoopSettings, PromptResolver,
    ReferenceResolver, TradeLimits, TradingLoop,
};
use signal_trader::ActionType;

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Market to trade on
    #[arg(short, long, default_value = "binance")]
    market: String,

    /// Seconds between cycles
    #[arg(short, long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    interval: u64,

    /// Symbol to trade
    #[arg(short, long, default_value = "BTCUSDT")]
    symbol: String,

    /// Indicator deciding when to trade (percent, moving_average)
    #[arg(long, default_value = "percent")]
    indicator: String,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Compute and display decisions without submitting orders
    #[arg(short = 't', long)]
    dry_run: bool,

    /// Do not journal dry-run actions
    #[arg(long, requires = "dry_run")]
    no_dry_run_log: bool,

    /// Last action when the journal is empty (skips the prompt)
    #[arg(long, value_parser = parse_seed_action, requires = "seed_price")]
    seed_action: Option<ActionType>,

    /// Last action price when the journal is empty
    #[arg(long, requires = "seed_action")]
    seed_price: Option<Decimal>,

    /// Amount held after the seeded buy
    #[arg(long, requires = "seed_action")]
    seed_quantity: Option<Decimal>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn parse_seed_action(value: &str) -> std::result::Result<ActionType, String> {
    match value.to_lowercase().as_str() {
        "buy" => Ok(ActionType::Buy),
        "sell" => Ok(ActionType::Sell),
        other => Err(format!("'{}' is not buy or sell", other)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting SignalTrader");
    info!("Configuration file: {}", args.config);

    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let config = load_config(Some(&args.config)).context("loading configuration")?;
    let market = config.market(&args.market)?;

    let exchange = build_exchange(&args.market, &config)?;
    let indicator = build_indicator(&args.indicator, &config.indicators)?;

    let journal: SharedActionLog = match &config.database {
        Some(database) => Arc::new(PgJournal::connect(database).await?),
        None => {
            info!("Journaling to {}", config.trader.log_dir);
            Arc::new(FileJournal::new(
                &config.trader.log_dir,
                config.trader.log_type,
            ))
        }
    };

    let mut resolver: Box<dyn ReferenceResolver> = match args.seed_action {
        Some(action_type) => Box::new(FixedResolver::new(
            action_type,
            args.seed_price,
            args.seed_quantity,
        )),
        None => Box::new(PromptResolver::stdio()),
    };

    let reference = bootstrap(
        journal.as_ref(),
        resolver.as_mut(),
        &args.market,
        &args.symbol,
        Utc::now().timestamp(),
    )
    .await
    .context("establishing the reference action")?;

    if args.dry_run {
        warn!("Dry run: no orders will be submitted");
    }

    let settings = LoopSettings {
        market: args.market.clone(),
        symbol: args.symbol.clone(),
        limits: TradeLimits::from_market(market),
        dry_run: args.dry_run,
        persist_dry_run: config.trader.persist_dry_run && !args.no_dry_run_log,
    };

    let mut trading_loop = TradingLoop::new(exchange, indicator, journal, settings);
    let mut ticker = IntervalTicker::from_secs(args.interval);
    let mut reporter = TableReporter::stdout();

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let last = trading_loop
        .run(reference, &mut ticker, shutdown, &mut reporter)
        .await;

    info!(
        "Last reference: {} {} at {}",
        last.action_type(),
        last.symbol(),
        last.action_price()
    );

    Ok(())
}
