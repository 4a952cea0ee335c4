//! ETF/future arbitrage trader - replay entry point
//!
//! Replays recorded market-data snapshots through the strategy core with
//! all outbound commands logged. Live connectivity belongs to the external
//! connector and is wired up elsewhere.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use etf_arb::{replay, StrategyConfig};

#[derive(Parser, Debug)]
#[command(name = "etf-arb")]
#[command(about = "ETF/future arbitrage autotrader replay harness", long_about = None)]
#[command(version)]
struct Cli {
    /// CSV file of recorded order-book and trade-tick snapshots
    #[arg(short, long)]
    data: PathBuf,

    /// Path to a JSON strategy configuration (defaults used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn setup_logging(verbose: bool) -> Result<()> {
    std::fs::create_dir_all("logs")?;

    let log_filename = format!(
        "replay_{}.log",
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let log_path = PathBuf::from("logs").join(&log_filename);

    let level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_appender = tracing_appender::rolling::never("logs", &log_filename);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(true);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_appender)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!("Logging initialized");
    info!("Log file: {}", log_path.display());

    Ok(())
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    setup_logging(cli.verbose)?;

    let config = match &cli.config {
        Some(path) => StrategyConfig::from_file(path)?,
        None => StrategyConfig::default(),
    };
    info!(
        position_limit = config.position_limit,
        message_limit = config.message_limit,
        "strategy configured"
    );

    replay::run(&cli.data, config)
}
