//! `btk` — run the backtesting kernel against a tick CSV and a YAML session
//! config, writing the portfolio-value time series to an output CSV.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;

use btk_engine::{Driver, SessionConfig};
use btk_execution::Diagnostic;

mod builtin_strategies;
mod raw_config;

use builtin_strategies::{BuyAndHoldOnce, NoOpStrategy};
use raw_config::RawSessionConfig;

#[derive(Parser)]
#[command(name = "btk")]
#[command(about = "Event-driven equities backtesting kernel", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a backtest over a tick CSV and write the portfolio-value series.
    Run {
        /// Path to the tick CSV (DATE_TIME,SEC,TYPE,BID,ASK,BID_SIZE,ASK_SIZE,PRICE,SIZE).
        #[arg(long)]
        ticks: PathBuf,

        /// Path to the session config YAML.
        #[arg(long)]
        config: PathBuf,

        /// Path the output portfolio-value CSV is written to.
        #[arg(long)]
        out: PathBuf,

        /// Comma-separated ticker universe this run tracks.
        #[arg(long, value_delimiter = ',')]
        tickers: Vec<String>,

        /// Which built-in strategy to run: "noop" (default) or
        /// "buy-and-hold:<TICKER>:<SHARES>".
        #[arg(long, default_value = "noop")]
        strategy: String,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Run { ticks, config, out, tickers, strategy } => run(ticks, config, out, tickers, &strategy),
    }
}

fn run(ticks_path: PathBuf, config_path: PathBuf, out_path: PathBuf, tickers: Vec<String>, strategy_spec: &str) -> Result<()> {
    let raw = std::fs::read_to_string(&config_path)
        .with_context(|| format!("reading config file {}", config_path.display()))?;
    let raw: RawSessionConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("parsing config file {}", config_path.display()))?;
    let config = raw.into_session_config().context("invalid session configuration")?;
    let verbose = config.verbose;

    let ticks = btk_engine::loader::load_csv_file(&ticks_path)
        .with_context(|| format!("loading ticks from {}", ticks_path.display()))?;

    let mut driver = Driver::new(config, tickers).context("initializing driver")?;

    let report = match strategy_spec.strip_prefix("buy-and-hold:") {
        Some(rest) => {
            let (ticker, shares) = rest.split_once(':').context("buy-and-hold strategy needs <TICKER>:<SHARES>")?;
            let shares: i64 = shares.parse().context("buy-and-hold share count must be an integer")?;
            let mut strategy = BuyAndHoldOnce::new(ticker, shares);
            driver.run(&ticks, &mut strategy).map_err(|e| anyhow::anyhow!("{e}"))?
        }
        None => {
            let mut strategy = NoOpStrategy;
            driver.run(&ticks, &mut strategy).map_err(|e| anyhow::anyhow!("{e}"))?
        }
    };

    if verbose {
        for diagnostic in &report.diagnostics {
            log_diagnostic(diagnostic);
        }
    }

    btk_engine::report::write_csv_file(&out_path, &report.snapshots)
        .with_context(|| format!("writing report to {}", out_path.display()))?;

    tracing::info!(
        rows = report.snapshots.len(),
        diagnostics = report.diagnostics.len(),
        "backtest complete"
    );
    Ok(())
}

fn log_diagnostic(diagnostic: &Diagnostic) {
    match diagnostic {
        Diagnostic::ValidationError { .. } => warn!("{diagnostic}"),
        Diagnostic::InsufficientCashWarning { .. } => warn!("{diagnostic}"),
        Diagnostic::NotFillableNotice { .. } => warn!("{diagnostic}"),
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}
