//! Output artifact: the dense, ascending, per-event-timestamp portfolio
//! value table the driver returns, plus a CSV writer mirroring the
//! loader's conventions.

use std::fs;
use std::path::Path;

use btk_execution::Diagnostic;
use btk_portfolio::PortfolioSnapshot;

use crate::errors::LoadError;

/// The result of a completed run: the portfolio-value time series plus any
/// non-fatal diagnostics accumulated along the way. The kernel never logs
/// these itself — it hands them up for the caller (`btk-cli`) to log.
#[derive(Clone, Debug, PartialEq)]
pub struct BacktestReport {
    pub snapshots: Vec<PortfolioSnapshot>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Render the snapshot series as `time,cash,investment_value,portfolio_value`
/// CSV text, six decimal places per money column (matching `Micros`'
/// `Display` impl).
pub fn to_csv_string(snapshots: &[PortfolioSnapshot]) -> String {
    let mut out = String::from("time,cash,investment_value,portfolio_value\n");
    for s in snapshots {
        out.push_str(&format!(
            "{},{},{},{}\n",
            s.time.format("%Y-%m-%d %H:%M:%S%.6f"),
            s.cash,
            s.investment_value,
            s.portfolio_value
        ));
    }
    out
}

pub fn write_csv_file(path: impl AsRef<Path>, snapshots: &[PortfolioSnapshot]) -> Result<(), LoadError> {
    fs::write(path, to_csv_string(snapshots))?;
    Ok(())
}
