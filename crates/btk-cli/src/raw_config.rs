//! YAML-shaped config, one step removed from [`btk_engine::SessionConfig`].
//!
//! Kept here rather than in `btk-engine` so the kernel crate never takes a
//! `serde` dependency: only the CLI's IO boundary needs to deserialize
//! loosely-typed config into the kernel's validated types.

use anyhow::Result;
use btk_engine::SessionConfig;
use serde::Deserialize;

fn default_market_open() -> String {
    btk_engine::config::DEFAULT_MARKET_OPEN.to_string()
}

fn default_market_close() -> String {
    btk_engine::config::DEFAULT_MARKET_CLOSE.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSessionConfig {
    pub initial_cash: f64,
    #[serde(default)]
    pub include_commission: bool,
    pub broker: String,
    #[serde(default = "default_market_open")]
    pub market_open_time: String,
    #[serde(default = "default_market_close")]
    pub market_close_time: String,
    #[serde(default)]
    pub verbose: bool,
}

impl RawSessionConfig {
    pub fn into_session_config(self) -> Result<SessionConfig> {
        SessionConfig::build(
            self.initial_cash,
            self.include_commission,
            &self.broker,
            &self.market_open_time,
            &self.market_close_time,
            self.verbose,
        )
        .map_err(|e| anyhow::anyhow!("{e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_minimal_yaml_with_defaults() {
        let yaml = "initial_cash: 10000\nbroker: ib\n";
        let raw: RawSessionConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(raw.market_open_time, "09:30:00");
        assert_eq!(raw.market_close_time, "16:00:00");
        assert!(!raw.include_commission);
        let cfg = raw.into_session_config().unwrap();
        assert_eq!(cfg.initial_cash, btk_schemas::Micros::from_dollars(10_000.0));
    }
}
