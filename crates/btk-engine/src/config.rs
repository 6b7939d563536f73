//! Session configuration: the fatal pre-run knobs a caller supplies before
//! any event is processed.

use std::str::FromStr;

use btk_portfolio::Broker;
use btk_schemas::Micros;
use chrono::NaiveTime;

use crate::errors::ConfigError;

pub const DEFAULT_MARKET_OPEN: &str = "09:30:00";
pub const DEFAULT_MARKET_CLOSE: &str = "16:00:00";

/// Everything the driver needs to know before it can start popping events.
/// Mirrors `BacktestConfig` in shape: a plain value struct with a
/// `test_defaults()` constructor for unit tests, built by the caller (here,
/// `btk-cli`) from whatever configuration source it has.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    pub initial_cash: Micros,
    pub include_commission: bool,
    pub broker: Broker,
    pub market_open_time: NaiveTime,
    pub market_close_time: NaiveTime,
    pub verbose: bool,
}

impl SessionConfig {
    /// Reasonable defaults for unit tests: $10,000 starting cash, no
    /// commission, Interactive Brokers' schedule, standard US equity
    /// session hours. Not meant to stand in for a caller's real config.
    pub fn test_defaults() -> Self {
        SessionConfig {
            initial_cash: Micros::from_dollars(10_000.0),
            include_commission: false,
            broker: Broker::InteractiveBrokers,
            market_open_time: NaiveTime::from_hms_opt(9, 30, 0).expect("valid time"),
            market_close_time: NaiveTime::from_hms_opt(16, 0, 0).expect("valid time"),
            verbose: false,
        }
    }

    /// Build from loosely-typed pieces (decimal dollars, broker name,
    /// `HH:MM:SS` wall-clock strings) the way a deserialized config file
    /// would hand them over. Fatal on any malformed field — this is the
    /// kernel's only pre-run validation boundary.
    pub fn build(
        initial_cash_dollars: f64,
        include_commission: bool,
        broker: &str,
        market_open_time: &str,
        market_close_time: &str,
        verbose: bool,
    ) -> Result<Self, ConfigError> {
        if initial_cash_dollars < 0.0 {
            return Err(ConfigError::NegativeInitialCash(initial_cash_dollars));
        }
        let broker = Broker::from_str(broker).map_err(ConfigError::UnknownBroker)?;
        let market_open_time = parse_wall_clock("market_open_time", market_open_time)?;
        let market_close_time = parse_wall_clock("market_close_time", market_close_time)?;
        Ok(SessionConfig {
            initial_cash: Micros::from_dollars(initial_cash_dollars),
            include_commission,
            broker,
            market_open_time,
            market_close_time,
            verbose,
        })
    }
}

fn parse_wall_clock(field: &'static str, value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value, "%H:%M:%S").map_err(|_| ConfigError::InvalidTime {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_accepts_known_broker_aliases() {
        let cfg = SessionConfig::build(10_000.0, false, "interactive brokers", "09:30:00", "16:00:00", false).unwrap();
        assert_eq!(cfg.broker, Broker::InteractiveBrokers);
    }

    #[test]
    fn build_rejects_unknown_broker() {
        let err = SessionConfig::build(10_000.0, false, "schwab", "09:30:00", "16:00:00", false).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownBroker(_)));
    }

    #[test]
    fn build_rejects_negative_initial_cash() {
        let err = SessionConfig::build(-1.0, false, "ib", "09:30:00", "16:00:00", false).unwrap_err();
        assert!(matches!(err, ConfigError::NegativeInitialCash(_)));
    }

    #[test]
    fn build_rejects_malformed_time() {
        let err = SessionConfig::build(10_000.0, false, "ib", "9:30am", "16:00:00", false).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTime { .. }));
    }
}
