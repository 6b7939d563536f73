//! Commission schedule.

use std::fmt;
use std::str::FromStr;

use btk_schemas::Micros;

/// The only broker this kernel prices commissions for. Any other broker
/// name is a fatal configuration error rather than a silent zero-commission
/// fallback — a misconfigured run should fail loudly before it produces
/// numbers someone might trust.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Broker {
    InteractiveBrokers,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBrokerError(pub String);

impl fmt::Display for UnknownBrokerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown broker: {:?} (supported: ib, interactive, interactive brokers)", self.0)
    }
}

impl std::error::Error for UnknownBrokerError {}

impl FromStr for Broker {
    type Err = UnknownBrokerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ib" | "interactive" | "interactive brokers" => Ok(Broker::InteractiveBrokers),
            _ => Err(UnknownBrokerError(s.to_string())),
        }
    }
}

/// Minimum commission per trade: $1.00.
const MIN_ORDER_COMMISSION: Micros = Micros::new(1_000_000);

/// $0.01 per share, flat (not scaled by price).
const PER_SHARE_MICROS: i64 = 10_000;

/// Commission is capped at 0.5% of trade notional.
const MAX_PCT_NUMERATOR: i64 = 5;
const MAX_PCT_DENOMINATOR: i64 = 1000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CommissionSchedule {
    pub include_commission: bool,
    pub broker: Broker,
}

impl CommissionSchedule {
    pub fn new(include_commission: bool, broker: Broker) -> Self {
        CommissionSchedule {
            include_commission,
            broker,
        }
    }

    /// Commission for a fill of `shares` (always given as a non-negative
    /// count) at `price`. Zero when `include_commission` is off.
    ///
    /// The raw per-share charge is clamped against a $1.00 floor and a 0.5%
    /// of trade notional ceiling, floor checked first — a trade whose raw
    /// charge already exceeds the ceiling is capped there directly, it is
    /// never additionally routed through the floor.
    pub fn commission(&self, price: Micros, shares: i64) -> Micros {
        if !self.include_commission {
            return Micros::ZERO;
        }
        let shares_abs = shares.unsigned_abs() as i64;
        let raw = Micros::new(PER_SHARE_MICROS.saturating_mul(shares_abs));
        let notional = price.mul_qty(shares_abs);
        let max_cap = notional.mul_ratio(MAX_PCT_NUMERATOR, MAX_PCT_DENOMINATOR);

        if raw <= MIN_ORDER_COMMISSION {
            MIN_ORDER_COMMISSION
        } else if raw >= max_cap {
            max_cap
        } else {
            raw
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broker_names_are_case_insensitive() {
        assert_eq!(Broker::from_str("IB"), Ok(Broker::InteractiveBrokers));
        assert_eq!(Broker::from_str("Interactive Brokers"), Ok(Broker::InteractiveBrokers));
        assert!(Broker::from_str("schwab").is_err());
    }

    #[test]
    fn commission_is_zero_when_disabled() {
        let sched = CommissionSchedule::new(false, Broker::InteractiveBrokers);
        assert_eq!(sched.commission(Micros::new(83_810_000), 1000), Micros::ZERO);
    }

    #[test]
    fn small_orders_hit_the_dollar_floor() {
        let sched = CommissionSchedule::new(true, Broker::InteractiveBrokers);
        // 2 shares @ $83.81: raw = 0.01*2 = $0.02, well under the $1 floor.
        let c = sched.commission(Micros::new(83_810_000), 2);
        assert_eq!(c, MIN_ORDER_COMMISSION);
    }

    #[test]
    fn large_orders_hit_the_percentage_ceiling() {
        let sched = CommissionSchedule::new(true, Broker::InteractiveBrokers);
        // 100,000 shares @ $1.00: raw = 0.01*100_000 = $1000, ceiling = 0.5%*100_000 = $500.
        let price = Micros::new(1_000_000);
        let c = sched.commission(price, 100_000);
        assert_eq!(c, price.mul_qty(100_000).mul_ratio(5, 1000));
    }
}
