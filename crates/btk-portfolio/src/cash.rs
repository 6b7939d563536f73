//! Cash balance timeline with "last recorded at or before t" lookup.

use std::collections::BTreeMap;

use btk_schemas::{Micros, Timestamp};

/// Records cash balance at the instants it changes; querying at an
/// arbitrary `t` returns the balance most recently recorded at or before
/// `t`, carrying it forward across ticks where cash did not move.
#[derive(Clone, Debug, Default)]
pub struct CashTimeline(BTreeMap<Timestamp, Micros>);

impl CashTimeline {
    pub fn new(initial_time: Timestamp, initial_cash: Micros) -> Self {
        let mut m = BTreeMap::new();
        m.insert(initial_time, initial_cash);
        CashTimeline(m)
    }

    /// Record a new balance at `time`. Overwrites any prior record at the
    /// exact same timestamp — several cash-affecting events can share one
    /// instant, and only the final balance for that instant matters.
    pub fn set(&mut self, time: Timestamp, value: Micros) {
        self.0.insert(time, value);
    }

    pub fn get(&self, time: Timestamp) -> Micros {
        self.0
            .range(..=time)
            .next_back()
            .map(|(_, v)| *v)
            .unwrap_or(Micros::ZERO)
    }

    pub fn latest(&self) -> Micros {
        self.0.values().next_back().copied().unwrap_or(Micros::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn t(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn lookup_carries_forward_last_known_value() {
        let mut tl = CashTimeline::new(t("2024-01-02 09:30:00"), Micros::new(100_000_000));
        tl.set(t("2024-01-02 10:00:00"), Micros::new(90_000_000));

        assert_eq!(tl.get(t("2024-01-02 09:45:00")), Micros::new(100_000_000));
        assert_eq!(tl.get(t("2024-01-02 10:00:00")), Micros::new(90_000_000));
        assert_eq!(tl.get(t("2024-01-02 12:00:00")), Micros::new(90_000_000));
    }

    #[test]
    fn lookup_before_first_record_returns_zero() {
        let tl = CashTimeline::new(t("2024-01-02 09:30:00"), Micros::new(100_000_000));
        assert_eq!(tl.get(t("2024-01-01 00:00:00")), Micros::ZERO);
    }
}
