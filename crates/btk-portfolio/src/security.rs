//! Per-ticker top-of-book state fed by QUOTE and TRADE events.

use btk_schemas::{Micros, Ticker, Timestamp};

/// The most recently observed quote/trade for one ticker.
///
/// Sizes default to `0` rather than `Option<i64>`: the order-matching
/// decision table already treats a size of zero as "nothing fillable", so a
/// missing size and a known-zero size behave identically and don't need a
/// separate representation. Prices stay `Option<Micros>` because "no quote
/// has arrived yet" genuinely differs from "this side is priced at zero".
#[derive(Clone, Debug, PartialEq)]
pub struct SecurityState {
    pub ticker: Ticker,
    pub time: Timestamp,
    pub bid: Option<Micros>,
    pub ask: Option<Micros>,
    pub bid_size: i64,
    pub ask_size: i64,
    pub last_sale_price: Option<Micros>,
    pub last_sale_size: i64,
    pub last_sale_time: Option<Timestamp>,
}

impl SecurityState {
    pub fn new(ticker: impl Into<Ticker>, time: Timestamp) -> Self {
        SecurityState {
            ticker: ticker.into(),
            time,
            bid: None,
            ask: None,
            bid_size: 0,
            ask_size: 0,
            last_sale_price: None,
            last_sale_size: 0,
            last_sale_time: None,
        }
    }

    /// Carry the mark time forward without changing price/size state. Called
    /// on every open position's security once per tick, before portfolio
    /// values are recomputed, so unrealized PnL is always marked at the
    /// current simulation time even on ticks with no activity for that
    /// ticker.
    pub fn refresh_time(&mut self, time: Timestamp) {
        self.time = time;
    }

    pub fn apply_quote(
        &mut self,
        time: Timestamp,
        bid: Option<Micros>,
        ask: Option<Micros>,
        bid_size: i64,
        ask_size: i64,
    ) {
        self.time = time;
        self.bid = bid;
        self.ask = ask;
        self.bid_size = bid_size.max(0);
        self.ask_size = ask_size.max(0);
    }

    pub fn apply_trade(&mut self, time: Timestamp, price: Micros, size: i64) {
        self.time = time;
        self.last_sale_price = Some(price);
        self.last_sale_size = size.max(0);
        self.last_sale_time = Some(time);
    }

    /// Record a fill the simulator itself caused as the security's last
    /// sale, the same way an external trade print would be. Does not touch
    /// `time`/bid/ask — only `apply_quote`/`apply_trade` own those.
    pub fn mark_fill(&mut self, time: Timestamp, price: Micros, shares: i64) {
        self.last_sale_price = Some(price);
        self.last_sale_size = shares.max(0);
        self.last_sale_time = Some(time);
    }

    /// Decrement the resting size on the side a fill just consumed. Clamped
    /// at zero: a fill can exhaust a displayed size exactly, but it should
    /// never drive it negative.
    pub fn reduce_bid_size(&mut self, filled: i64) {
        self.bid_size = (self.bid_size - filled).max(0);
    }

    pub fn reduce_ask_size(&mut self, filled: i64) {
        self.ask_size = (self.ask_size - filled).max(0);
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
    fn fresh_security_has_no_quotes() {
        let s = SecurityState::new("MSFT", t("2024-01-02 09:30:00"));
        assert_eq!(s.bid, None);
        assert_eq!(s.ask, None);
        assert_eq!(s.bid_size, 0);
        assert_eq!(s.ask_size, 0);
    }

    #[test]
    fn reduce_size_clamps_at_zero() {
        let mut s = SecurityState::new("MSFT", t("2024-01-02 09:30:00"));
        s.apply_quote(
            t("2024-01-02 09:30:01"),
            Some(Micros::new(83_800_000)),
            Some(Micros::new(83_820_000)),
            100,
            50,
        );
        s.reduce_ask_size(200);
        assert_eq!(s.ask_size, 0);
    }

    #[test]
    fn mark_fill_updates_last_sale_without_touching_the_quote() {
        let mut s = SecurityState::new("MSFT", t("2024-01-02 09:30:00"));
        s.apply_quote(t("2024-01-02 09:30:01"), Some(Micros::new(83_800_000)), Some(Micros::new(83_810_000)), 100, 50);
        s.mark_fill(t("2024-01-02 09:30:05"), Micros::new(83_810_000), 10);
        assert_eq!(s.last_sale_price, Some(Micros::new(83_810_000)));
        assert_eq!(s.last_sale_size, 10);
        assert_eq!(s.last_sale_time, Some(t("2024-01-02 09:30:05")));
        assert_eq!(s.bid, Some(Micros::new(83_800_000)));
    }

    #[test]
    fn negative_incoming_sizes_are_clamped_to_zero() {
        let mut s = SecurityState::new("MSFT", t("2024-01-02 09:30:00"));
        s.apply_quote(t("2024-01-02 09:30:01"), None, None, -5, -1);
        assert_eq!(s.bid_size, 0);
        assert_eq!(s.ask_size, 0);
    }
}
