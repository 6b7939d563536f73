//! Open position with share-weighted average entry price.

use btk_schemas::{Micros, Ticker, Timestamp};

/// An open position in one ticker. `shares` is signed: positive is long,
/// negative is short. `entry_price` is always a non-negative per-share cost
/// basis, whether the position is long or short.
#[derive(Clone, Debug, PartialEq)]
pub struct Position {
    pub ticker: Ticker,
    pub entry_time: Timestamp,
    pub purchase_time: Timestamp,
    pub market_price: Micros,
    pub shares: i64,
    pub entry_price: Micros,
}

impl Position {
    pub fn open(
        ticker: impl Into<Ticker>,
        time: Timestamp,
        fill_price: Micros,
        shares: i64,
    ) -> Self {
        Position {
            ticker: ticker.into(),
            entry_time: time,
            purchase_time: time,
            market_price: fill_price,
            shares,
            entry_price: fill_price.abs(),
        }
    }

    pub fn is_flat(&self) -> bool {
        self.shares == 0
    }

    pub fn market_value(&self) -> Micros {
        self.market_price.mul_qty(self.shares)
    }

    pub fn unrealized_pnl(&self) -> Micros {
        (self.market_price - self.entry_price).mul_qty(self.shares)
    }

    /// Mark the position to `price` at `time` without changing share count.
    pub fn mark(&mut self, time: Timestamp, price: Micros) {
        self.entry_time = time;
        self.market_price = price;
    }

    /// Blend a same-direction fill into this position using the
    /// share-weighted average entry formula:
    /// `(old_price * old_qty + fill_price * fill_qty) / (old_qty + fill_qty)`.
    ///
    /// Only valid for a fill that *adds to* the existing position (same
    /// sign as `self.shares`, or opening from flat); a fill that reduces or
    /// flips a position does not go through this path — see
    /// `Ledger::apply_fill`.
    pub fn add_same_direction_fill(&mut self, time: Timestamp, fill_price: Micros, fill_shares_abs: i64, direction_sign: i64) {
        let old_qty_abs = self.shares.unsigned_abs() as i64;
        let total_qty_abs = old_qty_abs + fill_shares_abs;
        let blended = if total_qty_abs == 0 {
            Micros::ZERO
        } else {
            let old_notional = self.entry_price.mul_qty(old_qty_abs);
            let new_notional = fill_price.abs().mul_qty(fill_shares_abs);
            (old_notional + new_notional).mul_ratio(1, total_qty_abs)
        };
        self.entry_price = blended;
        self.shares += direction_sign * fill_shares_abs;
        self.market_price = fill_price;
        self.entry_time = time;
    }

    /// Reduce the position by `reduce_shares_abs` shares (a fill moving it
    /// toward flat). Entry price is untouched: reducing a position realizes
    /// PnL against the existing average cost, it does not change it.
    pub fn reduce(&mut self, time: Timestamp, fill_price: Micros, reduce_shares_abs: i64, direction_sign: i64) {
        self.shares += direction_sign * reduce_shares_abs;
        self.market_price = fill_price;
        self.entry_time = time;
    }
}
