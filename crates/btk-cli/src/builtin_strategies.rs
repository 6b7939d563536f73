//! Reference strategies shipped with the CLI: a no-op baseline and a
//! minimal scripted buy-and-hold, enough to exercise the kernel end to end
//! without requiring a separate strategy-plugin loader.

use btk_execution::Tif;
use btk_schemas::Direction;
use btk_strategy::{Strategy, StrategyContext};

pub struct NoOpStrategy;

impl Strategy for NoOpStrategy {
    fn trade_logic(&mut self, _ctx: &mut StrategyContext) {}
}

/// Buys `shares` of `ticker` once, at market, GTC, the first time
/// `trade_logic` runs, and never trades again.
pub struct BuyAndHoldOnce {
    ticker: String,
    shares: i64,
    placed: bool,
}

impl BuyAndHoldOnce {
    pub fn new(ticker: impl Into<String>, shares: i64) -> Self {
        BuyAndHoldOnce { ticker: ticker.into(), shares, placed: false }
    }
}

impl Strategy for BuyAndHoldOnce {
    fn trade_logic(&mut self, ctx: &mut StrategyContext) {
        if self.placed {
            return;
        }
        let order = ctx.create_market_order(Direction::Buy, self.ticker.clone(), self.shares, Tif::Gtc);
        if ctx.place_order(order).is_ok() {
            self.placed = true;
        }
    }
}
