//! Value types exposed across the strategy boundary: the read-only account
//! snapshot and the handful of small request types the host turns into
//! ledger/processor calls.

use std::collections::BTreeMap;

use btk_execution::Tif;
use btk_portfolio::Position;
use btk_schemas::{Direction, Micros, MarketStatus, Ticker, Timestamp};

/// A read-only view of the account a strategy can inspect at the current
/// simulated time. Built fresh by the host on every callback; a strategy
/// never holds a long-lived reference into the ledger itself.
#[derive(Clone, Debug, PartialEq)]
pub struct AccountSnapshot {
    pub time: Timestamp,
    pub cash: Micros,
    pub portfolio_value: Micros,
    pub total_investment_value: Micros,
    pub market_status: Option<MarketStatus>,
    pub number_of_unfilled_orders: usize,
}

/// One request to place a new order, as a strategy would describe it
/// without yet knowing its assigned `OrderId`.
#[derive(Clone, Debug, PartialEq)]
pub struct NewOrderRequest {
    pub direction: Direction,
    pub ticker: Ticker,
    pub shares: i64,
    pub limit_price: Option<Micros>,
    pub tif: Tif,
}

impl NewOrderRequest {
    pub fn market(direction: Direction, ticker: impl Into<Ticker>, shares: i64, tif: Tif) -> Self {
        NewOrderRequest { direction, ticker: ticker.into(), shares, limit_price: None, tif }
    }

    pub fn limit(
        direction: Direction,
        ticker: impl Into<Ticker>,
        shares: i64,
        limit_price: Micros,
        tif: Tif,
    ) -> Self {
        NewOrderRequest { direction, ticker: ticker.into(), shares, limit_price: Some(limit_price), tif }
    }
}

/// Re-exported so strategy code doesn't need a direct `btk-portfolio`
/// dependency just to read `get_open_positions()`'s result type.
pub type OpenPositions = BTreeMap<Ticker, Position>;
