//! Order types.

use btk_schemas::{Direction, Micros, OrderId, Ticker, Timestamp};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OrderKind {
    Market,
    Limit,
}

/// Time-in-force policy governing what happens when an order cannot be
/// fully filled the instant it is evaluated.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Tif {
    /// Good-till-cancelled: rests in the book until filled or cancelled.
    Gtc,
    /// Rests until the current session closes, then is dropped.
    Day,
    /// Fill-or-kill: fills immediately in full, or is rejected outright.
    /// Never rests in the book.
    Fok,
    /// Immediate-or-cancel: fills whatever is immediately available,
    /// cancels the remainder. Never rests in the book.
    Ioc,
    /// All-or-none: rests until it can be filled completely in one shot;
    /// never partially filled.
    Aon,
}

impl Tif {
    /// Whether an order with this TIF can ever be placed in the resting
    /// unfilled-orders book.
    pub fn rests_in_book(self) -> bool {
        matches!(self, Tif::Gtc | Tif::Day | Tif::Aon)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OrderStatus {
    Unfilled,
    Partial,
    Filled,
    Cancelled,
    Rejected,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Order {
    pub order_id: OrderId,
    pub creation_time: Timestamp,
    pub direction: Direction,
    pub ticker: Ticker,
    /// Shares remaining to be filled. Starts at the order's full size and
    /// shrinks as partial fills are applied.
    pub shares: i64,
    pub kind: OrderKind,
    pub limit_price: Option<Micros>,
    pub tif: Tif,
    pub status: OrderStatus,
}

impl Order {
    pub fn is_limit(&self) -> bool {
        self.kind == OrderKind::Limit
    }
}
