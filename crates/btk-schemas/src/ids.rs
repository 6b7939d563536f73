//! Core identifier and time types shared across the kernel.

use std::fmt;

/// A ticker symbol. Kept as an owned `String` rather than an interned/index
/// type: the tick volumes this kernel targets do not justify the extra
/// bookkeeping an interner would add.
pub type Ticker = String;

/// Simulation time. Tick timestamps, order creation times, transaction
/// times and session-boundary events all share this type so ordering
/// comparisons never cross a unit mismatch.
pub type Timestamp = chrono::NaiveDateTime;

/// Opaque handle to a submitted order.
///
/// `Event::Order` carries only this id, not the order itself: the order
/// record (direction, shares, limit price, time-in-force) lives in the
/// execution layer's order table, keyed by this id. That keeps the event
/// queue a plain value type with no dependency on order/TIF semantics.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "order#{}", self.0)
    }
}
