//! The strategy plugin boundary: the `Strategy` trait user code implements,
//! and the `StrategyContext` query/mutation surface the driver hands it
//! once per callback. No event-queue or session-synthesis logic lives
//! here — that's `btk-engine`'s job; this crate only knows how to read and
//! mutate the ledger/processor it is lent.

mod host;
mod types;

pub use host::{Strategy, StrategyContext, StrategyError};
pub use types::{AccountSnapshot, NewOrderRequest, OpenPositions};
