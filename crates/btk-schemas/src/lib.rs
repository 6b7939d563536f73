//! Shared value types for the backtesting kernel: fixed-point money,
//! identifiers, and the event model that flows through the simulation's
//! priority queue. No logic lives here beyond simple derived helpers —
//! every type in this crate is a plain value with no IO and no mutable
//! state of its own.

pub mod direction;
pub mod event;
pub mod fixedpoint;
pub mod ids;

pub use direction::Direction;
pub use event::{Event, EventClass, EventKind, MarketStatus};
pub use fixedpoint::Micros;
pub use ids::{OrderId, Ticker, Timestamp};
