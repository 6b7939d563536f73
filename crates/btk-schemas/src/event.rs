//! The kernel's event model: what flows through the priority queue.

use crate::fixedpoint::Micros;
use crate::ids::{OrderId, Ticker, Timestamp};

/// Whether the market is open or closed at a point in simulated time.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MarketStatus {
    Open,
    Closed,
}

/// Queue-priority class. Lower values are drained first among events that
/// share a timestamp.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventClass {
    MarginCall = 1,
    Order = 2,
    QuoteTradeOrStatus = 3,
}

/// The payload of a single queued event.
#[derive(Clone, Debug, PartialEq)]
pub enum EventKind {
    MarketStatus(MarketStatus),
    Quote {
        ticker: Ticker,
        bid: Option<Micros>,
        ask: Option<Micros>,
        bid_size: i64,
        ask_size: i64,
    },
    Trade {
        ticker: Ticker,
        price: Micros,
        size: i64,
    },
    /// Handle into the execution layer's order table. The kernel looks the
    /// order up by id when it pops this event.
    Order(OrderId),
    MarginCall,
}

/// A queued event: payload plus the simulated time it occurs at.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub time: Timestamp,
    pub kind: EventKind,
}

impl Event {
    pub fn new(time: Timestamp, kind: EventKind) -> Self {
        Event { time, kind }
    }

    pub fn class(&self) -> EventClass {
        match &self.kind {
            EventKind::MarginCall => EventClass::MarginCall,
            EventKind::Order(_) => EventClass::Order,
            EventKind::MarketStatus(_) | EventKind::Quote { .. } | EventKind::Trade { .. } => {
                EventClass::QuoteTradeOrStatus
            }
        }
    }
}
