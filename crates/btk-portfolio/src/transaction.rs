//! Append-only transaction log and the per-ticker sequence-id pool that
//! groups market transactions into round-trip (open-to-flatten) groups.

use std::collections::BTreeMap;

use btk_schemas::{Direction, Micros, Ticker, Timestamp};

#[derive(Clone, Debug, PartialEq)]
pub enum TransactionRecord {
    Cash {
        time: Timestamp,
        delta: Micros,
    },
    Market {
        time: Timestamp,
        ticker: Ticker,
        direction: Direction,
        price: Micros,
        shares: i64,
        commission: Micros,
        /// Groups fills belonging to the same open-to-flatten round trip.
        sequence_id: u64,
    },
}

impl TransactionRecord {
    pub fn time(&self) -> Timestamp {
        match self {
            TransactionRecord::Cash { time, .. } => *time,
            TransactionRecord::Market { time, .. } => *time,
        }
    }
}

/// Assigns an integer id to a ticker the first time a position is opened in
/// it, returns the same id on every subsequent fill for that ticker, and
/// frees the id back into a reuse pool once the position flattens. This
/// keeps `sequence_id` values small and stable instead of growing without
/// bound over a long-running session.
#[derive(Clone, Debug, Default)]
pub struct SequenceAllocator {
    next_id: u64,
    free_list: Vec<u64>,
    active: BTreeMap<Ticker, u64>,
}

impl SequenceAllocator {
    pub fn new() -> Self {
        SequenceAllocator::default()
    }

    /// The sequence id in use for `ticker`, allocating a fresh (or reused)
    /// one if this is the first fill since the position was last flat.
    pub fn acquire(&mut self, ticker: &str) -> u64 {
        if let Some(&id) = self.active.get(ticker) {
            return id;
        }
        let id = self.free_list.pop().unwrap_or_else(|| {
            let id = self.next_id;
            self.next_id += 1;
            id
        });
        self.active.insert(ticker.to_string(), id);
        id
    }

    /// Release `ticker`'s sequence id back to the pool. Call once a fill
    /// brings that ticker's position to exactly zero shares.
    pub fn release(&mut self, ticker: &str) {
        if let Some(id) = self.active.remove(ticker) {
            self.free_list.push(id);
        }
    }
}
