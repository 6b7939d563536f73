//! Portfolio accounting: security top-of-book state, commission pricing,
//! weighted-average positions, the cash timeline, and the transaction log,
//! wrapped in an append-only [`Ledger`] façade. No IO, no time source, no
//! randomness — fully deterministic given a sequence of applied fills.

pub mod cash;
pub mod commission;
pub mod ledger;
pub mod position;
pub mod security;
pub mod transaction;

pub use cash::CashTimeline;
pub use commission::{Broker, CommissionSchedule, UnknownBrokerError};
pub use ledger::{Ledger, LedgerError, PortfolioSnapshot};
pub use position::Position;
pub use security::SecurityState;
pub use transaction::{SequenceAllocator, TransactionRecord};
