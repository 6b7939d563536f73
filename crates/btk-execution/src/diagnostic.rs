//! Non-fatal conditions the execution layer surfaces to its caller.
//!
//! None of these stop the simulation: the offending order is rejected or
//! dropped and the run continues. They exist so the caller (the kernel's
//! driver, ultimately `tracing::warn!` in the CLI) can log what happened
//! without the execution layer depending on a logging crate itself.

use btk_schemas::{Micros, OrderId, Ticker};

#[derive(Clone, Debug, PartialEq)]
pub enum Diagnostic {
    /// An order was rejected before ever reaching the match logic — e.g. a
    /// SELL for more shares than are held and shorting was not implied, or
    /// a short that would breach the margin requirement.
    ValidationError { order_id: OrderId, ticker: Ticker, reason: String },
    /// A BUY would require more cash than is available at fill time.
    InsufficientCashWarning { order_id: OrderId, ticker: Ticker, required: Micros, available: Micros },
    /// A FOK order could not be filled in full and was discarded, or an IOC
    /// order had nothing immediately fillable.
    NotFillableNotice { order_id: OrderId, ticker: Ticker },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::ValidationError { order_id, ticker, reason } => {
                write!(f, "{order_id} ({ticker}) rejected: {reason}")
            }
            Diagnostic::InsufficientCashWarning { order_id, ticker, required, available } => write!(
                f,
                "{order_id} ({ticker}) would require {required} but only {available} is available"
            ),
            Diagnostic::NotFillableNotice { order_id, ticker } => {
                write!(f, "{order_id} ({ticker}) not fillable")
            }
        }
    }
}
