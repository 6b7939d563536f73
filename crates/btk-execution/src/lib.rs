//! Order submission, matching, and the resting unfilled-orders book. Pure
//! and deterministic: no IO, driven entirely by the security state and
//! ledger it is handed.

pub mod diagnostic;
pub mod order;
pub mod processor;
pub mod unfilled_book;

pub use diagnostic::Diagnostic;
pub use order::{Order, OrderKind, OrderStatus, Tif};
pub use processor::OrderProcessor;
pub use unfilled_book::UnfilledBook;
