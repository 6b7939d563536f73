//! The simulation kernel: priority event queue, session synthesis, the
//! per-tick driver loop, a tick CSV loader, and the output-artifact writer.
//! Pure and deterministic other than the two file-IO entry points
//! (`loader::load_csv_file`, `report::write_csv_file`) — no logging, no
//! wall-clock reads, no randomness.

pub mod config;
pub mod driver;
pub mod errors;
pub mod event_queue;
pub mod loader;
pub mod report;

pub use config::SessionConfig;
pub use driver::Driver;
pub use errors::{ConfigError, KernelError, LoadError};
pub use event_queue::EventQueue;
pub use loader::TickRow;
pub use report::BacktestReport;
