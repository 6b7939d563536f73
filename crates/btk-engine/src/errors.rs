//! Error kinds the driver can produce. `ConfigError` and `LoadError` are
//! fatal and returned before any event is processed; `KernelError` wraps
//! both plus the one error class that can abort a run already in progress
//! (an invariant violation, which indicates a kernel bug, not user error).

use btk_portfolio::UnknownBrokerError;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    UnknownBroker(UnknownBrokerError),
    InvalidTime { field: &'static str, value: String },
    NegativeInitialCash(f64),
    NoSecurities,
    NoData,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::UnknownBroker(e) => write!(f, "{e}"),
            ConfigError::InvalidTime { field, value } => {
                write!(f, "invalid {field}: {value:?} (expected HH:MM:SS)")
            }
            ConfigError::NegativeInitialCash(v) => write!(f, "initial cash must be non-negative, got {v}"),
            ConfigError::NoSecurities => write!(f, "no securities configured"),
            ConfigError::NoData => write!(f, "no tick data supplied"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    EmptyInput,
    MissingHeader(&'static str),
    UnknownRowType { line: usize, value: String },
    ParseNumber { line: usize, column: &'static str, value: String },
    BadRow { line: usize, reason: String },
    Io(String),
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e.to_string())
    }
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::EmptyInput => write!(f, "empty input"),
            LoadError::MissingHeader(h) => write!(f, "missing header: {h}"),
            LoadError::UnknownRowType { line, value } => {
                write!(f, "line {line}: unknown TYPE {value:?} (expected QUOTE or TRADE)")
            }
            LoadError::ParseNumber { line, column, value } => {
                write!(f, "line {line}: failed to parse column {column}: {value:?}")
            }
            LoadError::BadRow { line, reason } => write!(f, "bad row at line {line}: {reason}"),
            LoadError::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl std::error::Error for LoadError {}

/// Errors that can terminate a run: fatal configuration problems the
/// driver catches before popping its first event, or an invariant
/// violation discovered mid-run (a kernel bug, never user error).
#[derive(Debug, Clone, PartialEq)]
pub enum KernelError {
    Configuration(ConfigError),
    InvariantViolation(String),
}

impl std::fmt::Display for KernelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelError::Configuration(e) => write!(f, "{e}"),
            KernelError::InvariantViolation(msg) => write!(f, "invariant violation: {msg}"),
        }
    }
}

impl std::error::Error for KernelError {}

impl From<ConfigError> for KernelError {
    fn from(e: ConfigError) -> Self {
        KernelError::Configuration(e)
    }
}
