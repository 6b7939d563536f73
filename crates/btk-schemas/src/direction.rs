use std::fmt;

/// Buy or sell side of an order or a fill. Shared by the portfolio layer
/// (transaction log entries) and the execution layer (orders), so it lives
/// here rather than being duplicated or forcing a dependency between them.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    /// +1 for Buy, -1 for Sell — the sign a fill of `shares` (always
    /// non-negative) should carry when applied to a signed position.
    pub fn sign(self) -> i64 {
        match self {
            Direction::Buy => 1,
            Direction::Sell => -1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
        }
    }
}
