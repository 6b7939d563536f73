//! Tick CSV loader (deterministic).
//!
//! Required columns: `DATE_TIME`, `SEC`, `TYPE`.
//! `TYPE` is `QUOTE` or `TRADE`; the remaining columns are read only for the
//! matching row type and may otherwise be left empty:
//!
//! - `QUOTE` rows: `BID`, `ASK` (decimal, optional), `BID_SIZE`, `ASK_SIZE`
//!   (integer, empty treated as `0`).
//! - `TRADE` rows: `PRICE` (decimal, required), `SIZE` (integer, required).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use btk_schemas::{Micros, Ticker, Timestamp};

use crate::errors::LoadError;

#[derive(Clone, Debug, PartialEq)]
pub enum TickRow {
    Quote {
        time: Timestamp,
        ticker: Ticker,
        bid: Option<Micros>,
        ask: Option<Micros>,
        bid_size: i64,
        ask_size: i64,
    },
    Trade {
        time: Timestamp,
        ticker: Ticker,
        price: Micros,
        size: i64,
    },
}

impl TickRow {
    pub fn time(&self) -> Timestamp {
        match self {
            TickRow::Quote { time, .. } => *time,
            TickRow::Trade { time, .. } => *time,
        }
    }

    pub fn ticker(&self) -> &str {
        match self {
            TickRow::Quote { ticker, .. } => ticker,
            TickRow::Trade { ticker, .. } => ticker,
        }
    }
}

/// Load ticks from a CSV file on disk.
pub fn load_csv_file(path: impl AsRef<Path>) -> Result<Vec<TickRow>, LoadError> {
    let s = fs::read_to_string(path)?;
    parse_csv_ticks(&s)
}

/// Parse ticks from CSV content (pure, deterministic). Rows are returned
/// sorted ascending by timestamp — the caller is required to supply
/// time-sorted input, but a stable sort here is cheap insurance and keeps
/// the loader deterministic even given an out-of-order file.
pub fn parse_csv_ticks(csv: &str) -> Result<Vec<TickRow>, LoadError> {
    let mut lines = csv.lines();

    let header_line = lines.next().ok_or(LoadError::EmptyInput)?;
    let header_line = header_line.trim().trim_start_matches('\u{feff}');
    if header_line.is_empty() {
        return Err(LoadError::EmptyInput);
    }

    let headers: Vec<String> = split_csv_line(header_line);
    let mut idx: BTreeMap<String, usize> = BTreeMap::new();
    for (i, h) in headers.iter().enumerate() {
        idx.insert(h.trim().to_string(), i);
    }

    let col_time = find_required(&idx, "DATE_TIME")?;
    let col_sec = find_required(&idx, "SEC")?;
    let col_type = find_required(&idx, "TYPE")?;
    let col_bid = idx.get("BID").copied();
    let col_ask = idx.get("ASK").copied();
    let col_bid_size = idx.get("BID_SIZE").copied();
    let col_ask_size = idx.get("ASK_SIZE").copied();
    let col_price = idx.get("PRICE").copied();
    let col_size = idx.get("SIZE").copied();

    let mut out: Vec<TickRow> = Vec::new();

    for (line_idx0, raw) in lines.enumerate() {
        let line_no = line_idx0 + 2;
        let raw = raw.trim();
        if raw.is_empty() || raw.starts_with('#') {
            continue;
        }

        let fields = split_csv_line(raw);
        let get = |col: usize| -> Result<&str, LoadError> {
            fields.get(col).map(|s| s.as_str()).ok_or_else(|| LoadError::BadRow {
                line: line_no,
                reason: format!("missing column index {col}"),
            })
        };
        let get_opt = |col: Option<usize>| -> Option<&str> {
            col.and_then(|c| fields.get(c)).map(|s| s.trim()).filter(|s| !s.is_empty())
        };

        let time = parse_timestamp(get(col_time)?, line_no)?;
        let ticker = get(col_sec)?.trim().to_string();
        if ticker.is_empty() {
            return Err(LoadError::BadRow { line: line_no, reason: "SEC is empty".to_string() });
        }

        let row = match get(col_type)?.trim().to_ascii_uppercase().as_str() {
            "QUOTE" => TickRow::Quote {
                time,
                ticker,
                bid: get_opt(col_bid).map(|v| parse_money(v, line_no, "BID")).transpose()?,
                ask: get_opt(col_ask).map(|v| parse_money(v, line_no, "ASK")).transpose()?,
                bid_size: get_opt(col_bid_size).map(|v| parse_int(v, line_no, "BID_SIZE")).transpose()?.unwrap_or(0),
                ask_size: get_opt(col_ask_size).map(|v| parse_int(v, line_no, "ASK_SIZE")).transpose()?.unwrap_or(0),
            },
            "TRADE" => {
                let price_str = get_opt(col_price).ok_or_else(|| LoadError::BadRow {
                    line: line_no,
                    reason: "TRADE row missing PRICE".to_string(),
                })?;
                let size_str = get_opt(col_size).ok_or_else(|| LoadError::BadRow {
                    line: line_no,
                    reason: "TRADE row missing SIZE".to_string(),
                })?;
                TickRow::Trade {
                    time,
                    ticker,
                    price: parse_money(price_str, line_no, "PRICE")?,
                    size: parse_int(size_str, line_no, "SIZE")?,
                }
            }
            other => {
                return Err(LoadError::UnknownRowType { line: line_no, value: other.to_string() });
            }
        };
        out.push(row);
    }

    out.sort_by_key(|r| r.time());
    Ok(out)
}

fn find_required(idx: &BTreeMap<String, usize>, name: &'static str) -> Result<usize, LoadError> {
    idx.get(name).copied().ok_or(LoadError::MissingHeader(name))
}

fn parse_timestamp(s: &str, line: usize) -> Result<Timestamp, LoadError> {
    let t = s.trim();
    Timestamp::parse_from_str(t, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| Timestamp::parse_from_str(t, "%Y-%m-%d %H:%M:%S"))
        .map_err(|_| LoadError::ParseNumber { line, column: "DATE_TIME", value: t.to_string() })
}

fn parse_money(s: &str, line: usize, column: &'static str) -> Result<Micros, LoadError> {
    s.trim()
        .parse::<f64>()
        .map(Micros::from_dollars)
        .map_err(|_| LoadError::ParseNumber { line, column, value: s.to_string() })
}

fn parse_int(s: &str, line: usize, column: &'static str) -> Result<i64, LoadError> {
    s.trim()
        .parse::<i64>()
        .map_err(|_| LoadError::ParseNumber { line, column, value: s.to_string() })
}

/// Minimal CSV splitting (no quoting support) — the tick schema has no
/// fields that need it.
fn split_csv_line(line: &str) -> Vec<String> {
    line.split(',').map(|s| s.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quote_and_trade_rows() {
        let csv = "DATE_TIME,SEC,TYPE,BID,ASK,BID_SIZE,ASK_SIZE,PRICE,SIZE\n\
                    2024-01-02 09:31:00,MSFT,QUOTE,83.79,83.81,100,2,,\n\
                    2024-01-02 09:32:00,MSFT,TRADE,,,,,85.80,50\n";
        let rows = parse_csv_ticks(csv).unwrap();
        assert_eq!(rows.len(), 2);
        match &rows[0] {
            TickRow::Quote { bid, ask, ask_size, .. } => {
                assert_eq!(*bid, Some(Micros::from_dollars(83.79)));
                assert_eq!(*ask, Some(Micros::from_dollars(83.81)));
                assert_eq!(*ask_size, 2);
            }
            _ => panic!("expected quote"),
        }
        match &rows[1] {
            TickRow::Trade { price, size, .. } => {
                assert_eq!(*price, Micros::from_dollars(85.80));
                assert_eq!(*size, 50);
            }
            _ => panic!("expected trade"),
        }
    }

    #[test]
    fn unknown_type_is_an_error() {
        let csv = "DATE_TIME,SEC,TYPE\n2024-01-02 09:31:00,MSFT,CANCEL\n";
        let err = parse_csv_ticks(csv).unwrap_err();
        assert!(matches!(err, LoadError::UnknownRowType { .. }));
    }

    #[test]
    fn rows_are_sorted_ascending_by_time() {
        let csv = "DATE_TIME,SEC,TYPE,PRICE,SIZE\n\
                    2024-01-02 09:32:00,MSFT,TRADE,85.80,10\n\
                    2024-01-02 09:31:00,MSFT,TRADE,83.81,10\n";
        let rows = parse_csv_ticks(csv).unwrap();
        assert!(rows[0].time() < rows[1].time());
    }
}
