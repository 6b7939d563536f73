//! The strategy-facing query/mutation surface.
//!
//! [`StrategyContext`] is constructed fresh by the driver for every
//! callback (`at_tick`, `trade_logic`, `at_end_of_tick`) and borrows
//! directly into the engine's ledger, order processor, and security cache.
//! A strategy never holds state across callbacks through this type — it
//! only ever sees the current instant. Orders placed during a callback are
//! collected into an outbox the driver drains afterward, rather than
//! mutating the event queue directly: that keeps the event-queue machinery
//! (which lives in `btk-engine`) out of this crate entirely, the same way
//! `mqk-strategy`'s host keeps broker/order-routing machinery out of the
//! strategy plugin boundary.

use std::collections::BTreeMap;

use btk_execution::{Diagnostic, Order, OrderKind, OrderProcessor, Tif};
use btk_portfolio::{Ledger, LedgerError, Position, SecurityState};
use btk_schemas::{Direction, Micros, MarketStatus, OrderId, Ticker, Timestamp};

use crate::types::{AccountSnapshot, NewOrderRequest};

/// Non-fatal problems a strategy-facing mutation can report. None of these
/// abort the run — the caller decides whether to log and move on.
#[derive(Clone, Debug, PartialEq)]
pub enum StrategyError {
    NegativeCashAmount(Micros),
    InsufficientCash(LedgerError),
    OrderRejected(Diagnostic),
}

impl std::fmt::Display for StrategyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyError::NegativeCashAmount(amount) => {
                write!(f, "add_cash amount must be non-negative, got {amount}")
            }
            StrategyError::InsufficientCash(e) => write!(f, "{e}"),
            StrategyError::OrderRejected(d) => write!(f, "{d}"),
        }
    }
}

impl std::error::Error for StrategyError {}

/// Borrowed view into engine state for the duration of one callback.
pub struct StrategyContext<'a> {
    time: Timestamp,
    market_status: Option<MarketStatus>,
    securities: &'a BTreeMap<Ticker, SecurityState>,
    ledger: &'a mut Ledger,
    processor: &'a mut OrderProcessor,
    /// Orders created and placed this callback; drained by the driver into
    /// the event queue once the callback returns.
    outbox: &'a mut Vec<Order>,
}

impl<'a> StrategyContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        time: Timestamp,
        market_status: Option<MarketStatus>,
        securities: &'a BTreeMap<Ticker, SecurityState>,
        ledger: &'a mut Ledger,
        processor: &'a mut OrderProcessor,
        outbox: &'a mut Vec<Order>,
    ) -> Self {
        StrategyContext { time, market_status, securities, ledger, processor, outbox }
    }

    // ---- Queries ----

    pub fn get_time(&self) -> Timestamp {
        self.time
    }

    pub fn get_cash(&self) -> Micros {
        self.ledger.cash(self.time)
    }

    /// Recomputes the snapshot at the current time so a cash mutation
    /// earlier in the same callback is reflected immediately.
    pub fn get_portfolio_value(&mut self) -> Micros {
        self.ledger.update_portfolio_values(self.time).portfolio_value
    }

    pub fn get_total_investment_value(&mut self) -> Micros {
        self.ledger.update_portfolio_values(self.time).investment_value
    }

    pub fn get_shares(&self, ticker: &str) -> i64 {
        self.ledger.shares(ticker)
    }

    /// Open positions, optionally filtered to a subset of tickers. Passing
    /// `None` returns every open position.
    pub fn get_open_positions(&self, tickers: Option<&[Ticker]>) -> BTreeMap<Ticker, Position> {
        self.ledger
            .open_positions()
            .filter(|p| match tickers {
                Some(ts) => ts.iter().any(|t| t == &p.ticker),
                None => true,
            })
            .map(|p| (p.ticker.clone(), p.clone()))
            .collect()
    }

    pub fn get_holdings(&self) -> BTreeMap<Ticker, f64> {
        self.ledger.holdings()
    }

    pub fn get_market_status(&self) -> Option<MarketStatus> {
        self.market_status
    }

    pub fn get_transaction_log(&self) -> &[btk_portfolio::TransactionRecord] {
        self.ledger.transactions()
    }

    pub fn get_number_of_unfilled_orders(&self) -> usize {
        self.processor.number_of_unfilled_orders()
    }

    pub fn security(&self, ticker: &str) -> Option<&SecurityState> {
        self.securities.get(ticker)
    }

    pub fn account_snapshot(&mut self) -> AccountSnapshot {
        let snap = self.ledger.update_portfolio_values(self.time);
        AccountSnapshot {
            time: self.time,
            cash: snap.cash,
            portfolio_value: snap.portfolio_value,
            total_investment_value: snap.investment_value,
            market_status: self.market_status,
            number_of_unfilled_orders: self.processor.number_of_unfilled_orders(),
        }
    }

    // ---- Mutations ----

    pub fn add_cash(&mut self, amount: Micros) -> Result<(), StrategyError> {
        if amount.is_negative() {
            return Err(StrategyError::NegativeCashAmount(amount));
        }
        self.ledger.add_cash(self.time, amount);
        Ok(())
    }

    pub fn remove_cash(&mut self, amount: Micros) -> Result<(), StrategyError> {
        self.ledger
            .remove_cash(self.time, amount.abs())
            .map_err(StrategyError::InsufficientCash)
    }

    pub fn create_market_order(
        &mut self,
        direction: Direction,
        ticker: impl Into<Ticker>,
        shares: i64,
        tif: Tif,
    ) -> Order {
        self.processor.create_market_order(self.time, direction, ticker, shares, tif)
    }

    pub fn create_limit_order(
        &mut self,
        direction: Direction,
        ticker: impl Into<Ticker>,
        shares: i64,
        limit_price: Micros,
        tif: Tif,
    ) -> Order {
        self.processor.create_limit_order(self.time, direction, ticker, shares, limit_price, tif)
    }

    /// Build and place an order in one step from a [`NewOrderRequest`].
    pub fn submit(&mut self, request: NewOrderRequest) -> Result<OrderId, StrategyError> {
        let order = match request.limit_price {
            Some(price) => self.create_limit_order(request.direction, request.ticker, request.shares, price, request.tif),
            None => self.create_market_order(request.direction, request.ticker, request.shares, request.tif),
        };
        self.place_order(order)
    }

    /// Submit-time pre-checks (sell-more-than-held, short margin), then
    /// queue the order for the driver to turn into an `ORDER` event at the
    /// current simulated time. Orders submitted inside a callback therefore
    /// execute before any later-timestamped QUOTE/TRADE of the same tick,
    /// per the event-queue's class-priority ordering.
    pub fn place_order(&mut self, order: Order) -> Result<OrderId, StrategyError> {
        if order.direction == Direction::Sell && order.kind == OrderKind::Market {
            let held = self.ledger.shares(&order.ticker);
            if order.shares > held && held >= 0 {
                // Selling more than a flat/long position holds (and not
                // opening/growing a short) is rejected at submission, per
                // spec.md §4.5's pre-check — it never reaches the processor.
                let diag = Diagnostic::ValidationError {
                    order_id: order.order_id,
                    ticker: order.ticker.clone(),
                    reason: format!("sell of {} shares exceeds held {}", order.shares, held),
                };
                return Err(StrategyError::OrderRejected(diag));
            }
        }
        let order_id = order.order_id;
        let order = self
            .processor
            .submit(order, self.ledger, self.time)
            .map_err(StrategyError::OrderRejected)?;
        self.outbox.push(order);
        Ok(order_id)
    }

    pub fn cancel_unfilled_order(&mut self, order_id: OrderId) -> bool {
        self.processor.cancel_unfilled_order(order_id)
    }

    pub fn cancel_all_unfilled_orders(&mut self) -> usize {
        self.processor.cancel_all_unfilled_orders()
    }
}

/// User strategy logic. Only `trade_logic` is required; the other two hooks
/// default to no-ops, mirroring the optional `at_tick`/`at_end_of_tick`
/// callbacks in the original engine.
///
/// `Send + Sync` so a strategy can be boxed and handed to a driver that
/// might run on a worker thread in a batch-backtest harness, even though
/// any single run stays single-threaded (spec.md §5).
pub trait Strategy: Send + Sync {
    fn trade_logic(&mut self, ctx: &mut StrategyContext);

    fn at_tick(&mut self, _ctx: &mut StrategyContext) {}

    fn at_end_of_tick(&mut self, _ctx: &mut StrategyContext) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use btk_portfolio::{Broker, CommissionSchedule};
    use chrono::NaiveDateTime;

    fn t(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn add_cash_rejects_negative_amounts() {
        let mut ledger = Ledger::new(t("2024-01-02 09:30:00"), Micros::new(1_000_000_000));
        let mut processor = OrderProcessor::new(CommissionSchedule::new(false, Broker::InteractiveBrokers));
        let securities = BTreeMap::new();
        let mut outbox = Vec::new();
        let mut ctx = StrategyContext::new(t("2024-01-02 09:31:00"), None, &securities, &mut ledger, &mut processor, &mut outbox);

        let err = ctx.add_cash(Micros::new(-1)).unwrap_err();
        assert!(matches!(err, StrategyError::NegativeCashAmount(_)));
    }

    #[test]
    fn selling_more_than_held_is_rejected_before_the_processor() {
        let mut ledger = Ledger::new(t("2024-01-02 09:30:00"), Micros::new(1_000_000_000));
        let mut processor = OrderProcessor::new(CommissionSchedule::new(false, Broker::InteractiveBrokers));
        let securities = BTreeMap::new();
        let mut outbox = Vec::new();
        let mut ctx = StrategyContext::new(t("2024-01-02 09:31:00"), None, &securities, &mut ledger, &mut processor, &mut outbox);

        let order = ctx.create_market_order(Direction::Sell, "MSFT", 10, Tif::Gtc);
        let err = ctx.place_order(order).unwrap_err();
        assert!(matches!(err, StrategyError::OrderRejected(Diagnostic::ValidationError { .. })));
        assert!(outbox.is_empty());
    }

    #[test]
    fn valid_order_lands_in_the_outbox() {
        let mut ledger = Ledger::new(t("2024-01-02 09:30:00"), Micros::new(1_000_000_000));
        let mut processor = OrderProcessor::new(CommissionSchedule::new(false, Broker::InteractiveBrokers));
        let securities = BTreeMap::new();
        let mut outbox = Vec::new();
        let mut ctx = StrategyContext::new(t("2024-01-02 09:31:00"), None, &securities, &mut ledger, &mut processor, &mut outbox);

        let order = ctx.create_market_order(Direction::Buy, "MSFT", 10, Tif::Gtc);
        ctx.place_order(order).unwrap();
        assert_eq!(outbox.len(), 1);
    }
}
