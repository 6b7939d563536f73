//! The simulation driver: owns the event queue, the ledger, the order
//! processor, and the per-ticker security cache, and drives them through
//! one deterministic pass over a tick sequence.

use std::collections::BTreeMap;

use btk_portfolio::{CommissionSchedule, Ledger, SecurityState};
use btk_schemas::{Event, EventKind, MarketStatus, Ticker, Timestamp};
use chrono::NaiveDateTime;

use btk_execution::{Diagnostic, Order, OrderProcessor};
use btk_strategy::{Strategy, StrategyContext};

use crate::config::SessionConfig;
use crate::errors::{ConfigError, KernelError};
use crate::event_queue::EventQueue;
use crate::loader::TickRow;
use crate::report::BacktestReport;

impl TickRow {
    fn to_event(&self) -> Event {
        match self.clone() {
            TickRow::Quote { time, ticker, bid, ask, bid_size, ask_size } => {
                Event::new(time, EventKind::Quote { ticker, bid, ask, bid_size, ask_size })
            }
            TickRow::Trade { time, ticker, price, size } => Event::new(time, EventKind::Trade { ticker, price, size }),
        }
    }
}

pub struct Driver {
    config: SessionConfig,
    securities: BTreeMap<Ticker, SecurityState>,
    ledger: Ledger,
    processor: OrderProcessor,
    queue: EventQueue,
    order_table: BTreeMap<btk_schemas::OrderId, Order>,
    market_status: Option<MarketStatus>,
    sim_time: Timestamp,
}

impl Driver {
    /// `tickers` is the universe of securities this run tracks — the spec's
    /// `securities = {ticker -> Security}` initialization step. Empty is a
    /// fatal configuration error, independent of whether tick data is later
    /// supplied.
    pub fn new(config: SessionConfig, tickers: Vec<Ticker>) -> Result<Self, ConfigError> {
        if tickers.is_empty() {
            return Err(ConfigError::NoSecurities);
        }
        let placeholder_time = NaiveDateTime::MIN;
        let securities = tickers
            .into_iter()
            .map(|ticker| {
                let state = SecurityState::new(ticker.clone(), placeholder_time);
                (ticker, state)
            })
            .collect();
        let commission = CommissionSchedule::new(config.include_commission, config.broker);
        Ok(Driver {
            config,
            securities,
            ledger: Ledger::new(placeholder_time, btk_schemas::Micros::ZERO),
            processor: OrderProcessor::new(commission),
            queue: EventQueue::new(),
            order_table: BTreeMap::new(),
            market_status: None,
            sim_time: placeholder_time,
        })
    }

    /// Run the full tick sequence to completion. `ticks` must be
    /// time-sorted ascending (the loader guarantees this for CSV input).
    pub fn run(&mut self, ticks: &[TickRow], strategy: &mut dyn Strategy) -> Result<BacktestReport, KernelError> {
        if ticks.is_empty() {
            return Err(ConfigError::NoData.into());
        }

        self.synthesize_session(ticks);

        let open_time = self.queue.pop().expect("session synthesis always emits at least one event");
        self.sim_time = open_time.time;
        self.market_status = Some(MarketStatus::Open);
        self.ledger = Ledger::new(self.sim_time, self.config.initial_cash);
        for security in self.securities.values_mut() {
            security.refresh_time(self.sim_time);
        }

        let mut diagnostics = Vec::new();
        self.dispatch_callbacks(strategy);

        while let Some(event) = self.queue.pop() {
            self.sim_time = event.time;
            self.ledger.carry_cash_forward(self.sim_time);
            self.ledger.refresh_position_times(self.sim_time);
            self.ledger.update_portfolio_values(self.sim_time);

            self.handle_event(event, &mut diagnostics);

            self.ledger.update_portfolio_values(self.sim_time);
            self.check_invariant()?;

            self.dispatch_callbacks(strategy);

            self.ledger.update_portfolio_values(self.sim_time);
            self.check_invariant()?;
        }

        Ok(BacktestReport {
            snapshots: self.ledger.snapshot_history().values().copied().collect(),
            diagnostics,
        })
    }

    fn handle_event(&mut self, event: Event, diagnostics: &mut Vec<Diagnostic>) {
        match event.kind {
            EventKind::MarketStatus(status) => {
                self.market_status = Some(status);
                if status == MarketStatus::Closed {
                    self.processor.flush_day_orders();
                }
            }
            EventKind::Quote { ticker, bid, ask, bid_size, ask_size } => {
                let security = self.security_mut(&ticker);
                security.apply_quote(self.sim_time, bid, ask, bid_size, ask_size);
                self.processor.requery_ticker(&ticker, security, &mut self.ledger, self.sim_time, diagnostics);
            }
            EventKind::Trade { ticker, price, size } => {
                let security = self.security_mut(&ticker);
                security.apply_trade(self.sim_time, price, size);
                if self.ledger.position(&ticker).is_some() {
                    self.ledger.mark_price(&ticker, self.sim_time, price);
                }
            }
            EventKind::Order(order_id) => {
                if let Some(order) = self.order_table.remove(&order_id) {
                    let security = self.security_mut(&order.ticker);
                    self.processor.process_new_order(order, security, &mut self.ledger, self.sim_time, diagnostics);
                }
            }
            EventKind::MarginCall => {}
        }
    }

    fn security_mut(&mut self, ticker: &str) -> &mut SecurityState {
        self.securities
            .entry(ticker.to_string())
            .or_insert_with(|| SecurityState::new(ticker, self.sim_time))
    }

    /// Run the three strategy callbacks in order, then drain the outbox
    /// into `ORDER` events at the current simulated time — per spec.md
    /// §5's ordering guarantee (iv), these will be popped before any
    /// un-popped QUOTE/TRADE sharing that same timestamp.
    fn dispatch_callbacks(&mut self, strategy: &mut dyn Strategy) {
        let mut outbox = Vec::new();
        {
            let mut ctx = StrategyContext::new(
                self.sim_time,
                self.market_status,
                &self.securities,
                &mut self.ledger,
                &mut self.processor,
                &mut outbox,
            );
            strategy.at_tick(&mut ctx);
            strategy.trade_logic(&mut ctx);
            strategy.at_end_of_tick(&mut ctx);
        }
        for order in outbox {
            let order_id = order.order_id;
            self.order_table.insert(order_id, order);
            self.queue.push(Event::new(self.sim_time, EventKind::Order(order_id)));
        }
    }

    fn check_invariant(&self) -> Result<(), KernelError> {
        if let Some(snap) = self.ledger.latest_snapshot() {
            if snap.cash + snap.investment_value != snap.portfolio_value {
                return Err(KernelError::InvariantViolation(format!(
                    "cash ({}) + investment_value ({}) != portfolio_value ({}) at {}",
                    snap.cash, snap.investment_value, snap.portfolio_value, snap.time
                )));
            }
        }
        Ok(())
    }

    /// Synthesize `MARKET_OPEN`/`MARKET_CLOSE` events around the raw
    /// QUOTE/TRADE stream and enqueue everything, ported from the original
    /// engine's session-boundary scan: a close fires when a tick's time
    /// crosses the configured close or its date advances past the previous
    /// tick's; an open fires the next time a tick's time is past the
    /// configured open again.
    fn synthesize_session(&mut self, ticks: &[TickRow]) {
        let first = &ticks[0];
        let first_date = first.time().date();
        let open_time = NaiveDateTime::new(first_date, self.config.market_open_time);
        self.queue.push(Event::new(open_time, EventKind::MarketStatus(MarketStatus::Open)));

        let mut status = MarketStatus::Open;
        let mut previous_time = open_time;

        for row in ticks {
            let row_time = row.time();
            if status == MarketStatus::Open
                && (row_time.time() > self.config.market_close_time || row_time.date() > previous_time.date())
            {
                let close_time = NaiveDateTime::new(previous_time.date(), self.config.market_close_time);
                self.queue.push(Event::new(close_time, EventKind::MarketStatus(MarketStatus::Closed)));
                status = MarketStatus::Closed;
            }
            if status == MarketStatus::Closed && row_time.time() > self.config.market_open_time {
                let reopen_time = NaiveDateTime::new(row_time.date(), self.config.market_open_time);
                self.queue.push(Event::new(reopen_time, EventKind::MarketStatus(MarketStatus::Open)));
                status = MarketStatus::Open;
            }
            self.queue.push(row.to_event());
            previous_time = row_time;
        }
    }
}
