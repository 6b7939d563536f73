//! Order matching: the MARKET/LIMIT x BUY/SELL decision table, per-TIF
//! partial-fill policy, and fill accounting against the ledger.

use btk_portfolio::{CommissionSchedule, Ledger, SecurityState};
use btk_schemas::{Direction, Micros, OrderId, Timestamp};

use crate::diagnostic::Diagnostic;
use crate::order::{Order, OrderKind, OrderStatus, Tif};
use crate::unfilled_book::UnfilledBook;

/// What a top-of-book lookup says about filling an order right now, before
/// any cash/margin affordability check.
enum PriceDecision {
    /// Not fillable at all: the relevant quote side is missing, or (for a
    /// limit order) its price condition is not satisfied.
    NoFill,
    /// Fillable in full, at `price`.
    Full { price: Micros },
    /// Only `available` of the order's remaining shares can fill, at `price`.
    Partial { price: Micros, available: i64 },
}

fn decide_price(order: &Order, security: &SecurityState) -> PriceDecision {
    let (touch, size) = match order.direction {
        Direction::Buy => (security.ask, security.ask_size),
        Direction::Sell => (security.bid, security.bid_size),
    };
    let Some(touch) = touch else {
        return PriceDecision::NoFill;
    };
    if order.kind == OrderKind::Limit {
        let limit = order.limit_price.expect("limit order always carries a limit price");
        let crosses = match order.direction {
            Direction::Buy => touch <= limit,
            Direction::Sell => touch >= limit,
        };
        if !crosses {
            return PriceDecision::NoFill;
        }
    }
    if size <= 0 {
        return PriceDecision::NoFill;
    }
    if size >= order.shares {
        PriceDecision::Full { price: touch }
    } else {
        PriceDecision::Partial { price: touch, available: size }
    }
}

/// How much of a fill's shares would *grow* a short position (0 if the fill
/// only reduces a short or stays long). Only this portion is margin-checked.
fn short_growth(existing_shares: i64, signed_fill: i64) -> i64 {
    let old_short = (-existing_shares).max(0);
    let new_short = (-(existing_shares + signed_fill)).max(0);
    (new_short - old_short).max(0)
}

/// Minimum cash-to-proceeds ratio required to open or grow a short.
const SHORT_MARGIN_NUMERATOR: i64 = 125;
const SHORT_MARGIN_DENOMINATOR: i64 = 100;

fn affordable(
    order: &Order,
    price: Micros,
    fill_shares: i64,
    commission: Micros,
    ledger: &Ledger,
    time: Timestamp,
) -> Result<(), Diagnostic> {
    let cash = ledger.cash(time);
    match order.direction {
        Direction::Buy => {
            let cost = price.mul_qty(fill_shares) + commission;
            if cost > cash {
                return Err(Diagnostic::InsufficientCashWarning {
                    order_id: order.order_id,
                    ticker: order.ticker.clone(),
                    required: cost,
                    available: cash,
                });
            }
        }
        Direction::Sell => {
            let existing = ledger.shares(&order.ticker);
            let growth = short_growth(existing, -fill_shares);
            if growth > 0 {
                let proceeds = price.mul_qty(growth);
                let required = proceeds.mul_ratio(SHORT_MARGIN_NUMERATOR, SHORT_MARGIN_DENOMINATOR);
                if required > cash {
                    return Err(Diagnostic::ValidationError {
                        order_id: order.order_id,
                        ticker: order.ticker.clone(),
                        reason: format!("short margin requirement {required} exceeds cash {cash}"),
                    });
                }
            }
        }
    }
    Ok(())
}

pub struct OrderProcessor {
    commission: CommissionSchedule,
    next_order_id: u64,
    pub book: UnfilledBook,
}

impl OrderProcessor {
    pub fn new(commission: CommissionSchedule) -> Self {
        OrderProcessor {
            commission,
            next_order_id: 1,
            book: UnfilledBook::new(),
        }
    }

    fn next_id(&mut self) -> OrderId {
        let id = OrderId(self.next_order_id);
        self.next_order_id += 1;
        id
    }

    pub fn create_market_order(
        &mut self,
        time: Timestamp,
        direction: Direction,
        ticker: impl Into<String>,
        shares: i64,
        tif: Tif,
    ) -> Order {
        Order {
            order_id: self.next_id(),
            creation_time: time,
            direction,
            ticker: ticker.into(),
            shares,
            kind: OrderKind::Market,
            limit_price: None,
            tif,
            status: OrderStatus::Unfilled,
        }
    }

    pub fn create_limit_order(
        &mut self,
        time: Timestamp,
        direction: Direction,
        ticker: impl Into<String>,
        shares: i64,
        limit_price: Micros,
        tif: Tif,
    ) -> Order {
        Order {
            order_id: self.next_id(),
            creation_time: time,
            direction,
            ticker: ticker.into(),
            shares,
            kind: OrderKind::Limit,
            limit_price: Some(limit_price),
            tif,
            status: OrderStatus::Unfilled,
        }
    }

    /// Pre-submission check: a SELL that would create or grow a short
    /// position beyond what the margin requirement allows is rejected
    /// before it is ever evaluated against the book.
    pub fn submit(
        &mut self,
        order: Order,
        ledger: &Ledger,
        time: Timestamp,
    ) -> Result<Order, Diagnostic> {
        if order.direction == Direction::Sell {
            let existing = ledger.shares(&order.ticker);
            let growth = short_growth(existing, -order.shares);
            if growth > 0 {
                // No price is known yet for a market order; use the limit
                // price if this is a limit order, otherwise defer the
                // margin check to fill time (handled in `affordable`).
                if let Some(limit) = order.limit_price {
                    let proceeds = limit.mul_qty(growth);
                    let required = proceeds.mul_ratio(SHORT_MARGIN_NUMERATOR, SHORT_MARGIN_DENOMINATOR);
                    let cash = ledger.cash(time);
                    if required > cash {
                        return Err(Diagnostic::ValidationError {
                            order_id: order.order_id,
                            ticker: order.ticker.clone(),
                            reason: format!("short margin requirement {required} exceeds cash {cash}"),
                        });
                    }
                }
            }
        }
        Ok(order)
    }

    /// Evaluate `order` against `security`'s current top-of-book once.
    /// Returns `Some(order)` if the order (or its remainder) should be kept
    /// resting in the unfilled-orders book, `None` if it is fully resolved
    /// (filled, rejected, or cancelled).
    fn evaluate(
        &mut self,
        mut order: Order,
        security: &mut SecurityState,
        ledger: &mut Ledger,
        time: Timestamp,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<Order> {
        let decision = decide_price(&order, security);

        let (candidate_price, candidate_shares, is_full) = match decision {
            PriceDecision::NoFill => return self.route_no_fill(order, diagnostics),
            PriceDecision::Full { price } => (price, order.shares, true),
            PriceDecision::Partial { price, available } => {
                if order.tif == Tif::Aon {
                    // AON cannot accept a partial fill; keep waiting.
                    return Some(order);
                }
                if order.tif == Tif::Fok {
                    // FOK cannot accept a partial fill either; reject outright.
                    return self.route_no_fill(order, diagnostics);
                }
                (price, available, false)
            }
        };

        let commission = self.commission.commission(candidate_price, candidate_shares);
        if let Err(diag) = affordable(&order, candidate_price, candidate_shares, commission, ledger, time) {
            diagnostics.push(diag);
            return self.route_no_fill(order, diagnostics);
        }

        self.apply_fill(&order, candidate_price, candidate_shares, commission, security, ledger, time);

        if is_full {
            order.status = OrderStatus::Filled;
            None
        } else {
            order.shares -= candidate_shares;
            order.status = OrderStatus::Partial;
            match order.tif {
                Tif::Gtc | Tif::Day => Some(order),
                Tif::Ioc => None,
                Tif::Fok | Tif::Aon => unreachable!("FOK/AON never take a partial fill path"),
            }
        }
    }

    /// Apply the TIF policy for an order that could not be filled at all on
    /// this evaluation.
    fn route_no_fill(&mut self, mut order: Order, diagnostics: &mut Vec<Diagnostic>) -> Option<Order> {
        match order.tif {
            Tif::Gtc | Tif::Day | Tif::Aon => Some(order),
            Tif::Fok => {
                diagnostics.push(Diagnostic::NotFillableNotice {
                    order_id: order.order_id,
                    ticker: order.ticker.clone(),
                });
                order.status = OrderStatus::Rejected;
                None
            }
            Tif::Ioc => {
                diagnostics.push(Diagnostic::NotFillableNotice {
                    order_id: order.order_id,
                    ticker: order.ticker.clone(),
                });
                order.status = OrderStatus::Cancelled;
                None
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_fill(
        &mut self,
        order: &Order,
        price: Micros,
        fill_shares: i64,
        commission: Micros,
        security: &mut SecurityState,
        ledger: &mut Ledger,
        time: Timestamp,
    ) {
        ledger.apply_fill(time, &order.ticker, order.direction, price, fill_shares, commission);
        match order.direction {
            Direction::Buy => security.reduce_ask_size(fill_shares),
            Direction::Sell => security.reduce_bid_size(fill_shares),
        }
        // A fill is a trade the simulator caused; treat it as the security's
        // last sale the same as an observed trade print.
        security.mark_fill(time, price, fill_shares);
        ledger.update_portfolio_values(time);
    }

    /// Process a freshly submitted order (it is not yet resting anywhere).
    /// If it cannot be fully resolved now and its TIF allows resting, it is
    /// inserted into the unfilled-orders book.
    pub fn process_new_order(
        &mut self,
        order: Order,
        security: &mut SecurityState,
        ledger: &mut Ledger,
        time: Timestamp,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        if let Some(resting) = self.evaluate(order, security, ledger, time, diagnostics) {
            self.book.insert(resting);
        }
    }

    /// Re-evaluate every order resting against `ticker` after a new quote.
    pub fn requery_ticker(
        &mut self,
        ticker: &str,
        security: &mut SecurityState,
        ledger: &mut Ledger,
        time: Timestamp,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let ids = self.book.orders_for_ticker(ticker);
        for id in ids {
            let Some(order) = self.book.take(id) else { continue };
            if let Some(resting) = self.evaluate(order, security, ledger, time, diagnostics) {
                self.book.insert(resting);
            }
        }
    }

    pub fn cancel_unfilled_order(&mut self, order_id: OrderId) -> bool {
        if let Some(mut order) = self.book.take(order_id) {
            order.status = OrderStatus::Cancelled;
            true
        } else {
            false
        }
    }

    pub fn cancel_all_unfilled_orders(&mut self) -> usize {
        let drained = self.book.drain_all();
        drained.len()
    }

    /// Drop every resting DAY order (called at session close).
    pub fn flush_day_orders(&mut self) -> usize {
        self.book.drain_day_queue().len()
    }

    pub fn number_of_unfilled_orders(&self) -> usize {
        self.book.nonempty_queue_count()
    }
}
