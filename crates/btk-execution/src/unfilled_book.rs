//! Resting orders, grouped by time-in-force.
//!
//! Only GTC, DAY, and AON orders ever rest here — FOK and IOC are resolved
//! (filled, partially filled, or dropped) the instant they are evaluated
//! and never enter the book.

use btk_schemas::OrderId;

use crate::order::{Order, Tif};

#[derive(Clone, Debug, Default)]
pub struct UnfilledBook {
    gtc: Vec<Order>,
    day: Vec<Order>,
    aon: Vec<Order>,
}

impl UnfilledBook {
    pub fn new() -> Self {
        UnfilledBook::default()
    }

    fn queue_mut(&mut self, tif: Tif) -> &mut Vec<Order> {
        match tif {
            Tif::Gtc => &mut self.gtc,
            Tif::Day => &mut self.day,
            Tif::Aon => &mut self.aon,
            Tif::Fok | Tif::Ioc => unreachable!("FOK/IOC orders never rest in the book"),
        }
    }

    pub fn insert(&mut self, order: Order) {
        self.queue_mut(order.tif).push(order);
    }

    /// All resting orders for `ticker`, in FIFO insertion order, across all
    /// three TIF queues. Used when a QUOTE arrives and resting orders for
    /// that ticker need to be re-evaluated.
    pub fn orders_for_ticker(&self, ticker: &str) -> Vec<OrderId> {
        self.gtc
            .iter()
            .chain(self.day.iter())
            .chain(self.aon.iter())
            .filter(|o| o.ticker == ticker)
            .map(|o| o.order_id)
            .collect()
    }

    pub fn get_mut(&mut self, order_id: OrderId) -> Option<&mut Order> {
        self.gtc
            .iter_mut()
            .chain(self.day.iter_mut())
            .chain(self.aon.iter_mut())
            .find(|o| o.order_id == order_id)
    }

    /// Remove and return an order by id, wherever it rests.
    pub fn take(&mut self, order_id: OrderId) -> Option<Order> {
        for q in [&mut self.gtc, &mut self.day, &mut self.aon] {
            if let Some(pos) = q.iter().position(|o| o.order_id == order_id) {
                return Some(q.remove(pos));
            }
        }
        None
    }

    /// Drain every DAY order out of the book (session close).
    pub fn drain_day_queue(&mut self) -> Vec<Order> {
        std::mem::take(&mut self.day)
    }

    /// Drain every resting order out of the book.
    pub fn drain_all(&mut self) -> Vec<Order> {
        let mut all = std::mem::take(&mut self.gtc);
        all.extend(std::mem::take(&mut self.day));
        all.extend(std::mem::take(&mut self.aon));
        all
    }

    /// Number of TIF queues (0..=3) holding at least one order. This
    /// mirrors the original engine's notion of "unfilled order count": it
    /// counts non-empty queues, not individual orders.
    pub fn nonempty_queue_count(&self) -> usize {
        [&self.gtc, &self.day, &self.aon]
            .into_iter()
            .filter(|q| !q.is_empty())
            .count()
    }
}
