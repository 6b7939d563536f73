//! Priority event queue: pops events ordered by `(class_priority, timestamp,
//! insertion_seq)`. `BinaryHeap` is a max-heap, so entries are ordered so
//! that the "smallest" (class, time, seq) triple compares greatest — the
//! usual reverse-ordering trick for turning a max-heap into a min-heap.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use btk_schemas::{Event, EventClass, Timestamp};

#[derive(Debug)]
struct QueueEntry {
    class: EventClass,
    time: Timestamp,
    seq: u64,
    event: Event,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        (self.class, self.time, self.seq) == (other.class, other.time, other.seq)
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .class
            .cmp(&self.class)
            .then_with(|| other.time.cmp(&self.time))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-heap of [`Event`]s keyed by `(class_priority, timestamp,
/// insertion_seq)`. Insertion order is preserved among events that tie on
/// both class and timestamp, satisfying spec's ordering guarantee (iii).
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<QueueEntry>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        EventQueue::default()
    }

    pub fn push(&mut self, event: Event) {
        let seq = self.next_seq;
        self.next_seq += 1;
        let class = event.class();
        let time = event.time;
        self.heap.push(QueueEntry { class, time, seq, event });
    }

    pub fn pop(&mut self) -> Option<Event> {
        self.heap.pop().map(|entry| entry.event)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use btk_schemas::EventKind;
    use chrono::NaiveDateTime;

    fn t(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn pops_in_timestamp_order_across_distinct_times() {
        let mut q = EventQueue::new();
        q.push(Event::new(t("2024-01-02 09:31:00"), EventKind::MarginCall));
        q.push(Event::new(t("2024-01-02 09:30:00"), EventKind::MarginCall));
        let first = q.pop().unwrap();
        assert_eq!(first.time, t("2024-01-02 09:30:00"));
    }

    #[test]
    fn margin_call_outranks_order_at_the_same_timestamp() {
        let mut q = EventQueue::new();
        let time = t("2024-01-02 09:30:00");
        q.push(Event::new(time, EventKind::Order(btk_schemas::OrderId(1))));
        q.push(Event::new(time, EventKind::MarginCall));
        let first = q.pop().unwrap();
        assert_eq!(first.class(), EventClass::MarginCall);
    }

    #[test]
    fn ties_on_class_and_time_preserve_insertion_order() {
        let mut q = EventQueue::new();
        let time = t("2024-01-02 09:30:00");
        q.push(Event::new(time, EventKind::Order(btk_schemas::OrderId(1))));
        q.push(Event::new(time, EventKind::Order(btk_schemas::OrderId(2))));
        assert_eq!(q.pop().unwrap().kind, EventKind::Order(btk_schemas::OrderId(1)));
        assert_eq!(q.pop().unwrap().kind, EventKind::Order(btk_schemas::OrderId(2)));
    }
}
