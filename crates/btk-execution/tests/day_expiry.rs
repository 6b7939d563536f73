use btk_execution::{OrderProcessor, Tif};
use btk_portfolio::{Broker, CommissionSchedule, Ledger, SecurityState};
use btk_schemas::{Direction, Micros};
use chrono::NaiveDateTime;

fn t(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

#[test]
fn day_order_not_filled_during_the_session_is_dropped_at_close() {
    let mut proc = OrderProcessor::new(CommissionSchedule::new(false, Broker::InteractiveBrokers));
    let mut security = SecurityState::new("MSFT", t("2024-01-02 09:30:00"));
    security.apply_quote(
        t("2024-01-02 09:31:00"),
        Some(Micros::new(83_800_000)),
        Some(Micros::new(83_810_000)),
        100,
        100,
    );
    let mut ledger = Ledger::new(t("2024-01-02 09:30:00"), Micros::new(1_000_000_000));

    let order = proc.create_limit_order(
        t("2024-01-02 09:31:00"),
        Direction::Buy,
        "MSFT",
        10,
        Micros::new(10_000_000),
        Tif::Day,
    );
    let mut diags = Vec::new();
    proc.process_new_order(order, &mut security, &mut ledger, t("2024-01-02 09:31:00"), &mut diags);

    assert_eq!(proc.number_of_unfilled_orders(), 1);
    assert_eq!(ledger.shares("MSFT"), 0);

    let dropped = proc.flush_day_orders();
    assert_eq!(dropped, 1);
    assert_eq!(proc.number_of_unfilled_orders(), 0);
}
