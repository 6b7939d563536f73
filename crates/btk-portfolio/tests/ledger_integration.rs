use btk_portfolio::{Broker, CommissionSchedule, Ledger};
use btk_schemas::{Direction, Micros};
use chrono::NaiveDateTime;

fn t(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

#[test]
fn buy_and_hold_msft_two_shares_tracks_cost_basis_and_cash() {
    let start = t("2024-01-02 09:30:00");
    let mut ledger = Ledger::new(start, Micros::new(100_000 * 1_000_000));
    let schedule = CommissionSchedule::new(false, Broker::InteractiveBrokers);

    let fill_time = t("2024-01-02 09:31:00");
    let price = Micros::new(83_810_000);
    let commission = schedule.commission(price, 2);
    ledger.apply_fill(fill_time, "MSFT", Direction::Buy, price, 2, commission);

    assert_eq!(ledger.shares("MSFT"), 2);
    assert_eq!(ledger.position("MSFT").unwrap().entry_price, price);

    let expected_cash = Micros::new(100_000 * 1_000_000) - price.mul_qty(2);
    assert_eq!(ledger.cash(fill_time), expected_cash);

    ledger.mark_price("MSFT", fill_time, price);
    let snap = ledger.update_portfolio_values(fill_time);
    assert_eq!(snap.portfolio_value, Micros::new(100_000 * 1_000_000));
}

#[test]
fn partial_fills_across_two_quotes_blend_into_one_average_price() {
    let start = t("2024-01-02 09:30:00");
    let mut ledger = Ledger::new(start, Micros::new(1_000_000 * 1_000_000));

    ledger.apply_fill(t("2024-01-02 09:31:00"), "AAPL", Direction::Buy, Micros::new(100_000_000), 60, Micros::ZERO);
    ledger.apply_fill(t("2024-01-02 09:32:00"), "AAPL", Direction::Buy, Micros::new(110_000_000), 40, Micros::ZERO);

    let pos = ledger.position("AAPL").unwrap();
    assert_eq!(pos.shares, 100);
    // (100*60 + 110*40) / 100 = 104
    assert_eq!(pos.entry_price, Micros::new(104_000_000));
}

#[test]
fn shorting_credits_cash_and_flattening_realizes_into_flat_book() {
    let start = t("2024-01-02 09:30:00");
    let mut ledger = Ledger::new(start, Micros::new(100_000 * 1_000_000));

    ledger.apply_fill(t("2024-01-02 09:31:00"), "TSLA", Direction::Sell, Micros::new(200_000_000), 10, Micros::ZERO);
    assert_eq!(ledger.shares("TSLA"), -10);
    assert!(ledger.cash(t("2024-01-02 09:31:00")) > Micros::new(100_000 * 1_000_000));

    ledger.apply_fill(t("2024-01-02 09:32:00"), "TSLA", Direction::Buy, Micros::new(190_000_000), 10, Micros::ZERO);
    assert!(ledger.position("TSLA").is_none());
}
