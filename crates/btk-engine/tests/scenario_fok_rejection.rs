use btk_engine::{Driver, SessionConfig, TickRow};
use btk_execution::{Diagnostic, Tif};
use btk_schemas::{Direction, Micros};
use btk_strategy::{Strategy, StrategyContext};
use chrono::NaiveDateTime;

fn t(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

struct FokBuyOnce {
    placed: bool,
}

impl Strategy for FokBuyOnce {
    fn trade_logic(&mut self, ctx: &mut StrategyContext) {
        if !self.placed {
            let order = ctx.create_market_order(Direction::Buy, "MSFT", 10, Tif::Fok);
            if ctx.place_order(order).is_ok() {
                self.placed = true;
            }
        }
    }
}

#[test]
fn fok_order_that_cannot_fill_in_full_is_discarded_with_no_cash_change() {
    let config = SessionConfig::test_defaults();
    let mut driver = Driver::new(config, vec!["MSFT".to_string()]).unwrap();
    let ticks = vec![TickRow::Quote {
        time: t("2024-01-02 09:31:00"),
        ticker: "MSFT".to_string(),
        bid: Some(Micros::from_dollars(83.79)),
        ask: Some(Micros::from_dollars(83.81)),
        bid_size: 100,
        ask_size: 2,
    }];
    let mut strategy = FokBuyOnce { placed: false };
    let report = driver.run(&ticks, &mut strategy).unwrap();

    let last = report.snapshots.last().unwrap();
    assert_eq!(last.cash, Micros::from_dollars(10_000.0));
    assert_eq!(last.investment_value, Micros::ZERO);
    assert!(report.diagnostics.iter().any(|d| matches!(d, Diagnostic::NotFillableNotice { .. })));
}
