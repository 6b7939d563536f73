use btk_engine::{Driver, SessionConfig, TickRow};
use btk_execution::Tif;
use btk_schemas::{Direction, Micros};
use btk_strategy::{Strategy, StrategyContext};
use chrono::NaiveDateTime;

fn t(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

struct BuyThreeOnce {
    placed: bool,
}

impl Strategy for BuyThreeOnce {
    fn trade_logic(&mut self, ctx: &mut StrategyContext) {
        if !self.placed {
            let order = ctx.create_market_order(Direction::Buy, "MSFT", 3, Tif::Gtc);
            if ctx.place_order(order).is_ok() {
                self.placed = true;
            }
        }
    }
}

#[test]
fn a_partial_fill_across_two_quotes_blends_to_a_weighted_average_entry() {
    let config = SessionConfig::test_defaults();
    let mut driver = Driver::new(config, vec!["MSFT".to_string()]).unwrap();
    let ticks = vec![
        TickRow::Quote {
            time: t("2024-01-02 09:31:00"),
            ticker: "MSFT".to_string(),
            bid: Some(Micros::from_dollars(83.79)),
            ask: Some(Micros::from_dollars(83.81)),
            bid_size: 100,
            ask_size: 2,
        },
        TickRow::Quote {
            time: t("2024-01-02 09:32:00"),
            ticker: "MSFT".to_string(),
            bid: Some(Micros::from_dollars(83.78)),
            ask: Some(Micros::from_dollars(83.80)),
            bid_size: 100,
            ask_size: 5,
        },
    ];
    let mut strategy = BuyThreeOnce { placed: false };
    let report = driver.run(&ticks, &mut strategy).unwrap();

    let last = report.snapshots.last().unwrap();
    let expected_cash =
        Micros::from_dollars(10_000.0) - Micros::from_dollars(83.81).mul_qty(2) - Micros::from_dollars(83.80).mul_qty(1);
    assert_eq!(last.cash, expected_cash);
    // (83.81*2 + 83.80*1) / 3, rounded to the nearest micro.
    assert_eq!(last.investment_value, Micros::from_dollars(83.80).mul_qty(3));
}
