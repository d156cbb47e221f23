use chrono::{DateTime, TimeZone, Utc};
use configuration::Config;
use core_types::{Holding, Quote, SortDirection, SortKey};
use engine::Engine;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

fn holding(symbol: &str, quantity: Decimal, avg_buy_price: Decimal, sector: &str) -> Holding {
    Holding {
        symbol: symbol.to_string(),
        quantity,
        avg_buy_price,
        sector: sector.to_string(),
        stock_name: None,
    }
}

fn quote(symbol: &str, price: Decimal, observed_at: DateTime<Utc>) -> Quote {
    Quote {
        symbol: symbol.to_string(),
        price,
        observed_at,
    }
}

fn demo_holdings() -> Vec<Holding> {
    vec![
        holding("TCS", dec!(10), dec!(3000), "IT"),
        holding("HDFC", dec!(5), dec!(1500), "Financials"),
    ]
}

fn engine_with_quotes() -> Engine {
    let mut engine = Engine::new(Config::default()).unwrap();
    engine.merge_quotes(vec![
        quote("TCS", dec!(3200), ts(0)),
        quote("HDFC", dec!(1400), ts(0)),
    ]);
    engine
}

#[test]
fn dashboard_scenario_matches_hand_computed_figures() {
    let engine = engine_with_quotes();
    let output = engine.compute(&demo_holdings(), dec!(1000), None, ts(0));
    let snapshot = &output.snapshot;

    assert_eq!(snapshot.total_value, dec!(40000));
    assert_eq!(snapshot.cash, dec!(1000));

    let tcs = snapshot.positions.iter().find(|p| p.symbol == "TCS").unwrap();
    assert_eq!(tcs.value, dec!(32000));
    assert_eq!(tcs.gain, dec!(2000));
    assert_eq!(tcs.gain_percent.round_dp(2), dec!(6.67));
    assert_eq!(tcs.weight, dec!(80));

    let hdfc = snapshot.positions.iter().find(|p| p.symbol == "HDFC").unwrap();
    assert_eq!(hdfc.value, dec!(7000));
    assert_eq!(hdfc.gain, dec!(-500));
    assert_eq!(hdfc.gain_percent.round_dp(2), dec!(-6.67));
    assert_eq!(hdfc.weight, dec!(17.5));

    // IT holds 80% of the portfolio: overweight, and dominant past 50%.
    let it = snapshot.sector_buckets.iter().find(|b| b.sector == "IT").unwrap();
    assert!(it.overweight);
    assert_eq!(snapshot.overweight_sectors, vec!["IT"]);
    assert_eq!(snapshot.diversification_score, 8);

    // First observation: no delta baseline.
    assert_eq!(output.delta.absolute, Decimal::ZERO);
    assert_eq!(output.delta.percent, Decimal::ZERO);
}

#[test]
fn ranked_views_come_out_in_their_default_directions() {
    let engine = engine_with_quotes();
    let output = engine.compute(&demo_holdings(), dec!(1000), None, ts(0));

    let symbols = |positions: &[core_types::PositionMetrics]| -> Vec<String> {
        positions.iter().map(|p| p.symbol.clone()).collect()
    };

    assert_eq!(symbols(&output.rankings.alphabetic), vec!["HDFC", "TCS"]);
    assert_eq!(symbols(&output.rankings.by_gain_percent), vec!["TCS", "HDFC"]);
    assert_eq!(symbols(&output.rankings.by_weight), vec!["TCS", "HDFC"]);

    // A caller-selected view over the same snapshot.
    let ascending = engine.rank(&output.snapshot, SortKey::Weight, SortDirection::Asc);
    assert_eq!(symbols(&ascending), vec!["HDFC", "TCS"]);
}

#[test]
fn pipeline_is_idempotent_over_identical_inputs() {
    let mut engine = engine_with_quotes();
    let holdings = demo_holdings();

    let first = engine.compute(&holdings, dec!(1000), None, ts(0));
    let second = engine.compute(&holdings, dec!(1000), None, ts(0));
    assert_eq!(first, second);

    // Re-merging the same batch does not change the cache state either.
    let stats = engine.merge_quotes(vec![
        quote("TCS", dec!(3200), ts(0)),
        quote("HDFC", dec!(1400), ts(0)),
    ]);
    assert_eq!(stats.applied(), 0);
    let third = engine.compute(&holdings, dec!(1000), None, ts(0));
    assert_eq!(first, third);
}

#[test]
fn stale_quote_is_flagged_but_still_valued() {
    let engine = engine_with_quotes();
    // Ten minutes after observation against the default one-minute window.
    let output = engine.compute(&demo_holdings(), dec!(1000), None, ts(600));

    let tcs = output.snapshot.positions.iter().find(|p| p.symbol == "TCS").unwrap();
    assert!(tcs.is_stale());
    assert_eq!(tcs.value, dec!(32000));
    // The stale position still counts toward the totals.
    assert_eq!(output.snapshot.total_value, dec!(40000));
}

#[test]
fn never_quoted_symbol_falls_back_to_cost_basis() {
    let mut engine = Engine::new(Config::default()).unwrap();
    engine.merge_quotes(vec![quote("TCS", dec!(3200), ts(0))]);

    let output = engine.compute(&demo_holdings(), dec!(0), None, ts(0));

    let hdfc = output.snapshot.positions.iter().find(|p| p.symbol == "HDFC").unwrap();
    assert!(hdfc.is_unpriced());
    assert_eq!(hdfc.value, dec!(7500));
    assert_eq!(hdfc.gain, Decimal::ZERO);
}

#[test]
fn invalid_holding_is_surfaced_without_blanking_the_dashboard() {
    let engine = engine_with_quotes();
    let mut holdings = demo_holdings();
    holdings.push(holding("BROKEN", dec!(-5), dec!(100), "IT"));

    let output = engine.compute(&holdings, dec!(1000), None, ts(0));

    assert_eq!(output.snapshot.invalid.len(), 1);
    assert_eq!(output.snapshot.invalid[0].symbol, "BROKEN");
    // The two good positions still aggregate normally.
    assert_eq!(output.snapshot.positions.len(), 2);
    assert_eq!(output.snapshot.total_value, dec!(40000));
}

#[test]
fn out_of_order_quote_never_regresses_the_price() {
    let mut engine = engine_with_quotes();
    // A late-arriving quote with an older observation timestamp.
    let stats = engine.merge_quotes(vec![quote("TCS", dec!(9), ts(-30))]);
    assert_eq!(stats.discarded, 1);

    let output = engine.compute(&demo_holdings(), dec!(1000), None, ts(0));
    let tcs = output.snapshot.positions.iter().find(|p| p.symbol == "TCS").unwrap();
    assert_eq!(tcs.price, dec!(3200));
}

#[test]
fn closed_position_is_skipped_entirely() {
    let engine = engine_with_quotes();
    let mut holdings = demo_holdings();
    holdings.push(holding("SOLD", dec!(0), dec!(250), "Energy"));

    let output = engine.compute(&holdings, dec!(1000), None, ts(0));

    assert!(output.snapshot.positions.iter().all(|p| p.symbol != "SOLD"));
    assert!(output.snapshot.sector_buckets.iter().all(|b| b.sector != "Energy"));
}

#[test]
fn delta_tracks_the_prior_snapshot() {
    let mut engine = engine_with_quotes();
    let holdings = demo_holdings();
    let first = engine.compute(&holdings, dec!(1000), None, ts(0));

    // TCS ticks up 100: ten shares add 1000 to the total.
    engine.merge_quotes(vec![quote("TCS", dec!(3300), ts(10))]);
    let second = engine.compute(&holdings, dec!(1000), Some(&first.snapshot), ts(10));

    assert_eq!(second.snapshot.total_value, dec!(41000));
    assert_eq!(second.delta.absolute, dec!(1000));
    assert_eq!(second.delta.percent, dec!(2.5));
}
