use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::assets::{Asset, AssetCategory, Transaction, TransactionType};
use crate::portfolio::performance::{
    available_timeframes, generate, timeframe_performance, Timeframe,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 15, 0, 0).unwrap()
}

fn portfolio(first_buy: NaiveDate) -> Vec<Asset> {
    let mut a = Asset::new("Apple", "AAPL", AssetCategory::Stocks, dec!(120));
    a.transactions.push(Transaction::new(
        a.id.clone(),
        TransactionType::Buy,
        dec!(10),
        dec!(100),
        first_buy,
    ));
    let mut b = Asset::new("Bitcoin", "BTC", AssetCategory::Cryptocurrency, dec!(40000));
    b.transactions.push(Transaction::new(
        b.id.clone(),
        TransactionType::Buy,
        dec!(0.5),
        dec!(30000),
        first_buy,
    ));
    vec![a, b]
}

#[test]
fn test_empty_portfolio_yields_empty_series() {
    assert!(generate(&[], Timeframe::M1, now()).is_empty());
}

#[test]
fn test_worthless_portfolio_yields_empty_series() {
    let mut a = Asset::new("Zombie", "ZMB", AssetCategory::Stocks, dec!(0));
    a.transactions.push(Transaction::new(
        a.id.clone(),
        TransactionType::Buy,
        dec!(10),
        dec!(1),
        date(2023, 1, 1),
    ));
    assert!(generate(&[a], Timeframe::M1, now()).is_empty());
}

#[test]
fn test_series_dates_non_decreasing() {
    for timeframe in Timeframe::ALL_TIMEFRAMES {
        let series = generate(&portfolio(date(2022, 6, 1)), timeframe, now());
        assert!(!series.is_empty(), "{timeframe} series empty");
        for pair in series.windows(2) {
            assert!(pair[0].date <= pair[1].date, "{timeframe} went backwards");
        }
    }
}

#[test]
fn test_series_terminates_at_now() {
    for timeframe in Timeframe::ALL_TIMEFRAMES {
        let series = generate(&portfolio(date(2022, 6, 1)), timeframe, now());
        assert_eq!(
            series.last().unwrap().date,
            date(2024, 3, 1),
            "{timeframe} did not end at now"
        );
    }
}

#[test]
fn test_series_decimated_to_display_budget() {
    let series = generate(&portfolio(date(2020, 1, 1)), Timeframe::All, now());
    // Stepping targets ~50 points; integer step sizes can run a little
    // over, plus the appended terminal point.
    assert!(series.len() <= 61, "got {} points", series.len());
    assert!(series.len() >= 40);
}

#[test]
fn test_one_day_series_is_hourly_within_one_date() {
    let series = generate(&portfolio(date(2023, 1, 1)), Timeframe::D1, now());
    // 24 hourly steps fit in at most two calendar dates.
    assert!(series.len() >= 20);
    let first = series.first().unwrap().date;
    let last = series.last().unwrap().date;
    assert!((last - first).num_days() <= 1);
}

#[test]
fn test_series_deterministic() {
    let assets = portfolio(date(2022, 6, 1));
    let a = generate(&assets, Timeframe::M3, now());
    let b = generate(&assets, Timeframe::M3, now());
    assert_eq!(a, b);
}

#[test]
fn test_available_timeframes_for_old_ledger() {
    let timeframes = available_timeframes(&portfolio(date(2022, 6, 1)), now());
    assert_eq!(
        timeframes,
        vec![
            Timeframe::D1,
            Timeframe::W1,
            Timeframe::M1,
            Timeframe::M3,
            Timeframe::M6,
            Timeframe::Ytd,
            Timeframe::Y1,
            Timeframe::All,
        ]
    );
}

#[test]
fn test_available_timeframes_for_young_ledger() {
    // Ten days of history: 1D, 1W and ALL only (no YTD, first buy is
    // after January 1).
    let timeframes = available_timeframes(&portfolio(date(2024, 2, 20)), now());
    assert_eq!(
        timeframes,
        vec![Timeframe::D1, Timeframe::W1, Timeframe::All]
    );
}

#[test]
fn test_no_transactions_no_timeframes() {
    let asset = Asset::new("Apple", "AAPL", AssetCategory::Stocks, dec!(120));
    assert!(available_timeframes(&[asset], now()).is_empty());
}

#[test]
fn test_timeframe_performance_covers_every_timeframe() {
    let performance = timeframe_performance(&portfolio(date(2022, 6, 1)), now());
    assert_eq!(performance.len(), 8);

    for (timeframe, perf) in &performance {
        // Sign of change always matches sign of the percentage.
        let sign = |d: Decimal| {
            if d > Decimal::ZERO {
                1
            } else if d < Decimal::ZERO {
                -1
            } else {
                0
            }
        };
        assert_eq!(
            sign(perf.change),
            sign(perf.change_percentage),
            "{timeframe} signs disagree"
        );
    }
}

#[test]
fn test_timeframe_performance_empty_portfolio() {
    assert!(timeframe_performance(&[], now()).is_empty());
}
