//! Performance chart series generation.
//!
//! Every point on a chart is a full historical snapshot expressed as a
//! percent change from the period's opening snapshot. Points step
//! hourly for the one-day window and daily otherwise, decimated so no
//! chart carries more than about fifty points, and the series always
//! terminates at "now" so the last point agrees with the live value.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::assets::Asset;
use crate::portfolio::performance::performance_model::{
    ChartDataPoint, Timeframe, TimeframePerformance,
};
use crate::portfolio::valuation::{snapshot_at, snapshot_now};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;
const MAX_DISPLAY_POINTS: i64 = 50;

/// Generate the chart series for one timeframe. Pure in
/// (assets, timeframe, now). Empty when there are no assets or the
/// portfolio is currently worthless.
pub fn generate(assets: &[Asset], timeframe: Timeframe, now: DateTime<Utc>) -> Vec<ChartDataPoint> {
    if assets.is_empty() {
        return Vec::new();
    }

    let current = snapshot_now(assets, now);
    if current.total_value <= Decimal::ZERO {
        return Vec::new();
    }

    let start = period_start(assets, timeframe, now);
    let hourly = timeframe == Timeframe::D1;
    let steps: i64 = if hourly {
        24
    } else {
        (now - start).num_days().max(1).min(365)
    };
    let step_size = (steps / MAX_DISPLAY_POINTS).max(1);

    let start_value = {
        let v = snapshot_at(assets, start, now).total_value;
        // A worthless opening snapshot would make every percentage
        // infinite; the original charts against 1 instead.
        if v > Decimal::ZERO {
            v
        } else {
            Decimal::ONE
        }
    };

    let mut data = Vec::new();
    let mut i = 0;
    while i <= steps {
        let mut target = if hourly {
            start + Duration::hours(i)
        } else {
            start + Duration::days(i)
        };
        if target > now {
            target = now;
        }

        let value = snapshot_at(assets, target, now).total_value;
        data.push(ChartDataPoint {
            date: target.date_naive(),
            value: percent_change(value, start_value),
        });

        if target >= now {
            break;
        }
        i += step_size;
    }

    // Terminate at now even when the stepping overshot or stopped short.
    let final_point = ChartDataPoint {
        date: now.date_naive(),
        value: percent_change(current.total_value, start_value),
    };
    match data.last() {
        Some(last) if last.date == final_point.date => {
            let index = data.len() - 1;
            data[index] = final_point;
        }
        _ => data.push(final_point),
    }

    data
}

/// Timeframes the ledger has enough history to chart.
pub fn available_timeframes(assets: &[Asset], now: DateTime<Utc>) -> Vec<Timeframe> {
    let earliest = earliest_transaction_date(assets);
    let Some(earliest) = earliest else {
        return Vec::new();
    };

    let history_days = (now.date_naive() - earliest).num_days();
    let mut timeframes = vec![Timeframe::D1];

    if history_days >= 7 {
        timeframes.push(Timeframe::W1);
    }
    if history_days >= 30 {
        timeframes.push(Timeframe::M1);
    }
    if history_days >= 90 {
        timeframes.push(Timeframe::M3);
    }
    if history_days >= 180 {
        timeframes.push(Timeframe::M6);
    }

    let jan1 = NaiveDate::from_ymd_opt(now.year(), 1, 1);
    if jan1.is_some_and(|jan1| earliest <= jan1) {
        timeframes.push(Timeframe::Ytd);
    }
    if history_days >= 365 {
        timeframes.push(Timeframe::Y1);
    }
    timeframes.push(Timeframe::All);

    timeframes
}

/// Change and percent change of the portfolio over every timeframe,
/// each measured against the snapshot at that timeframe's start.
pub fn timeframe_performance(
    assets: &[Asset],
    now: DateTime<Utc>,
) -> HashMap<Timeframe, TimeframePerformance> {
    let mut performance = HashMap::new();
    if assets.is_empty() {
        return performance;
    }

    let current_value = snapshot_now(assets, now).total_value;

    for timeframe in Timeframe::ALL_TIMEFRAMES {
        let start = period_start(assets, timeframe, now);
        let start_value = snapshot_at(assets, start, now).total_value;
        let change = current_value - start_value;
        let change_percentage = percent_change(current_value, start_value);

        performance.insert(
            timeframe,
            TimeframePerformance {
                change,
                change_percentage,
            },
        );
    }

    performance
}

fn percent_change(value: Decimal, start: Decimal) -> Decimal {
    if start > Decimal::ZERO {
        (value - start) / start * HUNDRED
    } else {
        Decimal::ZERO
    }
}

/// Opening instant of a timeframe's window.
fn period_start(assets: &[Asset], timeframe: Timeframe, now: DateTime<Utc>) -> DateTime<Utc> {
    match timeframe {
        Timeframe::Ytd => NaiveDate::from_ymd_opt(now.year(), 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| Utc.from_utc_datetime(&dt))
            .unwrap_or(now),
        Timeframe::All => earliest_transaction_date(assets)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| Utc.from_utc_datetime(&dt))
            .unwrap_or_else(|| now - Duration::days(365)),
        _ => now - Duration::days(timeframe.period_days(now, None)),
    }
}

fn earliest_transaction_date(assets: &[Asset]) -> Option<NaiveDate> {
    assets
        .iter()
        .filter_map(|a| a.earliest_transaction_date())
        .min()
}
