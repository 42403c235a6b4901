//! Performance models.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Charting window for performance series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1D")]
    D1,
    #[serde(rename = "1W")]
    W1,
    #[serde(rename = "1M")]
    M1,
    #[serde(rename = "3M")]
    M3,
    #[serde(rename = "6M")]
    M6,
    #[serde(rename = "YTD")]
    Ytd,
    #[serde(rename = "1Y")]
    Y1,
    #[serde(rename = "ALL")]
    All,
}

impl Timeframe {
    pub const ALL_TIMEFRAMES: [Timeframe; 8] = [
        Timeframe::D1,
        Timeframe::W1,
        Timeframe::M1,
        Timeframe::M3,
        Timeframe::M6,
        Timeframe::Ytd,
        Timeframe::Y1,
        Timeframe::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::D1 => "1D",
            Timeframe::W1 => "1W",
            Timeframe::M1 => "1M",
            Timeframe::M3 => "3M",
            Timeframe::M6 => "6M",
            Timeframe::Ytd => "YTD",
            Timeframe::Y1 => "1Y",
            Timeframe::All => "ALL",
        }
    }

    /// Length of this window in days. YTD counts from January 1 of the
    /// current year; ALL counts from the earliest transaction, falling
    /// back to a year when the ledger is empty.
    pub fn period_days(
        &self,
        now: DateTime<Utc>,
        earliest_transaction: Option<NaiveDate>,
    ) -> i64 {
        match self {
            Timeframe::D1 => 1,
            Timeframe::W1 => 7,
            Timeframe::M1 => 30,
            Timeframe::M3 => 90,
            Timeframe::M6 => 180,
            Timeframe::Y1 => 365,
            Timeframe::Ytd => {
                let jan1 = NaiveDate::from_ymd_opt(now.year(), 1, 1)
                    .unwrap_or_else(|| now.date_naive());
                (now.date_naive() - jan1).num_days().max(1)
            }
            Timeframe::All => match earliest_transaction {
                Some(earliest) => (now.date_naive() - earliest).num_days().max(1),
                None => 365,
            },
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One chart point: percent change from the period start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataPoint {
    pub date: NaiveDate,
    pub value: Decimal,
}

/// Change of the portfolio over one timeframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeframePerformance {
    pub change: Decimal,
    pub change_percentage: Decimal,
}
