//! Previous-session close model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Source tag used when every provider failed and the close had to be
/// estimated from the current price.
pub const SOURCE_ESTIMATE: &str = "Estimate (API Failed)";

/// Source tag used when a batch slot degraded without even reaching the
/// per-symbol chain.
pub const SOURCE_FALLBACK: &str = "Fallback";

/// The official close of the most recently completed trading session for
/// one symbol, or an explicit estimate of it.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousClose {
    /// Uppercase ticker symbol
    pub symbol: String,

    /// Closing price of the last completed session
    pub previous_close: Decimal,

    /// Current price the caller supplied, kept for estimate auditing
    pub current_price: Decimal,

    /// Session date the close belongs to (today's date for quote-embedded
    /// closes, where providers do not report the session date)
    pub date: NaiveDate,

    /// Where the value came from: a provider id, [`SOURCE_ESTIMATE`], or
    /// [`SOURCE_FALLBACK`]
    pub source: String,
}

impl PreviousClose {
    /// True when this value was synthesized rather than fetched; callers
    /// surface this so the UI can signal reduced confidence.
    pub fn is_estimate(&self) -> bool {
        self.source == SOURCE_ESTIMATE || self.source == SOURCE_FALLBACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_estimate_detection() {
        let real = PreviousClose {
            symbol: "AAPL".to_string(),
            previous_close: dec!(149.50),
            current_price: dec!(150.25),
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            source: "FINNHUB".to_string(),
        };
        assert!(!real.is_estimate());

        let estimated = PreviousClose {
            source: SOURCE_ESTIMATE.to_string(),
            ..real.clone()
        };
        assert!(estimated.is_estimate());

        let fallback = PreviousClose {
            source: SOURCE_FALLBACK.to_string(),
            ..real
        };
        assert!(fallback.is_estimate());
    }
}
