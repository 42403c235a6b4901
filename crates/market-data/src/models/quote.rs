use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A current quote for one symbol, normalized from whichever provider
/// answered first.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketQuote {
    /// Uppercase ticker symbol
    pub symbol: String,

    /// Latest traded price
    pub price: Decimal,

    /// Absolute change versus the previous session close
    pub change: Decimal,

    /// Percentage change versus the previous session close
    pub change_percent: Decimal,

    /// When the quote was normalized
    pub last_updated: DateTime<Utc>,

    /// Provider the quote came from (YAHOO, FINNHUB, ...)
    pub source: String,
}

impl MarketQuote {
    /// Create a quote stamped with the current instant.
    pub fn new(
        symbol: impl Into<String>,
        price: Decimal,
        change: Decimal,
        change_percent: Decimal,
        source: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            price,
            change,
            change_percent,
            last_updated: Utc::now(),
            source: source.into(),
        }
    }

    /// A quote is usable only when its price is strictly positive;
    /// providers occasionally return zeroed rows for unknown symbols.
    pub fn is_well_formed(&self) -> bool {
        self.price > Decimal::ZERO
    }
}
