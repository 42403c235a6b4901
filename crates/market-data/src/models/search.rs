//! Search result model for symbol lookup.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Result from a ticker/symbol search.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolSearchResult {
    /// Symbol/ticker (e.g., "AAPL", "BTC-USD")
    pub symbol: String,

    /// Display name (e.g., "Apple Inc")
    pub name: String,

    /// Asset type as reported by the provider (e.g., "Equity", "ETF")
    pub asset_type: String,

    /// Region/country (e.g., "US")
    pub region: String,

    /// Quote currency (e.g., "USD")
    pub currency: String,

    /// Last known price, when the provider includes one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
}

impl SymbolSearchResult {
    /// Create a search result with required fields.
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        asset_type: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            asset_type: asset_type.into(),
            region: "US".to_string(),
            currency: "USD".to_string(),
            price: None,
        }
    }

    /// Set the region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Set the currency.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }
}
