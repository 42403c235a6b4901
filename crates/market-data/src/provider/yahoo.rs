//! Yahoo Finance provider.
//!
//! No API key required. Quotes come from the v8 chart endpoint: the
//! `meta` block of a one-day chart carries the regular market price and
//! the prior close, which is enough to derive change figures.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::errors::MarketDataError;
use crate::models::MarketQuote;
use crate::provider::traits::{QuoteProvider, RateLimit};
use crate::provider::{fetch_text, parse_json};

pub const PROVIDER_ID: &str = "Yahoo";

const BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

pub struct YahooProvider {
    client: Client,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: String,
    regular_market_price: Option<f64>,
    previous_close: Option<f64>,
    chart_previous_close: Option<f64>,
}

impl YahooProvider {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    fn to_decimal(field: &str, value: f64) -> Result<Decimal, MarketDataError> {
        Decimal::from_f64_retain(value).ok_or_else(|| MarketDataError::DataFormat {
            provider: PROVIDER_ID.to_string(),
            message: format!("non-finite {}: {}", field, value),
        })
    }

    fn quote_from_meta(meta: &ChartMeta) -> Result<MarketQuote, MarketDataError> {
        let price = meta
            .regular_market_price
            .ok_or_else(|| MarketDataError::DataFormat {
                provider: PROVIDER_ID.to_string(),
                message: format!("no market price for {}", meta.symbol),
            })?;
        let price = Self::to_decimal("price", price)?;

        // previousClose is absent for some instruments; the chart-scoped
        // prior close is the fallback.
        let prior = meta.previous_close.or(meta.chart_previous_close);
        let (change, change_percent) = match prior {
            Some(prior) if prior != 0.0 => {
                let prior = Self::to_decimal("previous close", prior)?;
                let change = price - prior;
                (change, change / prior * Decimal::ONE_HUNDRED)
            }
            _ => (Decimal::ZERO, Decimal::ZERO),
        };

        Ok(MarketQuote::new(
            &meta.symbol,
            price,
            change,
            change_percent,
            PROVIDER_ID,
        ))
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteProvider for YahooProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        2
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_minute: 50,
        }
    }

    fn timeout(&self) -> Duration {
        REQUEST_TIMEOUT
    }

    async fn quote(&self, symbol: &str) -> Result<MarketQuote, MarketDataError> {
        let encoded = urlencoding::encode(symbol);
        let raw = format!("{}/{}?interval=1d&range=1d", BASE_URL, encoded);
        let url = reqwest::Url::parse(&raw).map_err(|e| MarketDataError::ProviderError {
            provider: PROVIDER_ID.to_string(),
            message: format!("invalid url for {}: {}", symbol, e),
        })?;
        let text = fetch_text(&self.client, PROVIDER_ID, url, &raw).await?;

        let response: ChartResponse = parse_json(PROVIDER_ID, &text)?;
        if let Some(error) = response.chart.error {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: error.description,
            });
        }

        let result = response
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| MarketDataError::DataFormat {
                provider: PROVIDER_ID.to_string(),
                message: format!("no chart result for {}", symbol),
            })?;

        Self::quote_from_meta(&result.meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quote_from_meta() {
        let body = r#"{
            "chart": {
                "result": [{
                    "meta": {
                        "symbol": "MSFT",
                        "regularMarketPrice": 410.0,
                        "previousClose": 400.0
                    }
                }],
                "error": null
            }
        }"#;
        let response: ChartResponse = serde_json::from_str(body).unwrap();
        let meta = &response.chart.result.unwrap()[0].meta;
        let quote = YahooProvider::quote_from_meta(meta).unwrap();
        assert_eq!(quote.symbol, "MSFT");
        assert_eq!(quote.price, dec!(410));
        assert_eq!(quote.change, dec!(10));
        assert_eq!(quote.change_percent, dec!(2.5));
    }

    #[test]
    fn test_chart_previous_close_fallback() {
        let meta = ChartMeta {
            symbol: "GC=F".to_string(),
            regular_market_price: Some(2050.0),
            previous_close: None,
            chart_previous_close: Some(2000.0),
        };
        let quote = YahooProvider::quote_from_meta(&meta).unwrap();
        assert_eq!(quote.change, dec!(50));
    }

    #[test]
    fn test_missing_price_is_data_format_error() {
        let meta = ChartMeta {
            symbol: "XXXX".to_string(),
            regular_market_price: None,
            previous_close: None,
            chart_previous_close: None,
        };
        let err = YahooProvider::quote_from_meta(&meta).unwrap_err();
        assert!(matches!(err, MarketDataError::DataFormat { .. }));
    }

    #[test]
    fn test_error_body() {
        let body = r#"{
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found"}
            }
        }"#;
        let response: ChartResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.chart.error.unwrap().description, "No data found");
    }

    #[test]
    fn test_no_search_support() {
        let provider = YahooProvider::new();
        assert!(!provider.supports_search());
        assert!(!provider.supports_previous_close());
    }
}
