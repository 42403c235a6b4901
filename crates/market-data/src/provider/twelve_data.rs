//! Twelve Data provider.
//!
//! Last in the chain. Numeric fields arrive as JSON strings, and errors
//! come back as `{"status": "error", ...}` with HTTP 200, so every body
//! is checked for that envelope first.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::errors::MarketDataError;
use crate::models::{MarketQuote, PreviousClose, SymbolSearchResult};
use crate::provider::traits::{QuoteProvider, RateLimit};
use crate::provider::{fetch_text, parse_json};

pub const PROVIDER_ID: &str = "TwelveData";

const BASE_URL: &str = "https://api.twelvedata.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

pub struct TwelveDataProvider {
    client: Client,
    api_key: String,
    clock: Arc<dyn Clock>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    status: Option<String>,
    message: Option<String>,
    code: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    symbol: Option<String>,
    close: Option<String>,
    change: Option<String>,
    percent_change: Option<String>,
    previous_close: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    data: Option<Vec<SearchMatch>>,
}

#[derive(Debug, Deserialize)]
struct SearchMatch {
    symbol: String,
    instrument_name: String,
    instrument_type: String,
    country: String,
    currency: String,
}

impl TwelveDataProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_clock(api_key, Arc::new(SystemClock))
    }

    pub fn with_clock(api_key: String, clock: Arc<dyn Clock>) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_key,
            clock,
        }
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> (reqwest::Url, String) {
        let mut pairs: Vec<(&str, &str)> = params.to_vec();
        pairs.push(("apikey", &self.api_key));
        #[allow(clippy::unwrap_used)]
        let url =
            reqwest::Url::parse_with_params(&format!("{}{}", BASE_URL, path), &pairs).unwrap();

        let masked = url.as_str().replace(&self.api_key, "***");
        (url, masked)
    }

    /// Twelve Data signals failure with a 200 body carrying
    /// `"status": "error"`. Code 429 means the minute budget is spent.
    fn check_envelope(text: &str) -> Result<(), MarketDataError> {
        let envelope: ErrorEnvelope = parse_json(PROVIDER_ID, text)?;
        if envelope.status.as_deref() == Some("error") {
            if envelope.code == Some(429) {
                return Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                });
            }
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: envelope
                    .message
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }
        Ok(())
    }

    fn parse_decimal(field: &str, value: Option<&str>) -> Result<Decimal, MarketDataError> {
        let raw = value.ok_or_else(|| MarketDataError::DataFormat {
            provider: PROVIDER_ID.to_string(),
            message: format!("missing {}", field),
        })?;
        Decimal::from_str(raw.trim()).map_err(|_| MarketDataError::DataFormat {
            provider: PROVIDER_ID.to_string(),
            message: format!("invalid {}: {}", field, raw),
        })
    }
}

#[async_trait]
impl QuoteProvider for TwelveDataProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        4
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_minute: 40,
        }
    }

    fn supports_search(&self) -> bool {
        true
    }

    fn supports_previous_close(&self) -> bool {
        true
    }

    async fn quote(&self, symbol: &str) -> Result<MarketQuote, MarketDataError> {
        let (url, masked) = self.url("/quote", &[("symbol", symbol)]);
        let text = fetch_text(&self.client, PROVIDER_ID, url, &masked).await?;
        Self::check_envelope(&text)?;

        let response: QuoteResponse = parse_json(PROVIDER_ID, &text)?;
        Ok(MarketQuote::new(
            response.symbol.as_deref().unwrap_or(symbol),
            Self::parse_decimal("close", response.close.as_deref())?,
            Self::parse_decimal("change", response.change.as_deref())?,
            Self::parse_decimal("percent_change", response.percent_change.as_deref())?,
            PROVIDER_ID,
        ))
    }

    async fn previous_close(&self, symbol: &str) -> Result<PreviousClose, MarketDataError> {
        // /quote carries previous_close alongside the current price, which
        // saves the second call /eod would need.
        let (url, masked) = self.url("/quote", &[("symbol", symbol)]);
        let text = fetch_text(&self.client, PROVIDER_ID, url, &masked).await?;
        Self::check_envelope(&text)?;
        let response: QuoteResponse = parse_json(PROVIDER_ID, &text)?;

        let date = (self.clock.now() - ChronoDuration::days(1)).date_naive();
        Ok(PreviousClose {
            symbol: symbol.to_uppercase(),
            previous_close: Self::parse_decimal(
                "previous_close",
                response.previous_close.as_deref(),
            )?,
            current_price: Self::parse_decimal("close", response.close.as_deref())?,
            date,
            source: PROVIDER_ID.to_string(),
        })
    }

    async fn search(&self, query: &str) -> Result<Vec<SymbolSearchResult>, MarketDataError> {
        let (url, masked) = self.url("/symbol_search", &[("symbol", query)]);
        let text = fetch_text(&self.client, PROVIDER_ID, url, &masked).await?;
        Self::check_envelope(&text)?;

        let response: SearchResponse = parse_json(PROVIDER_ID, &text)?;
        Ok(response
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|m| {
                SymbolSearchResult::new(&m.symbol, &m.instrument_name, &m.instrument_type)
                    .with_region(&m.country)
                    .with_currency(&m.currency)
            })
            .collect())
    }
}
