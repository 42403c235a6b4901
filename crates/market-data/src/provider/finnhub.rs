//! Finnhub provider.
//!
//! Third in the chain. The `/quote` endpoint returns current price,
//! change, percent change and the prior close in one call, so it backs
//! both quotes and previous-close lookups. A zeroed body is Finnhub's
//! way of saying "unknown symbol".

use std::time::Duration;

use async_trait::async_trait;
use chrono::Duration as ChronoDuration;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::clock::{Clock, SystemClock};
use crate::errors::MarketDataError;
use crate::models::{MarketQuote, PreviousClose, SymbolSearchResult};
use crate::provider::traits::{QuoteProvider, RateLimit};
use crate::provider::{fetch_text, parse_json};
use std::sync::Arc;

pub const PROVIDER_ID: &str = "Finnhub";

const BASE_URL: &str = "https://finnhub.io/api/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

pub struct FinnhubProvider {
    client: Client,
    api_key: String,
    clock: Arc<dyn Clock>,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    /// Current price.
    c: Option<f64>,
    /// Absolute change.
    d: Option<f64>,
    /// Percent change.
    dp: Option<f64>,
    /// Previous close.
    pc: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: Option<Vec<SearchMatch>>,
}

#[derive(Debug, Deserialize)]
struct SearchMatch {
    symbol: String,
    description: String,
    #[serde(rename = "type")]
    asset_type: String,
}

impl FinnhubProvider {
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
        pairs.push(("token", &self.api_key));
        #[allow(clippy::unwrap_used)]
        let url =
            reqwest::Url::parse_with_params(&format!("{}{}", BASE_URL, path), &pairs).unwrap();

        let masked = url.as_str().replace(&self.api_key, "***");
        (url, masked)
    }

    fn to_decimal(field: &str, value: f64) -> Result<Decimal, MarketDataError> {
        Decimal::from_f64_retain(value).ok_or_else(|| MarketDataError::DataFormat {
            provider: PROVIDER_ID.to_string(),
            message: format!("non-finite {}: {}", field, value),
        })
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<QuoteResponse, MarketDataError> {
        let (url, masked) = self.url("/quote", &[("symbol", symbol)]);
        let text = fetch_text(&self.client, PROVIDER_ID, url, &masked).await?;
        let response: QuoteResponse = parse_json(PROVIDER_ID, &text)?;

        // Finnhub answers unknown symbols with an all-zero quote.
        match response.c {
            Some(price) if price != 0.0 => Ok(response),
            _ => Err(MarketDataError::DataFormat {
                provider: PROVIDER_ID.to_string(),
                message: format!("no quote data for {}", symbol),
            }),
        }
    }
}

#[async_trait]
impl QuoteProvider for FinnhubProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        3
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_minute: 30,
        }
    }

    fn supports_search(&self) -> bool {
        true
    }

    fn supports_previous_close(&self) -> bool {
        true
    }

    async fn quote(&self, symbol: &str) -> Result<MarketQuote, MarketDataError> {
        let response = self.fetch_quote(symbol).await?;
        Ok(MarketQuote::new(
            symbol,
            Self::to_decimal("price", response.c.unwrap_or_default())?,
            Self::to_decimal("change", response.d.unwrap_or_default())?,
            Self::to_decimal("percent change", response.dp.unwrap_or_default())?,
            PROVIDER_ID,
        ))
    }

    async fn previous_close(&self, symbol: &str) -> Result<PreviousClose, MarketDataError> {
        let response = self.fetch_quote(symbol).await?;
        let prior = match response.pc {
            Some(pc) if pc != 0.0 => pc,
            _ => {
                return Err(MarketDataError::DataFormat {
                    provider: PROVIDER_ID.to_string(),
                    message: format!("no previous close for {}", symbol),
                })
            }
        };

        let date = (self.clock.now() - ChronoDuration::days(1)).date_naive();
        Ok(PreviousClose {
            symbol: symbol.to_uppercase(),
            previous_close: Self::to_decimal("previous close", prior)?,
            current_price: Self::to_decimal("price", response.c.unwrap_or_default())?,
            date,
            source: PROVIDER_ID.to_string(),
        })
    }

    async fn search(&self, query: &str) -> Result<Vec<SymbolSearchResult>, MarketDataError> {
        let (url, masked) = self.url("/search", &[("q", query)]);
        let text = fetch_text(&self.client, PROVIDER_ID, url, &masked).await?;
        let response: SearchResponse = parse_json(PROVIDER_ID, &text)?;

        Ok(response
            .result
            .unwrap_or_default()
            .into_iter()
            .map(|m| SymbolSearchResult::new(&m.symbol, &m.description, &m.asset_type))
            .collect())
    }
}
