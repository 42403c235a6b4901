//! Alpha Vantage provider.
//!
//! First in the chain. Alpha Vantage has the strictest free-tier limit
//! (5 requests per minute) and signals exhaustion through a `Note` or
//! `Information` field in an otherwise 200 response, so responses are
//! inspected before parsing.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::errors::MarketDataError;
use crate::models::{MarketQuote, PreviousClose, SymbolSearchResult};
use crate::provider::traits::{QuoteProvider, RateLimit};
use crate::provider::{fetch_text, parse_json};

pub const PROVIDER_ID: &str = "AlphaVantage";

const BASE_URL: &str = "https://www.alphavantage.co/query";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(4);

pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
}

#[derive(Debug, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "01. symbol")]
    symbol: String,
    #[serde(rename = "05. price")]
    price: String,
    #[serde(rename = "09. change")]
    change: String,
    #[serde(rename = "10. change percent")]
    change_percent: String,
}

#[derive(Debug, Deserialize)]
struct DailySeriesResponse {
    #[serde(rename = "Time Series (Daily)")]
    series: Option<BTreeMap<String, DailyBar>>,
}

#[derive(Debug, Deserialize)]
struct DailyBar {
    #[serde(rename = "4. close")]
    close: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "bestMatches")]
    best_matches: Option<Vec<SearchMatch>>,
}

#[derive(Debug, Deserialize)]
struct SearchMatch {
    #[serde(rename = "1. symbol")]
    symbol: String,
    #[serde(rename = "2. name")]
    name: String,
    #[serde(rename = "3. type")]
    asset_type: String,
    #[serde(rename = "4. region")]
    region: String,
    #[serde(rename = "8. currency")]
    currency: String,
}

/// Error envelope Alpha Vantage returns with HTTP 200.
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

impl AlphaVantageProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_key,
        }
    }

    fn url(&self, function: &str, params: &[(&str, &str)]) -> (reqwest::Url, String) {
        let mut pairs: Vec<(&str, &str)> = vec![("function", function)];
        pairs.extend_from_slice(params);
        pairs.push(("apikey", &self.api_key));
        #[allow(clippy::unwrap_used)]
        let url = reqwest::Url::parse_with_params(BASE_URL, &pairs).unwrap();

        let masked = url.as_str().replace(&self.api_key, "***");
        (url, masked)
    }

    /// Alpha Vantage reports throttling and bad symbols inside a 200 body.
    fn check_envelope(text: &str) -> Result<(), MarketDataError> {
        let envelope: ApiEnvelope = parse_json(PROVIDER_ID, text)?;
        if let Some(message) = envelope.error_message {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message,
            });
        }
        if envelope.note.is_some() || envelope.information.is_some() {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }
        Ok(())
    }

    fn parse_decimal(field: &str, value: &str) -> Result<Decimal, MarketDataError> {
        Decimal::from_str(value.trim().trim_end_matches('%')).map_err(|_| {
            MarketDataError::DataFormat {
                provider: PROVIDER_ID.to_string(),
                message: format!("invalid {}: {}", field, value),
            }
        })
    }
}

#[async_trait]
impl QuoteProvider for AlphaVantageProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        1
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_minute: 5,
        }
    }

    fn timeout(&self) -> Duration {
        REQUEST_TIMEOUT
    }

    fn supports_search(&self) -> bool {
        true
    }

    fn supports_previous_close(&self) -> bool {
        true
    }

    async fn quote(&self, symbol: &str) -> Result<MarketQuote, MarketDataError> {
        let (url, masked) = self.url("GLOBAL_QUOTE", &[("symbol", symbol)]);
        let text = fetch_text(&self.client, PROVIDER_ID, url, &masked).await?;
        Self::check_envelope(&text)?;

        let response: GlobalQuoteResponse = parse_json(PROVIDER_ID, &text)?;
        let quote = response
            .global_quote
            .filter(|q| !q.price.is_empty())
            .ok_or_else(|| MarketDataError::DataFormat {
                provider: PROVIDER_ID.to_string(),
                message: format!("no quote data for {}", symbol),
            })?;

        Ok(MarketQuote::new(
            &quote.symbol,
            Self::parse_decimal("price", &quote.price)?,
            Self::parse_decimal("change", &quote.change)?,
            Self::parse_decimal("change percent", &quote.change_percent)?,
            PROVIDER_ID,
        ))
    }

    async fn previous_close(&self, symbol: &str) -> Result<PreviousClose, MarketDataError> {
        let (url, masked) = self.url(
            "TIME_SERIES_DAILY",
            &[("symbol", symbol), ("outputsize", "compact")],
        );
        let text = fetch_text(&self.client, PROVIDER_ID, url, &masked).await?;
        Self::check_envelope(&text)?;

        let response: DailySeriesResponse = parse_json(PROVIDER_ID, &text)?;
        let series = response
            .series
            .filter(|s| !s.is_empty())
            .ok_or_else(|| MarketDataError::DataFormat {
                provider: PROVIDER_ID.to_string(),
                message: format!("no daily series for {}", symbol),
            })?;

        // BTreeMap keys are ISO dates, so iteration order is chronological.
        // The most recent bar is the current session; the one before it is
        // the previous close.
        let mut recent = series.iter().rev();
        let (latest_date, latest_bar) =
            recent.next().ok_or_else(|| MarketDataError::DataFormat {
                provider: PROVIDER_ID.to_string(),
                message: format!("empty daily series for {}", symbol),
            })?;
        let (close_date, close_bar) = recent.next().unwrap_or((latest_date, latest_bar));

        let date = NaiveDate::parse_from_str(close_date, "%Y-%m-%d").map_err(|_| {
            MarketDataError::DataFormat {
                provider: PROVIDER_ID.to_string(),
                message: format!("invalid series date: {}", close_date),
            }
        })?;

        Ok(PreviousClose {
            symbol: symbol.to_uppercase(),
            previous_close: Self::parse_decimal("close", &close_bar.close)?,
            current_price: Self::parse_decimal("close", &latest_bar.close)?,
            date,
            source: PROVIDER_ID.to_string(),
        })
    }

    async fn search(&self, query: &str) -> Result<Vec<SymbolSearchResult>, MarketDataError> {
        let (url, masked) = self.url("SYMBOL_SEARCH", &[("keywords", query)]);
        let text = fetch_text(&self.client, PROVIDER_ID, url, &masked).await?;
        Self::check_envelope(&text)?;

        let response: SearchResponse = parse_json(PROVIDER_ID, &text)?;
        Ok(response
            .best_matches
            .unwrap_or_default()
            .into_iter()
            .map(|m| {
                SymbolSearchResult::new(&m.symbol, &m.name, &m.asset_type)
                    .with_region(&m.region)
                    .with_currency(&m.currency)
            })
            .collect())
    }
}
