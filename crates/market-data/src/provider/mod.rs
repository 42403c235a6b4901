//! Quote provider implementations.

pub mod alpha_vantage;
pub mod finnhub;
mod traits;
pub mod twelve_data;
pub mod yahoo;

pub use alpha_vantage::AlphaVantageProvider;
pub use finnhub::FinnhubProvider;
pub use traits::{QuoteProvider, RateLimit};
pub use twelve_data::TwelveDataProvider;
pub use yahoo::YahooProvider;

use log::debug;
use reqwest::Client;

use crate::errors::MarketDataError;

/// Issue a GET and return the body text, mapping transport problems into
/// [`MarketDataError`]. `masked` is the URL safe for logging (API key
/// redacted).
pub(crate) async fn fetch_text(
    client: &Client,
    provider: &'static str,
    url: reqwest::Url,
    masked: &str,
) -> Result<String, MarketDataError> {
    debug!("{} request: {}", provider, masked);

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            MarketDataError::Timeout {
                provider: provider.to_string(),
            }
        } else if e.is_connect() {
            MarketDataError::NetworkFailure {
                provider: provider.to_string(),
                message: e.to_string(),
            }
        } else {
            MarketDataError::ProviderError {
                provider: provider.to_string(),
                message: e.to_string(),
            }
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(MarketDataError::ProviderError {
            provider: provider.to_string(),
            message: format!("HTTP {}", status),
        });
    }

    response
        .text()
        .await
        .map_err(|e| MarketDataError::NetworkFailure {
            provider: provider.to_string(),
            message: e.to_string(),
        })
}

/// Deserialize a provider body, mapping shape mismatches into
/// [`MarketDataError::DataFormat`].
pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(
    provider: &'static str,
    text: &str,
) -> Result<T, MarketDataError> {
    serde_json::from_str(text).map_err(|e| MarketDataError::DataFormat {
        provider: provider.to_string(),
        message: format!("failed to parse response: {}", e),
    })
}
