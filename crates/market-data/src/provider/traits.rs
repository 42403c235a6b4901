//! Quote provider trait definition.
//!
//! Each external price source implements [`QuoteProvider`]. The gateway and
//! previous-close resolver hold ordered lists of trait objects, so providers
//! can be added, removed, or reordered independently and unit-tested in
//! isolation with fakes.

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{MarketQuote, PreviousClose, SymbolSearchResult};

/// Rate limiting declared by a provider.
#[derive(Clone, Copy, Debug)]
pub struct RateLimit {
    /// Requests admitted per sliding 60-second window.
    pub requests_per_minute: u32,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            requests_per_minute: 60,
        }
    }
}

/// An external price, search, or end-of-day data source.
///
/// Implementations normalize their provider-specific JSON into the shared
/// models and map every transport or shape problem into a
/// [`MarketDataError`]; they never panic on bad responses.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Unique identifier, a constant like "YAHOO" or "FINNHUB". Used for
    /// rate-limit accounting, logging, and source tags.
    fn id(&self) -> &'static str;

    /// Chain position. Lower values are tried first. Default is 10.
    fn priority(&self) -> u8 {
        10
    }

    /// Declared request budget for the sliding window.
    fn rate_limit(&self) -> RateLimit;

    /// Per-attempt timeout budget. A hung call is abandoned after this
    /// long and the chain moves on.
    fn timeout(&self) -> Duration {
        Duration::from_secs(2)
    }

    /// Fetch the current quote for a symbol.
    async fn quote(&self, symbol: &str) -> Result<MarketQuote, MarketDataError>;

    /// Fetch the close of the most recently completed session.
    ///
    /// Default implementation reports the operation as unsupported;
    /// the resolver only chains providers that override this.
    async fn previous_close(
        &self,
        symbol: &str,
    ) -> Result<PreviousClose, MarketDataError> {
        let _ = symbol;
        Err(MarketDataError::NotSupported {
            operation: "previous_close".to_string(),
            provider: self.id().to_string(),
        })
    }

    /// Search for symbols matching the query. Default: unsupported.
    async fn search(&self, query: &str) -> Result<Vec<SymbolSearchResult>, MarketDataError> {
        let _ = query;
        Err(MarketDataError::NotSupported {
            operation: "search".to_string(),
            provider: self.id().to_string(),
        })
    }

    /// Whether this provider participates in search fan-out.
    fn supports_search(&self) -> bool {
        false
    }

    /// Whether this provider participates in the previous-close chain.
    fn supports_previous_close(&self) -> bool {
        false
    }
}
