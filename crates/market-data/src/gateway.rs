//! Price feed gateway.
//!
//! Front door for live market data. Quotes flow through a fixed
//! provider chain in priority order; a provider whose minute budget is
//! spent is skipped immediately rather than waited on, and one that is
//! slow is cut off by a per-attempt timeout. Successful quotes are
//! cached briefly, and when the whole chain fails an expired cache
//! entry is served rather than nothing.

use std::sync::Arc;

use futures::future::join_all;
use log::{debug, warn};

use crate::cache::{cache_key, TtlCache};
use crate::clock::Clock;
use crate::constants::{
    BATCH_DELAY, QUOTE_BATCH_SIZE, QUOTE_TTL, SEARCH_RESULT_CAP, SEARCH_TTL,
};
use crate::errors::MarketDataError;
use crate::models::{MarketQuote, SymbolSearchResult};
use crate::provider::QuoteProvider;
use crate::registry::ProviderRegistry;

pub struct PriceFeedGateway {
    registry: Arc<ProviderRegistry>,
    quote_cache: TtlCache<MarketQuote>,
    search_cache: TtlCache<Vec<SymbolSearchResult>>,
}

impl PriceFeedGateway {
    pub fn new(registry: Arc<ProviderRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self {
            registry,
            quote_cache: TtlCache::new(clock.clone()),
            search_cache: TtlCache::new(clock),
        }
    }

    /// Fetch a quote, preferring the cache, then the provider chain in
    /// priority order, then a stale cache entry as last resort. A total
    /// miss is `None`, never an error; provider failures are logged
    /// here and absorbed.
    pub async fn quote(&self, symbol: &str) -> Option<MarketQuote> {
        let symbol = symbol.trim().to_uppercase();
        let key = cache_key("quote", &symbol);

        if let Some(cached) = self.quote_cache.get(&key) {
            debug!("quote cache hit for {}", symbol);
            return Some(cached);
        }

        for provider in self.registry.ordered() {
            if !self.registry.rate_limiter().try_acquire(provider.id()) {
                debug!("{} budget spent, skipping for {}", provider.id(), symbol);
                continue;
            }

            match self.attempt_quote(provider, &symbol).await {
                Ok(quote) => {
                    self.quote_cache.insert(&key, quote.clone(), QUOTE_TTL);
                    return Some(quote);
                }
                Err(e) => {
                    warn!("{} failed for {}: {}", provider.id(), symbol, e);
                }
            }
        }

        if let Some(stale) = self.quote_cache.get_stale(&key) {
            warn!("all providers failed for {}, serving stale quote", symbol);
            return Some(stale);
        }

        warn!("all providers failed for {} and no cached quote", symbol);
        None
    }

    async fn attempt_quote(
        &self,
        provider: &Arc<dyn QuoteProvider>,
        symbol: &str,
    ) -> Result<MarketQuote, MarketDataError> {
        let quote = tokio::time::timeout(provider.timeout(), provider.quote(symbol))
            .await
            .map_err(|_| MarketDataError::Timeout {
                provider: provider.id().to_string(),
            })??;

        if !quote.is_well_formed() {
            return Err(MarketDataError::DataFormat {
                provider: provider.id().to_string(),
                message: format!("non-positive price for {}", symbol),
            });
        }
        Ok(quote)
    }

    /// Refresh quotes for a whole watch list. Symbols are fetched in
    /// small concurrent batches with a pause between batches so a long
    /// list cannot drain every provider's minute budget at once.
    /// Symbols that fail everywhere are dropped from the result.
    pub async fn refresh_quotes(&self, symbols: &[String]) -> Vec<MarketQuote> {
        let mut quotes = Vec::with_capacity(symbols.len());

        for (index, batch) in symbols.chunks(QUOTE_BATCH_SIZE).enumerate() {
            if index > 0 {
                tokio::time::sleep(BATCH_DELAY).await;
            }

            let results = join_all(batch.iter().map(|s| self.quote(s))).await;
            for (symbol, result) in batch.iter().zip(results) {
                match result {
                    Some(quote) => quotes.push(quote),
                    None => warn!("refresh skipped {}: no provider answered", symbol),
                }
            }
        }

        quotes
    }

    /// Symbol search fanned out to every provider that supports it.
    /// Results are merged with the highest-priority provider winning
    /// duplicates, ranked by match quality, and capped. Providers that
    /// fail or are out of budget simply contribute nothing.
    pub async fn search(&self, query: &str) -> Vec<SymbolSearchResult> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        let key = cache_key("search", &trimmed.to_lowercase());
        if let Some(cached) = self.search_cache.get(&key) {
            debug!("search cache hit for {:?}", trimmed);
            return cached;
        }

        let providers = self.registry.search_capable();
        let admitted: Vec<_> = providers
            .iter()
            .filter(|p| self.registry.rate_limiter().try_acquire(p.id()))
            .collect();

        let results = join_all(admitted.iter().map(|provider| async move {
            tokio::time::timeout(provider.timeout(), provider.search(trimmed))
                .await
                .map_err(|_| MarketDataError::Timeout {
                    provider: provider.id().to_string(),
                })?
        }))
        .await;

        let mut merged: Vec<SymbolSearchResult> = Vec::new();
        let mut any_succeeded = false;
        for (provider, result) in admitted.iter().zip(results) {
            match result {
                Ok(batch) => {
                    any_succeeded = true;
                    for item in batch {
                        if !merged.iter().any(|r| r.symbol == item.symbol) {
                            merged.push(item);
                        }
                    }
                }
                Err(e) => warn!("{} search failed for {:?}: {}", provider.id(), trimmed, e),
            }
        }

        if !any_succeeded {
            // A stale result set still beats an empty page.
            if let Some(stale) = self.search_cache.get_stale(&key) {
                return stale;
            }
            warn!("no search provider answered for {:?}", trimmed);
            return Vec::new();
        }

        rank_results(&mut merged, trimmed);
        merged.truncate(SEARCH_RESULT_CAP);
        self.search_cache.insert(&key, merged.clone(), SEARCH_TTL);
        merged
    }

    /// Drop any cached quote for `symbol`, fresh or stale.
    pub fn invalidate(&self, symbol: &str) {
        let symbol = symbol.trim().to_uppercase();
        self.quote_cache.invalidate(&cache_key("quote", &symbol));
    }

    /// Force-refresh support: drop the cached quotes for a whole list.
    pub fn invalidate_many(&self, symbols: &[String]) {
        for symbol in symbols {
            self.invalidate(symbol);
        }
    }

    pub fn clear_cache(&self) {
        self.quote_cache.clear();
        self.search_cache.clear();
    }

    /// Best-effort cache-only lookup, used by callers that must not
    /// trigger network traffic.
    pub fn cached_quote(&self, symbol: &str) -> Option<MarketQuote> {
        let symbol = symbol.trim().to_uppercase();
        self.quote_cache.get(&cache_key("quote", &symbol))
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }
}

/// Order search hits by how directly they match the query: exact symbol
/// first, then symbol prefix, then name substring, then everything else
/// alphabetically.
fn rank_results(results: &mut [SymbolSearchResult], query: &str) {
    let q = query.to_uppercase();
    let q_lower = query.to_lowercase();

    results.sort_by(|a, b| {
        let rank = |r: &SymbolSearchResult| -> u8 {
            if r.symbol == q {
                0
            } else if r.symbol.starts_with(&q) {
                1
            } else if r.name.to_lowercase().contains(&q_lower) {
                2
            } else {
                3
            }
        };
        rank(a).cmp(&rank(b)).then_with(|| a.symbol.cmp(&b.symbol))
    });
}
