//! Provider registry and per-provider rate limiting.

pub mod rate_limiter;

pub use rate_limiter::{RateLimitConfig, RateLimiter};

use std::sync::Arc;

use log::info;

use crate::constants::RATE_LIMIT_WINDOW;
use crate::provider::{
    AlphaVantageProvider, FinnhubProvider, QuoteProvider, TwelveDataProvider, YahooProvider,
};
use crate::settings::ProviderSettings;

/// Ordered set of quote providers plus the limiter that governs them.
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn QuoteProvider>>,
    rate_limiter: RateLimiter,
}

impl ProviderRegistry {
    /// Build the chain from the configured API keys. Yahoo needs no key
    /// and is always present; keyed providers join only when their key
    /// is set. The result is sorted by ascending priority.
    pub fn from_settings(settings: &ProviderSettings) -> Self {
        let mut providers: Vec<Arc<dyn QuoteProvider>> = vec![Arc::new(YahooProvider::new())];

        if let Some(key) = &settings.alpha_vantage_api_key {
            providers.push(Arc::new(AlphaVantageProvider::new(key.clone())));
        }
        if let Some(key) = &settings.finnhub_api_key {
            providers.push(Arc::new(FinnhubProvider::new(key.clone())));
        }
        if let Some(key) = &settings.twelve_data_api_key {
            providers.push(Arc::new(TwelveDataProvider::new(key.clone())));
        }

        Self::with_providers(providers)
    }

    pub fn with_providers(mut providers: Vec<Arc<dyn QuoteProvider>>) -> Self {
        providers.sort_by_key(|p| p.priority());

        let rate_limiter = RateLimiter::new();
        for provider in &providers {
            rate_limiter.configure(
                provider.id(),
                RateLimitConfig {
                    requests_per_window: provider.rate_limit().requests_per_minute,
                    window: RATE_LIMIT_WINDOW,
                },
            );
        }

        let ids: Vec<&str> = providers.iter().map(|p| p.id()).collect();
        info!("provider chain: {}", ids.join(" -> "));

        Self {
            providers,
            rate_limiter,
        }
    }

    /// Providers in priority order.
    pub fn ordered(&self) -> &[Arc<dyn QuoteProvider>] {
        &self.providers
    }

    pub fn search_capable(&self) -> Vec<Arc<dyn QuoteProvider>> {
        self.providers
            .iter()
            .filter(|p| p.supports_search())
            .cloned()
            .collect()
    }

    pub fn previous_close_capable(&self) -> Vec<Arc<dyn QuoteProvider>> {
        self.providers
            .iter()
            .filter(|p| p.supports_previous_close())
            .cloned()
            .collect()
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(av: Option<&str>, fh: Option<&str>, td: Option<&str>) -> ProviderSettings {
        ProviderSettings {
            alpha_vantage_api_key: av.map(String::from),
            finnhub_api_key: fh.map(String::from),
            twelve_data_api_key: td.map(String::from),
        }
    }

    #[test]
    fn test_yahoo_always_present() {
        let registry = ProviderRegistry::from_settings(&settings(None, None, None));
        let ids: Vec<&str> = registry.ordered().iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec!["Yahoo"]);
    }

    #[test]
    fn test_full_chain_priority_order() {
        let registry =
            ProviderRegistry::from_settings(&settings(Some("a"), Some("b"), Some("c")));
        let ids: Vec<&str> = registry.ordered().iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec!["AlphaVantage", "Yahoo", "Finnhub", "TwelveData"]);
    }

    #[test]
    fn test_previous_close_chain_skips_yahoo() {
        let registry =
            ProviderRegistry::from_settings(&settings(Some("a"), Some("b"), Some("c")));
        let ids: Vec<&str> = registry
            .previous_close_capable()
            .iter()
            .map(|p| p.id())
            .collect();
        assert_eq!(ids, vec!["AlphaVantage", "Finnhub", "TwelveData"]);
    }

    #[test]
    fn test_limiter_seeded_with_provider_budgets() {
        let registry = ProviderRegistry::from_settings(&settings(Some("a"), None, None));
        assert_eq!(registry.rate_limiter().remaining("AlphaVantage"), 5);
        assert_eq!(registry.rate_limiter().remaining("Yahoo"), 50);
    }
}
