use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::clock::FixedClock;
use crate::errors::MarketDataError;
use crate::gateway::PriceFeedGateway;
use crate::models::{MarketQuote, SymbolSearchResult};
use crate::provider::{QuoteProvider, RateLimit};
use crate::registry::ProviderRegistry;

/// Scriptable provider for exercising the chain.
struct StubProvider {
    id: &'static str,
    priority: u8,
    requests_per_minute: u32,
    price: Option<Decimal>,
    delay: Option<Duration>,
    search_hits: Vec<SymbolSearchResult>,
    calls: Arc<AtomicUsize>,
}

impl StubProvider {
    fn ok(id: &'static str, priority: u8, price: Decimal) -> Self {
        Self {
            id,
            priority,
            requests_per_minute: 60,
            price: Some(price),
            delay: None,
            search_hits: Vec::new(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn failing(id: &'static str, priority: u8) -> Self {
        Self {
            price: None,
            ..Self::ok(id, priority, dec!(0))
        }
    }

    fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl QuoteProvider for StubProvider {
    fn id(&self) -> &'static str {
        self.id
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_minute: self.requests_per_minute,
        }
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(25)
    }

    fn supports_search(&self) -> bool {
        !self.search_hits.is_empty()
    }

    async fn quote(&self, symbol: &str) -> Result<MarketQuote, MarketDataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.price {
            Some(price) => Ok(MarketQuote::new(
                symbol,
                price,
                dec!(1),
                dec!(0.5),
                self.id,
            )),
            None => Err(MarketDataError::NetworkFailure {
                provider: self.id.to_string(),
                message: "connection refused".to_string(),
            }),
        }
    }

    async fn search(&self, _query: &str) -> Result<Vec<SymbolSearchResult>, MarketDataError> {
        if self.search_hits.is_empty() {
            return Err(MarketDataError::NotSupported {
                operation: "search".to_string(),
                provider: self.id.to_string(),
            });
        }
        Ok(self.search_hits.clone())
    }
}

fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 3, 1, 15, 0, 0).unwrap(),
    ))
}

fn gateway_with(providers: Vec<Arc<dyn QuoteProvider>>) -> (PriceFeedGateway, Arc<FixedClock>) {
    let clock = fixed_clock();
    let registry = Arc::new(ProviderRegistry::with_providers(providers));
    (PriceFeedGateway::new(registry, clock.clone()), clock)
}

#[tokio::test]
async fn test_first_healthy_provider_wins() {
    let primary = StubProvider::ok("primary", 1, dec!(100));
    let backup = StubProvider::ok("backup", 2, dec!(200));
    let backup_calls = backup.calls();

    let (gateway, _) = gateway_with(vec![Arc::new(primary), Arc::new(backup)]);
    let quote = gateway.quote("AAPL").await.unwrap();

    assert_eq!(quote.price, dec!(100));
    assert_eq!(quote.source, "primary");
    assert_eq!(backup_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_chain_falls_through_on_failure() {
    let primary = StubProvider::failing("primary", 1);
    let backup = StubProvider::ok("backup", 2, dec!(200));

    let (gateway, _) = gateway_with(vec![Arc::new(primary), Arc::new(backup)]);
    let quote = gateway.quote("AAPL").await.unwrap();

    assert_eq!(quote.source, "backup");
}

#[tokio::test]
async fn test_non_positive_price_rejected() {
    let bogus = StubProvider::ok("bogus", 1, dec!(0));
    let backup = StubProvider::ok("backup", 2, dec!(200));

    let (gateway, _) = gateway_with(vec![Arc::new(bogus), Arc::new(backup)]);
    let quote = gateway.quote("AAPL").await.unwrap();

    assert_eq!(quote.source, "backup");
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let mut slow = StubProvider::ok("slow", 1, dec!(100));
    slow.delay = Some(Duration::from_millis(200));
    let backup = StubProvider::ok("backup", 2, dec!(200));

    let (gateway, _) = gateway_with(vec![Arc::new(slow), Arc::new(backup)]);
    let quote = gateway.quote("AAPL").await.unwrap();

    assert_eq!(quote.source, "backup");
}

#[tokio::test]
async fn test_exhausted_budget_skips_provider_without_waiting() {
    let mut scarce = StubProvider::ok("scarce", 1, dec!(100));
    scarce.requests_per_minute = 1;
    let scarce_calls = scarce.calls();
    let backup = StubProvider::ok("backup", 2, dec!(200));

    let (gateway, _) = gateway_with(vec![Arc::new(scarce), Arc::new(backup)]);

    let first = gateway.quote("AAPL").await.unwrap();
    assert_eq!(first.source, "scarce");

    // Different symbol so the cache cannot answer. The single-request
    // budget is spent, so the chain must move on immediately.
    let second = gateway.quote("MSFT").await.unwrap();
    assert_eq!(second.source, "backup");
    assert_eq!(scarce_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_fresh_quote_served_from_cache() {
    let primary = StubProvider::ok("primary", 1, dec!(100));
    let calls = primary.calls();

    let (gateway, _) = gateway_with(vec![Arc::new(primary)]);
    gateway.quote("AAPL").await.unwrap();
    gateway.quote("aapl").await.unwrap();
    gateway.quote(" AAPL ").await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_stale_quote_served_when_chain_fails() {
    let mut flaky = StubProvider::ok("flaky", 1, dec!(100));
    flaky.requests_per_minute = 1;

    let (gateway, clock) = gateway_with(vec![Arc::new(flaky)]);
    gateway.quote("AAPL").await.unwrap();

    // Past the quote TTL, with the provider budget spent: the expired
    // entry is the only answer left.
    clock.advance(chrono::Duration::minutes(5));
    let quote = gateway.quote("AAPL").await.unwrap();
    assert_eq!(quote.price, dec!(100));
}

#[tokio::test]
async fn test_total_miss_is_none_not_error() {
    let (gateway, _) = gateway_with(vec![Arc::new(StubProvider::failing("only", 1))]);
    assert!(gateway.quote("AAPL").await.is_none());
}

#[tokio::test]
async fn test_invalidate_removes_stale_entry_too() {
    let (gateway, _) = gateway_with(vec![Arc::new(StubProvider::failing("only", 1))]);
    // Seed then invalidate by hand through the public surface.
    gateway.clear_cache();
    gateway.invalidate("AAPL");
    assert!(gateway.quote("AAPL").await.is_none());
}

#[tokio::test]
async fn test_refresh_quotes_drops_failures() {
    let primary = StubProvider::ok("primary", 1, dec!(100));
    let (gateway, _) = gateway_with(vec![Arc::new(primary)]);

    let symbols: Vec<String> = ["AAPL", "MSFT", "NVDA"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let quotes = gateway.refresh_quotes(&symbols).await;

    assert_eq!(quotes.len(), 3);
    assert!(quotes.iter().all(|q| q.price == dec!(100)));
}

#[tokio::test]
async fn test_search_merges_dedupes_and_ranks() {
    let mut first = StubProvider::ok("first", 1, dec!(1));
    first.search_hits = vec![
        SymbolSearchResult::new("AAPL", "Apple Inc", "Equity"),
        SymbolSearchResult::new("AAPL.SW", "Apple Inc", "Equity"),
    ];
    let mut second = StubProvider::ok("second", 2, dec!(1));
    second.search_hits = vec![
        SymbolSearchResult::new("AAPL", "Apple Inc (dup)", "Equity"),
        SymbolSearchResult::new("APLE", "Apple Hospitality REIT", "Equity"),
    ];

    let (gateway, _) = gateway_with(vec![Arc::new(first), Arc::new(second)]);
    let results = gateway.search("AAPL").await;

    let symbols: Vec<&str> = results.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["AAPL", "AAPL.SW", "APLE"]);
    // Higher-priority provider owns the duplicate.
    assert_eq!(results[0].name, "Apple Inc");
}

#[tokio::test]
async fn test_search_empty_query_short_circuits() {
    let mut only = StubProvider::ok("only", 1, dec!(1));
    only.search_hits = vec![SymbolSearchResult::new("AAPL", "Apple Inc", "Equity")];
    let calls = only.calls();

    let (gateway, _) = gateway_with(vec![Arc::new(only)]);
    let results = gateway.search("   ").await;

    assert!(results.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_search_without_capable_provider_is_empty_not_error() {
    let (gateway, _) = gateway_with(vec![Arc::new(StubProvider::failing("only", 1))]);
    assert!(gateway.search("AAPL").await.is_empty());
}

#[tokio::test]
async fn test_search_results_cached() {
    let mut only = StubProvider::ok("only", 1, dec!(1));
    only.requests_per_minute = 1;
    only.search_hits = vec![SymbolSearchResult::new("AAPL", "Apple Inc", "Equity")];

    let (gateway, _) = gateway_with(vec![Arc::new(only)]);
    gateway.search("apple").await;

    // Budget is spent, so this can only come from the cache.
    let results = gateway.search("Apple").await;
    assert_eq!(results.len(), 1);
}
