//! Market data access for the valuation engine.
//!
//! Live quotes, symbol search, previous closes and the market session
//! clock. Everything network-facing sits behind [`PriceFeedGateway`],
//! which runs a priority-ordered chain of free-tier providers with
//! per-provider sliding-window rate limits, per-attempt timeouts, and a
//! TTL cache that degrades to stale data before it degrades to an error.

pub mod cache;
pub mod clock;
pub mod constants;
pub mod errors;
pub mod gateway;
pub mod market_clock;
pub mod models;
pub mod previous_close;
pub mod provider;
pub mod registry;
pub mod settings;

pub use cache::TtlCache;
pub use clock::{Clock, FixedClock, SystemClock};
pub use errors::MarketDataError;
pub use gateway::PriceFeedGateway;
pub use market_clock::MarketClock;
pub use models::{MarketQuote, MarketStatus, PreviousClose, SymbolSearchResult};
pub use previous_close::PreviousCloseResolver;
pub use provider::{QuoteProvider, RateLimit};
pub use registry::{ProviderRegistry, RateLimitConfig, RateLimiter};
pub use settings::ProviderSettings;

#[cfg(test)]
mod gateway_tests;
