//! Cache lifetimes and batching knobs shared by the gateway and resolver.

use std::time::Duration;

/// How long a single-symbol quote stays fresh.
pub const QUOTE_TTL: Duration = Duration::from_secs(30);

/// How long symbol-search results stay fresh. Listings change rarely.
pub const SEARCH_TTL: Duration = Duration::from_secs(60 * 60 * 24);

/// How long a computed market status stays fresh.
pub const MARKET_STATUS_TTL: Duration = Duration::from_secs(60 * 5);

/// Width of each provider's sliding rate-limit window.
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

/// Symbols fetched concurrently per batch during a quote refresh.
pub const QUOTE_BATCH_SIZE: usize = 5;

/// Symbols fetched concurrently per batch during previous-close resolution.
/// Smaller than the quote batch because the daily-series endpoints are the
/// most heavily throttled ones.
pub const CLOSE_BATCH_SIZE: usize = 3;

/// Fixed pause between batches. A flat sleep, not adaptive backpressure.
pub const BATCH_DELAY: Duration = Duration::from_secs(1);

/// Maximum search results returned to the caller after ranking.
pub const SEARCH_RESULT_CAP: usize = 50;
