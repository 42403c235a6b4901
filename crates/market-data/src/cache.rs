//! Generic TTL-keyed cache shared by the fetch-based services.
//!
//! Entries expire strictly by wall clock, measured through an injected
//! [`Clock`] so expiry is testable without sleeping. Expired entries are
//! deliberately left in the map: when every provider fails, a stale entry
//! is still a better answer than nothing, and the gateway serves it as a
//! last resort via [`TtlCache::get_stale`].
//!
//! Access is read-check-then-write without any cross-entry atomicity.
//! Concurrent misses can cause redundant refetches but never corrupt
//! state, because entries are immutable once written and simply replaced
//! wholesale on refresh.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::clock::Clock;

/// A cached value together with its lifetime bounds.
#[derive(Clone, Debug)]
pub struct CacheEntry<T> {
    /// The cached value
    pub data: T,
    /// When the entry was written
    pub timestamp: DateTime<Utc>,
    /// Wall-clock instant after which the entry is stale
    pub expires_at: DateTime<Utc>,
}

/// TTL-keyed in-memory store.
pub struct TtlCache<T: Clone> {
    entries: DashMap<String, CacheEntry<T>>,
    clock: Arc<dyn Clock>,
}

impl<T: Clone> TtlCache<T> {
    /// Create an empty cache driven by the given clock.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Store `data` under `key` for `ttl`, replacing any previous entry.
    pub fn insert(&self, key: impl Into<String>, data: T, ttl: Duration) {
        let now = self.clock.now();
        let expires_at = now
            + chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::seconds(0));
        self.entries.insert(
            key.into(),
            CacheEntry {
                data,
                timestamp: now,
                expires_at,
            },
        );
    }

    /// Fetch a fresh entry. Returns `None` when the key is absent or the
    /// entry has expired; the expired entry stays available to
    /// [`get_stale`](Self::get_stale).
    pub fn get(&self, key: &str) -> Option<T> {
        let entry = self.entries.get(key)?;
        if self.clock.now() >= entry.expires_at {
            return None;
        }
        Some(entry.data.clone())
    }

    /// Fetch an entry regardless of expiry. Last-resort fallback when a
    /// live fetch failed.
    pub fn get_stale(&self, key: &str) -> Option<T> {
        self.entries.get(key).map(|entry| entry.data.clone())
    }

    /// Drop a single entry, forcing the next lookup to refetch.
    pub fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build a composite cache key from a prefix and parts, e.g.
/// `quote:AAPL` or `search:apple`.
pub fn cache_key(prefix: &str, part: &str) -> String {
    format!("{}:{}", prefix, part)
}
