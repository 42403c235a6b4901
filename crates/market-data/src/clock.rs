//! Time source abstraction.
//!
//! Cache expiry and market-session arithmetic are both driven by wall-clock
//! time, so every component that needs "now" takes a [`Clock`] instead of
//! calling `Utc::now()` directly. Tests inject a [`FixedClock`].

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use log::warn;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// The current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a fixed instant, advanced explicitly.
///
/// Used by TTL-expiry and market-session tests to step time
/// deterministically.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Create a clock frozen at the given instant.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Move the clock to a new instant.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock() = now;
    }

    /// Advance the clock by the given duration.
    pub fn advance(&self, delta: chrono::Duration) {
        let mut now = self.lock();
        *now += delta;
    }

    fn lock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        self.now.lock().unwrap_or_else(|poisoned| {
            warn!("Fixed clock mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.lock()
    }
}
