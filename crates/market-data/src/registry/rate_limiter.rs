//! Sliding-window rate limiter for quote providers.
//!
//! Each provider gets its own window of recent request instants. A call is
//! admitted only if fewer than the provider's per-minute budget landed
//! inside the trailing window; otherwise the call is skipped outright —
//! the gateway moves on to the next provider instead of waiting, so
//! rate-limit budget is never burned by queued retries.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::constants::RATE_LIMIT_WINDOW;

/// Default budget when a provider has not been configured explicitly.
const DEFAULT_REQUESTS_PER_WINDOW: u32 = 60;

/// Rate limit configuration for a provider.
#[derive(Clone, Copy, Debug)]
pub struct RateLimitConfig {
    /// Maximum requests admitted per sliding window.
    pub requests_per_window: u32,
    /// Width of the sliding window.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_window: DEFAULT_REQUESTS_PER_WINDOW,
            window: RATE_LIMIT_WINDOW,
        }
    }
}

/// Request history for a single provider.
#[derive(Debug)]
struct SlidingWindow {
    timestamps: VecDeque<Instant>,
    config: RateLimitConfig,
}

impl SlidingWindow {
    fn new(config: RateLimitConfig) -> Self {
        Self {
            timestamps: VecDeque::new(),
            config,
        }
    }

    /// Drop request instants that have slid out of the window.
    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.timestamps.front() {
            if now.duration_since(oldest) >= self.config.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    fn try_admit(&mut self, now: Instant) -> bool {
        self.prune(now);
        if (self.timestamps.len() as u32) < self.config.requests_per_window {
            self.timestamps.push_back(now);
            true
        } else {
            false
        }
    }

    fn remaining(&mut self, now: Instant) -> u32 {
        self.prune(now);
        self.config
            .requests_per_window
            .saturating_sub(self.timestamps.len() as u32)
    }
}

/// Per-provider sliding-window limiter.
///
/// Windows are created on demand with default settings, or pre-configured
/// via [`configure`](Self::configure).
pub struct RateLimiter {
    windows: Mutex<HashMap<String, SlidingWindow>>,
    configs: Mutex<HashMap<String, RateLimitConfig>>,
}

impl RateLimiter {
    /// Create a limiter with no provider state.
    pub fn new() -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            configs: Mutex::new(HashMap::new()),
        }
    }

    /// Lock the windows mutex, recovering from poison if necessary.
    ///
    /// Worst case after recovery is slightly off rate accounting, which is
    /// preferable to panicking a fetch path.
    fn lock_windows(&self) -> MutexGuard<'_, HashMap<String, SlidingWindow>> {
        self.windows.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter windows mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn lock_configs(&self) -> MutexGuard<'_, HashMap<String, RateLimitConfig>> {
        self.configs.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter configs mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Set the budget for a provider, discarding any accumulated history.
    pub fn configure(&self, provider: &str, config: RateLimitConfig) {
        let mut configs = self.lock_configs();
        configs.insert(provider.to_string(), config);
        drop(configs);

        let mut windows = self.lock_windows();
        windows.remove(provider);
    }

    /// Try to admit one request for the provider right now.
    ///
    /// Returns false when the window is full; the caller skips the
    /// provider entirely.
    pub fn try_acquire(&self, provider: &str) -> bool {
        self.try_acquire_at(provider, Instant::now())
    }

    /// Requests still admissible in the current window.
    pub fn remaining(&self, provider: &str) -> u32 {
        let now = Instant::now();
        let mut windows = self.lock_windows();
        match windows.get_mut(provider) {
            Some(window) => window.remaining(now),
            None => self.config_for(provider).requests_per_window,
        }
    }

    /// Forget a provider's history, restoring its full budget.
    pub fn reset(&self, provider: &str) {
        let mut windows = self.lock_windows();
        windows.remove(provider);
    }

    fn try_acquire_at(&self, provider: &str, now: Instant) -> bool {
        let config = self.config_for(provider);
        let mut windows = self.lock_windows();
        let window = windows
            .entry(provider.to_string())
            .or_insert_with(|| SlidingWindow::new(config));

        let admitted = window.try_admit(now);
        if !admitted {
            debug!("Rate limiter: window full for '{}', skipping call", provider);
        }
        admitted
    }

    fn config_for(&self, provider: &str) -> RateLimitConfig {
        let configs = self.lock_configs();
        configs.get(provider).copied().unwrap_or_default()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
