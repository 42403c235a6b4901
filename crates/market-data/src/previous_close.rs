//! Previous-close resolution.
//!
//! Today's gain needs yesterday's closing price, and no single free
//! provider serves it reliably. The resolver walks the providers that
//! can answer, in priority order, and when all of them fail it
//! estimates the close from the current price instead of failing the
//! caller: a slightly wrong baseline beats an empty dashboard, and the
//! source string lets the caller flag the number as degraded.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use log::{debug, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::clock::Clock;
use crate::constants::{BATCH_DELAY, CLOSE_BATCH_SIZE};
use crate::models::{PreviousClose, SOURCE_ESTIMATE, SOURCE_FALLBACK};
use crate::registry::ProviderRegistry;

/// Haircut applied when estimating the close during market hours: the
/// price has had little time to drift from the open.
const OPEN_ESTIMATE_FACTOR: Decimal = dec!(0.998);
/// Haircut applied after hours, when a full session separates the
/// current price from the prior close.
const CLOSED_ESTIMATE_FACTOR: Decimal = dec!(0.995);

pub struct PreviousCloseResolver {
    registry: Arc<ProviderRegistry>,
    clock: Arc<dyn Clock>,
}

impl PreviousCloseResolver {
    pub fn new(registry: Arc<ProviderRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    /// Resolve the previous close for one symbol. Never fails: when the
    /// provider chain comes up empty the close is estimated from
    /// `current_price`.
    pub async fn resolve(
        &self,
        symbol: &str,
        current_price: Decimal,
        market_open: bool,
    ) -> PreviousClose {
        let symbol = symbol.trim().to_uppercase();

        for provider in self.registry.previous_close_capable() {
            if !self.registry.rate_limiter().try_acquire(provider.id()) {
                debug!("{} budget spent, skipping close for {}", provider.id(), symbol);
                continue;
            }

            let attempt =
                tokio::time::timeout(provider.timeout(), provider.previous_close(&symbol)).await;
            match attempt {
                Ok(Ok(close)) if close.previous_close > Decimal::ZERO => {
                    debug!("{} close for {}: {}", provider.id(), symbol, close.previous_close);
                    return close;
                }
                Ok(Ok(_)) => {
                    warn!("{} returned non-positive close for {}", provider.id(), symbol);
                }
                Ok(Err(e)) => {
                    warn!("{} close failed for {}: {}", provider.id(), symbol, e);
                }
                Err(_) => {
                    warn!("{} close timed out for {}", provider.id(), symbol);
                }
            }
        }

        self.estimate(&symbol, current_price, market_open)
    }

    /// Estimate the close from the current price. During market hours
    /// the price has drifted less from the prior close than after a full
    /// session, so the haircut is smaller.
    fn estimate(&self, symbol: &str, current_price: Decimal, market_open: bool) -> PreviousClose {
        let date = (self.clock.now() - chrono::Duration::days(1)).date_naive();

        if current_price <= Decimal::ZERO {
            // Nothing to estimate from. Echo the input so the caller's
            // arithmetic stays finite.
            return PreviousClose {
                symbol: symbol.to_string(),
                previous_close: current_price,
                current_price,
                date,
                source: SOURCE_FALLBACK.to_string(),
            };
        }

        let factor = if market_open {
            OPEN_ESTIMATE_FACTOR
        } else {
            CLOSED_ESTIMATE_FACTOR
        };

        PreviousClose {
            symbol: symbol.to_string(),
            previous_close: current_price * factor,
            current_price,
            date,
            source: SOURCE_ESTIMATE.to_string(),
        }
    }

    /// Resolve previous closes for a whole portfolio. Symbols run in
    /// small concurrent batches with a pause between batches. The result
    /// holds exactly one entry per distinct input symbol; per-symbol
    /// failure is impossible because [`resolve`](Self::resolve) degrades
    /// to an estimate.
    pub async fn resolve_batch(
        &self,
        assets: &[(String, Decimal)],
        market_open: bool,
    ) -> HashMap<String, PreviousClose> {
        let mut closes = HashMap::with_capacity(assets.len());

        for (index, batch) in assets.chunks(CLOSE_BATCH_SIZE).enumerate() {
            if index > 0 {
                tokio::time::sleep(BATCH_DELAY).await;
            }

            let results = join_all(
                batch
                    .iter()
                    .map(|(symbol, price)| self.resolve(symbol, *price, market_open)),
            )
            .await;

            for close in results {
                closes.insert(close.symbol.clone(), close);
            }
        }

        closes
    }
}
