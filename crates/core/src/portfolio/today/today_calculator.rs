//! Today's performance, priced with real data only.
//!
//! This is the one lookback the engine refuses to simulate. The end of
//! the comparison is the latest real quote (which, when the market is
//! closed, *is* the last session close), and the start is the previous
//! session close fetched through the resolver. When the resolver had to
//! estimate any close, the result is flagged `degraded` so the caller
//! can signal reduced confidence.

use std::sync::Arc;

use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use paperfolio_market_data::{MarketClock, PreviousCloseResolver};

use crate::assets::Asset;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// The estimate applied by [`fallback_performance`]: assume the
/// portfolio was 0.5% cheaper yesterday.
const FALLBACK_HAIRCUT: Decimal = dec!(0.995);

/// Today's change of the whole portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayPerformance {
    pub change: Decimal,
    pub change_percentage: Decimal,
    /// Portfolio value at the previous session close
    pub start_value: Decimal,
    /// Portfolio value now (or at the last close, when closed)
    pub current_value: Decimal,
    pub market_open: bool,
    /// True when any previous close had to be estimated
    pub degraded: bool,
}

impl TodayPerformance {
    fn flat() -> Self {
        Self {
            change: Decimal::ZERO,
            change_percentage: Decimal::ZERO,
            start_value: Decimal::ZERO,
            current_value: Decimal::ZERO,
            market_open: false,
            degraded: false,
        }
    }
}

pub struct TodayPerformanceCalculator {
    market_clock: Arc<MarketClock>,
    resolver: Arc<PreviousCloseResolver>,
}

impl TodayPerformanceCalculator {
    pub fn new(market_clock: Arc<MarketClock>, resolver: Arc<PreviousCloseResolver>) -> Self {
        Self {
            market_clock,
            resolver,
        }
    }

    /// Compute today's change for the portfolio.
    pub async fn calculate(&self, assets: &[Asset]) -> TodayPerformance {
        let positions = held_positions(assets);
        if positions.is_empty() {
            return TodayPerformance::flat();
        }

        let market_open = self.market_clock.is_open();

        // End of the comparison: shares at the latest real price. With
        // the market closed that price is the last session close.
        let current_value: Decimal = positions.iter().map(|(_, shares, price)| shares * price).sum();

        let requests: Vec<(String, Decimal)> = positions
            .iter()
            .map(|(symbol, _, price)| (symbol.clone(), *price))
            .collect();
        let closes = self.resolver.resolve_batch(&requests, market_open).await;

        let mut start_value = Decimal::ZERO;
        let mut degraded = false;
        for (symbol, shares, price) in &positions {
            match closes.get(symbol) {
                Some(close) => {
                    start_value += shares * close.previous_close;
                    degraded |= close.is_estimate();
                }
                None => {
                    // The resolver guarantees an entry per symbol; keep
                    // the arithmetic defined anyway.
                    start_value += shares * price * FALLBACK_HAIRCUT;
                    degraded = true;
                }
            }
        }

        let change = current_value - start_value;
        let change_percentage = if start_value > Decimal::ZERO {
            change / start_value * HUNDRED
        } else {
            Decimal::ZERO
        };

        debug!(
            "today performance: start={} current={} open={} degraded={}",
            start_value, current_value, market_open, degraded
        );

        TodayPerformance {
            change,
            change_percentage,
            start_value,
            current_value,
            market_open,
            degraded,
        }
    }
}

/// Pure no-data fallback: yesterday's value assumed 0.5% below today's.
/// This is what the resolver's estimates reduce to when it has nothing
/// better, kept callable on its own for offline use.
pub fn fallback_performance(assets: &[Asset]) -> TodayPerformance {
    let positions = held_positions(assets);
    if positions.is_empty() {
        return TodayPerformance::flat();
    }

    let current_value: Decimal = positions.iter().map(|(_, shares, price)| shares * price).sum();
    let start_value = current_value * FALLBACK_HAIRCUT;
    let change = current_value - start_value;
    let change_percentage = if start_value > Decimal::ZERO {
        change / start_value * HUNDRED
    } else {
        Decimal::ZERO
    };

    TodayPerformance {
        change,
        change_percentage,
        start_value,
        current_value,
        market_open: false,
        degraded: true,
    }
}

/// (symbol, shares, current price) for every asset actually held. The
/// symbol is trimmed and uppercased here so it matches the resolver's
/// map keys even for assets deserialized with a lowercase symbol.
fn held_positions(assets: &[Asset]) -> Vec<(String, Decimal, Decimal)> {
    assets
        .iter()
        .filter_map(|asset| {
            let shares = asset.shares_held();
            if shares > Decimal::ZERO {
                Some((
                    asset.symbol.trim().to_uppercase(),
                    shares,
                    asset.current_price,
                ))
            } else {
                None
            }
        })
        .collect()
}
