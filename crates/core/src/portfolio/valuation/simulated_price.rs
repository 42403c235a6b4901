//! Deterministic historical price simulation.
//!
//! There is no genuine price history behind multi-day charts; instead a
//! past price is synthesized from today's real price. The synthesis is
//! a pure function of (symbol, category, current price, portfolio
//! return, days back), so charts are stable across renders, and it is
//! never used where real data exists (the one-day lookback path goes
//! through the previous-close resolver instead).
//!
//! This is the one place the engine leaves `Decimal`: the formula is
//! transcendental (`sin`, `powf`, `sqrt`), so the interior runs in
//! `f64` and converts back at the boundary.

use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::assets::AssetCategory;

/// Assumed daily volatility per asset category.
pub fn daily_volatility(category: AssetCategory) -> f64 {
    match category {
        AssetCategory::Cryptocurrency => 0.05,
        AssetCategory::Stocks => 0.025,
        AssetCategory::MutualFunds => 0.02,
        AssetCategory::Gold => 0.015,
        AssetCategory::ForeignCurrency => 0.01,
    }
}

/// Synthesize the price of `symbol` as of `days_back` days ago.
///
/// The current price is walked backwards along a trend that compounds
/// the portfolio's present-day return (`overall_gain_percentage`, e.g.
/// `12.5` for +12.5%) daily, then perturbed by a symbol-seeded periodic
/// wobble scaled by the category's volatility and `sqrt(days_back)`.
/// `days_back == 0` returns `current_price` exactly.
pub fn simulated_price(
    symbol: &str,
    category: AssetCategory,
    current_price: Decimal,
    overall_gain_percentage: Decimal,
    days_back: f64,
) -> Decimal {
    if days_back <= 0.0 {
        return current_price;
    }

    let current = match current_price.to_f64() {
        Some(v) if v.is_finite() => v,
        _ => return current_price,
    };

    // Symbol-seeded wobble in [0, 1], periodic in days so neighbouring
    // points drift rather than jump.
    let seed: f64 = symbol.bytes().map(f64::from).sum();
    let random = (seed + days_back / 10.0).sin() * 0.5 + 0.5;

    let overall_trend = overall_gain_percentage
        .to_f64()
        .unwrap_or(0.0)
        / 100.0;
    let trend_factor = (1.0 + overall_trend / 365.0).powf(days_back);
    let volatility =
        1.0 + (random - 0.5) * daily_volatility(category) * days_back.sqrt();

    let price = (current / trend_factor * volatility).max(0.0);
    Decimal::from_f64(price).unwrap_or(current_price)
}
