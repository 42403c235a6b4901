//! Portfolio performance and historical valuation engine.
//!
//! Everything here is a pure (or dependency-injected) calculation over
//! asset ledgers: live holdings, reconstructed historical snapshots,
//! chart series per timeframe, and today's change against the previous
//! session close. Market access lives in `paperfolio-market-data`;
//! this crate consumes its gateway, resolver and market clock through
//! explicit constructor arguments.

pub mod assets;
pub mod errors;
pub mod portfolio;

pub use assets::{Asset, AssetCategory, Transaction, TransactionType};
pub use errors::{Error, Result, ValidationError};
pub use portfolio::holdings::{
    calculate_holding, calculate_portfolio, validate_sell, Holding, PortfolioTotals,
};
pub use portfolio::performance::{
    available_timeframes, generate, timeframe_performance, ChartDataPoint, Timeframe,
    TimeframePerformance,
};
pub use portfolio::today::{fallback_performance, TodayPerformance, TodayPerformanceCalculator};
pub use portfolio::valuation::{snapshot_at, snapshot_now, PortfolioSnapshot, PositionSnapshot};
