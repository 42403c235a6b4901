//! Core error types for the valuation engine.
//!
//! Market-data transport failures are absorbed inside the gateway and
//! resolver and never surface here; what does propagate is input
//! validation, which callers are expected to show to the user.

use rust_decimal::Decimal;
use thiserror::Error;

pub use paperfolio_market_data::MarketDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Rejections of user-supplied ledger input. The ledger is never
/// modified when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Amount must be greater than zero, got {0}")]
    NonPositiveAmount(Decimal),

    #[error("Price must be greater than zero, got {0}")]
    NonPositivePrice(Decimal),

    #[error("Cannot sell {requested} shares, only {available} held")]
    InsufficientShares {
        requested: Decimal,
        available: Decimal,
    },
}
