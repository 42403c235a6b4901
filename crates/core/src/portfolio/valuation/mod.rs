//! Historical portfolio valuation.
//!
//! Reconstructs what the portfolio was worth at a past instant. Share
//! counts and cost basis come from the real ledger; per-share prices
//! before the most recent session are *simulated* (see
//! [`simulated_price`]), anchored to today's real price. Chart history
//! is therefore plausible, never genuine.

pub mod simulated_price;
pub mod valuation_engine;
pub mod valuation_model;


pub use valuation_engine::{snapshot_at, snapshot_now};
pub use valuation_model::{PortfolioSnapshot, PositionSnapshot};
