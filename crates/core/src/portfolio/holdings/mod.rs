//! Real-time holdings derived from transaction ledgers.

pub mod holdings_calculator;
pub mod holdings_model;


pub use holdings_calculator::{calculate_holding, calculate_portfolio, validate_sell};
pub use holdings_model::{Holding, PortfolioTotals};
