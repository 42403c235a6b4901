//! Portfolio calculations: holdings, historical valuation, performance
//! series, and today's change.

pub mod holdings;
pub mod performance;
pub mod today;
pub mod valuation;
