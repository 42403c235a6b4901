//! Holdings output models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The live position derived from one asset's ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub asset_id: String,
    pub symbol: String,
    /// Net shares held, never negative
    pub total_shares: Decimal,
    /// Gross average: total buy cost over total shares ever bought,
    /// unaffected by sells
    pub average_buy_price: Decimal,
    /// `total_shares * current_price`
    pub current_value: Decimal,
    /// Current value minus the remaining cost basis
    pub gain_loss: Decimal,
    /// Percent of the remaining cost basis, zero when the basis is zero
    pub gain_loss_percentage: Decimal,
}

/// Whole-portfolio aggregate of the per-asset holdings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotals {
    pub total_value: Decimal,
    /// Sum of remaining cost bases (`shares * average_buy_price`)
    pub total_investment: Decimal,
    pub total_gain_loss: Decimal,
    pub total_gain_loss_percentage: Decimal,
}

impl PortfolioTotals {
    pub fn zero() -> Self {
        Self {
            total_value: Decimal::ZERO,
            total_investment: Decimal::ZERO,
            total_gain_loss: Decimal::ZERO,
            total_gain_loss_percentage: Decimal::ZERO,
        }
    }
}
