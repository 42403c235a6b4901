//! Valuation output models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One asset's reconstructed position inside a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSnapshot {
    pub asset_id: String,
    pub shares: Decimal,
    pub value: Decimal,
}

/// The whole portfolio reconstructed at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub date: NaiveDate,
    pub total_value: Decimal,
    /// Remaining cost basis under the weighted-average sell rule
    pub total_investment: Decimal,
    pub gain_loss_percentage: Decimal,
    pub positions: Vec<PositionSnapshot>,
}

impl PortfolioSnapshot {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total_value: Decimal::ZERO,
            total_investment: Decimal::ZERO,
            gain_loss_percentage: Decimal::ZERO,
            positions: Vec::new(),
        }
    }
}
