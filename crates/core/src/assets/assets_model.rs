//! Asset domain models.
//!
//! The engine reads assets and their transaction ledgers; persistence
//! belongs to whatever store feeds them in. Ledger rows are immutable
//! once recorded, so every calculation is a fold over `transactions`.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ValidationError;

/// Asset classification, used to pick a volatility band when simulating
/// historical prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetCategory {
    Stocks,
    Gold,
    ForeignCurrency,
    MutualFunds,
    Cryptocurrency,
}

/// Direction of a ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Buy,
    Sell,
}

/// One immutable ledger row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub asset_id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Number of shares/units, always positive
    pub amount: Decimal,
    /// Per-share price at execution, always positive
    pub price: Decimal,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Transaction {
    pub fn new(
        asset_id: impl Into<String>,
        kind: TransactionType,
        amount: Decimal,
        price: Decimal,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            asset_id: asset_id.into(),
            kind,
            amount,
            price,
            date,
            notes: None,
        }
    }

    /// Reject rows that could corrupt every downstream fold.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount(self.amount));
        }
        if self.price <= Decimal::ZERO {
            return Err(ValidationError::NonPositivePrice(self.price));
        }
        Ok(())
    }
}

/// An asset plus its full transaction history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub category: AssetCategory,
    /// Latest known market price per share
    pub current_price: Decimal,
    pub transactions: Vec<Transaction>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        category: AssetCategory,
        current_price: Decimal,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            symbol: symbol.into().to_uppercase(),
            category,
            current_price,
            transactions: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Transactions in chronological order. Ledger rows may arrive in
    /// any order; folds that care about sequencing go through this.
    pub fn sorted_transactions(&self) -> Vec<&Transaction> {
        let mut sorted: Vec<&Transaction> = self.transactions.iter().collect();
        sorted.sort_by_key(|t| t.date);
        sorted
    }

    /// Net shares currently held, clamped at zero.
    pub fn shares_held(&self) -> Decimal {
        let net = self.transactions.iter().fold(Decimal::ZERO, |acc, t| match t.kind {
            TransactionType::Buy => acc + t.amount,
            TransactionType::Sell => acc - t.amount,
        });
        net.max(Decimal::ZERO)
    }

    /// Date of the first ledger row, if any.
    pub fn earliest_transaction_date(&self) -> Option<NaiveDate> {
        self.transactions.iter().map(|t| t.date).min()
    }
}
