//! Asset and transaction domain models.

pub mod assets_model;


pub use assets_model::{Asset, AssetCategory, Transaction, TransactionType};
