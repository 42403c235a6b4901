//! Normalized market-data models shared across providers.

mod previous_close;
mod quote;
mod search;
mod status;

pub use previous_close::{PreviousClose, SOURCE_ESTIMATE, SOURCE_FALLBACK};
pub use quote::MarketQuote;
pub use search::SymbolSearchResult;
pub use status::MarketStatus;
