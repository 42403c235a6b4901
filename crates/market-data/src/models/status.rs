//! Market open/closed status model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Exchange session state as of `last_updated`.
///
/// Exactly one of `next_open` / `next_close` is populated: the close when
/// the market is open, the open when it is closed. The conservative
/// fallback status carries neither.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketStatus {
    /// Whether the regular session is currently trading
    pub is_open: bool,

    /// Next session open, when the market is closed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_open: Option<DateTime<Utc>>,

    /// Today's session close, when the market is open
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_close: Option<DateTime<Utc>>,

    /// Timezone abbreviation in force at the exchange ("EST" or "EDT")
    pub timezone: String,

    /// When this status was computed
    pub last_updated: DateTime<Utc>,
}
