//! Provider credentials and endpoint configuration.

use std::env;

/// API keys for the keyed providers. Yahoo's chart endpoint is public and
/// needs none.
#[derive(Clone, Debug, Default)]
pub struct ProviderSettings {
    /// Alpha Vantage API key (`ALPHA_VANTAGE_API_KEY`)
    pub alpha_vantage_api_key: Option<String>,
    /// Finnhub API token (`FINNHUB_API_KEY`)
    pub finnhub_api_key: Option<String>,
    /// Twelve Data API key (`TWELVE_DATA_API_KEY`)
    pub twelve_data_api_key: Option<String>,
}

impl ProviderSettings {
    /// Read keys from the environment. Missing variables leave the
    /// corresponding provider out of the chain rather than failing.
    pub fn from_env() -> Self {
        Self {
            alpha_vantage_api_key: read_var("ALPHA_VANTAGE_API_KEY"),
            finnhub_api_key: read_var("FINNHUB_API_KEY"),
            twelve_data_api_key: read_var("TWELVE_DATA_API_KEY"),
        }
    }
}

fn read_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_keys() {
        let settings = ProviderSettings::default();
        assert!(settings.alpha_vantage_api_key.is_none());
        assert!(settings.finnhub_api_key.is_none());
        assert!(settings.twelve_data_api_key.is_none());
    }
}
