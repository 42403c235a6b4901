//! Error types for provider communication.
//!
//! Every variant is absorbed at the gateway/resolver boundary and converted
//! into a best-effort result (cached quote, estimate, or `None`); callers of
//! those services never see raw transport errors.

use thiserror::Error;

/// Errors that can occur while talking to a quote provider.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The provider was unreachable or the connection failed.
    /// Fall through to the next provider in the chain.
    #[error("Network failure: {provider} - {message}")]
    NetworkFailure {
        /// The provider that failed
        provider: String,
        /// Transport-level detail
        message: String,
    },

    /// The request exceeded the per-attempt timeout budget.
    /// Treated like a network failure: fall through, never retried on the
    /// same provider within one resolution.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The response body did not have the expected shape, or carried an
    /// explicit error flag. Treated identically to a network failure.
    #[error("Malformed response from {provider}: {message}")]
    DataFormat {
        /// The provider that returned the bad body
        provider: String,
        /// What was wrong with it
        message: String,
    },

    /// The local sliding-window counter pre-empted the call; it was skipped
    /// entirely, not attempted.
    #[error("Rate limit window exhausted: {provider}")]
    RateLimited {
        /// The provider whose window is full
        provider: String,
    },

    /// The provider flagged the request as rejected (bad symbol, quota
    /// exhausted server-side, HTTP error status).
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that rejected the request
        provider: String,
        /// The provider's own error detail
        message: String,
    },

    /// The operation is not offered by this provider.
    #[error("Operation not supported: {operation} ({provider})")]
    NotSupported {
        /// The operation that was requested
        operation: String,
        /// The provider it was requested from
        provider: String,
    },
}
