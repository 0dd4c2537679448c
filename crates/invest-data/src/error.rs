//! Error types for market data access

use thiserror::Error;

/// Failures fetching or decoding provider data
#[derive(Debug, Error)]
pub enum DataError {
    /// The provider does not know the symbol, or returned an empty payload for it
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// The provider throttled the request
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded { provider: String },

    /// The provider could not be reached or answered with an error
    #[error("{provider} unavailable: {reason}")]
    UpstreamUnavailable { provider: String, reason: String },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The payload did not have the expected shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider data failed validation when assembled into a snapshot
    #[error(transparent)]
    Metrics(#[from] invest_metrics::MetricsError),
}

/// Result type alias for data operations
pub type Result<T> = std::result::Result<T, DataError>;

impl DataError {
    pub fn upstream(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    pub fn unavailable(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }

    /// Transient failures worth another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DataError::RateLimitExceeded { .. }
                | DataError::UpstreamUnavailable { .. }
                | DataError::Network(_)
        )
    }
}
