//! LLM-related error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API key not configured for {provider}")]
    ApiKeyNotConfigured { provider: String },

    #[error("API request failed: {0}")]
    ApiRequestFailed(String),

    #[error("rate limit exceeded, retry after {retry_after_secs} seconds")]
    RateLimitExceeded { retry_after_secs: u64 },

    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("connection error: {0}")]
    ConnectionError(String),

    #[error("request timed out")]
    Timeout,

    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("streaming error: {0}")]
    StreamingError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl LlmError {
    /// Whether this error is transient and worth retrying: rate-limit,
    /// service-unavailable, connection error, or timeout. Authentication
    /// and malformed-request errors are never retried.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LlmError::RateLimitExceeded { .. }
                | LlmError::ServiceUnavailable(_)
                | LlmError::ConnectionError(_)
                | LlmError::Timeout
        ) || self.http_error_is_transient()
    }

    fn http_error_is_transient(&self) -> bool {
        match self {
            LlmError::HttpError(e) => e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| {
                s.as_u16() == 429 || s.is_server_error()
            }),
            _ => false,
        }
    }
}

pub type LlmResult<T> = Result<T, LlmError>;
