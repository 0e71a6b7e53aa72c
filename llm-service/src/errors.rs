//! Error type for the completion client.

use thiserror::Error;

pub type LlmResult<T> = Result<T, LlmError>;

#[derive(Debug, Error)]
pub enum LlmError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the provider.
    #[error("http status error: {0}")]
    HttpStatus(u16),

    /// Response arrived but did not have the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// No API key present for the selected provider.
    #[error("missing api key")]
    MissingApiKey,
}
