//! Error type for the decision engine.

use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Embedding could not be computed. This is always surfaced — a zero
    /// vector substitute would bias similarity upward spuriously.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// Transport failure while talking to a remote embedding backend.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the embedding backend.
    #[error("http status error: {0}")]
    HttpStatus(u16),
}
