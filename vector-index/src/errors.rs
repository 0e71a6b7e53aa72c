//! Error type for the neighbor index.

use thiserror::Error;

pub type IndexResult<T> = Result<T, IndexError>;

#[derive(Debug, Error)]
pub enum IndexError {
    /// Anything surfaced by the Qdrant client (transport, server, schema).
    #[error("qdrant error: {0}")]
    Qdrant(String),

    /// Index configuration problems (empty URL/collection, zero dim).
    #[error("index config error: {0}")]
    Config(String),

    /// A stored payload did not have the expected shape.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}
