//! Pipeline-level error hierarchy.
//!
//! A single root error wrapping each collaborator's error type with
//! transparent `From` impls for `?` ergonomics. Note that
//! [`TriagePipeline::run`](crate::TriagePipeline::run) itself never
//! returns an error — failures are represented inside the outcome.

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Code-host failure (fetch/list/diff/comment).
    #[error(transparent)]
    Host(#[from] git_host::HostError),

    /// Decision-engine failure (embedding backend).
    #[error(transparent)]
    Engine(#[from] triage_engine::EngineError),

    /// Neighbor-index failure.
    #[error(transparent)]
    Index(#[from] vector_index::IndexError),

    /// Rejected configuration (out-of-range weights or thresholds).
    #[error(transparent)]
    Config(#[from] triage_core::ConfigError),
}
