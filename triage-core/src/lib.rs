//! Shared data model and configuration for the triage pipeline.
//!
//! These types are the normalized input/output of every stage: items fetched
//! from the code host, classifier/scorer results, analyzer reports, and the
//! final per-item outcome. Downstream crates (engine, analyzers, pipeline)
//! all speak in terms of this crate and nothing else.

pub mod config;
pub mod models;

pub use config::{
    BaseDetectionConfig, ConfigError, DedupConfig, ReviewConfig, TriageConfig, VisionConfig,
};
pub use models::*;
