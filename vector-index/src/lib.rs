//! Optional persistent nearest-neighbor index backed by Qdrant.
//!
//! The pipeline treats this as extra evidence for the duplicate classifier:
//! when configured, previously indexed items are queried by embedding and
//! merged into the locally computed matches. `Disabled` is a first-class
//! variant, not a null check.

pub mod errors;
pub mod facade;

pub use errors::{IndexError, IndexResult};
pub use facade::QdrantIndex;

use triage_core::{Item, NeighborHit};

/// Configuration for the Qdrant backend.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Qdrant HTTP endpoint, e.g. `http://localhost:6334`.
    pub url: String,
    /// Optional API key for Qdrant Cloud.
    pub api_key: Option<String>,
    /// Target collection name.
    pub collection: String,
    /// Dimensionality of stored vectors.
    pub dim: usize,
}

impl IndexConfig {
    /// Build from environment variables. Returns `None` when no endpoint is
    /// configured — the index is optional.
    pub fn from_env(dim: usize) -> Option<Self> {
        let url = std::env::var("TRIAGE_QDRANT_URL").ok()?;
        if url.trim().is_empty() {
            return None;
        }
        Some(Self {
            url,
            api_key: std::env::var("TRIAGE_QDRANT_API_KEY").ok(),
            collection: std::env::var("TRIAGE_QDRANT_COLLECTION")
                .unwrap_or_else(|_| "triage_items".to_string()),
            dim,
        })
    }

    pub fn validate(&self) -> IndexResult<()> {
        if self.url.trim().is_empty() {
            return Err(IndexError::Config("url is empty".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(IndexError::Config("collection is empty".into()));
        }
        if self.dim == 0 {
            return Err(IndexError::Config("dim must be > 0".into()));
        }
        Ok(())
    }
}

/// Neighbor source for the duplicate classifier (enum-dispatch).
pub enum NeighborSource {
    /// No external index configured; queries return nothing.
    Disabled,
    Qdrant(QdrantIndex),
}

impl NeighborSource {
    /// Build from environment: Qdrant when `TRIAGE_QDRANT_URL` is set,
    /// otherwise disabled.
    pub fn from_env(dim: usize) -> IndexResult<Self> {
        match IndexConfig::from_env(dim) {
            Some(cfg) => Ok(Self::Qdrant(QdrantIndex::new(&cfg)?)),
            None => Ok(Self::Disabled),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Qdrant(_))
    }

    pub async fn query(
        &self,
        embedding: Vec<f32>,
        threshold: f32,
        limit: u64,
        exclude_number: u64,
    ) -> IndexResult<Vec<NeighborHit>> {
        match self {
            Self::Disabled => Ok(Vec::new()),
            Self::Qdrant(idx) => idx.query(embedding, threshold, limit, exclude_number).await,
        }
    }

    pub async fn upsert_item(&self, item: &Item, embedding: Vec<f32>) -> IndexResult<()> {
        match self {
            Self::Disabled => Ok(()),
            Self::Qdrant(idx) => idx.upsert_item(item, embedding).await,
        }
    }
}
