//! Thin adapter around `qdrant-client` to isolate API usage.
//!
//! All Qdrant interactions sit behind this facade so the rest of the
//! pipeline stays decoupled from the verbose builder API.

use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, Distance, Filter, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use tracing::{debug, info, warn};

use triage_core::{Item, ItemKind, NeighborHit};

use crate::errors::{IndexError, IndexResult};
use crate::IndexConfig;

pub struct QdrantIndex {
    client: Qdrant,
    collection: String,
    dim: usize,
}

impl QdrantIndex {
    pub fn new(cfg: &IndexConfig) -> IndexResult<Self> {
        cfg.validate()?;

        let mut builder = Qdrant::from_url(&cfg.url);
        if let Some(key) = &cfg.api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| IndexError::Qdrant(e.to_string()))?;

        Ok(Self {
            client,
            collection: cfg.collection.clone(),
            dim: cfg.dim,
        })
    }

    /// Ensure the collection exists; create it with a cosine vector space
    /// when missing.
    pub async fn ensure_collection(&self) -> IndexResult<()> {
        match self.client.collection_info(&self.collection).await {
            Ok(_) => {
                debug!("collection '{}' already exists", self.collection);
                return Ok(());
            }
            Err(err) => {
                warn!(
                    "collection '{}' not found, will be created (error={})",
                    self.collection, err
                );
            }
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(self.dim as u64, Distance::Cosine)),
            )
            .await
            .map_err(|e| IndexError::Qdrant(e.to_string()))?;

        info!("collection '{}' created", self.collection);
        Ok(())
    }

    /// Upsert one item's embedding with its lookup payload.
    ///
    /// GitHub issues and pull requests share one number sequence per
    /// repository, so the item number doubles as the point id.
    pub async fn upsert_item(&self, item: &Item, embedding: Vec<f32>) -> IndexResult<()> {
        let payload: Payload = serde_json::json!({
            "number": item.number,
            "kind": item.kind.to_string(),
            "title": item.title,
            "url": item.web_url(),
        })
        .try_into()
        .map_err(|e| IndexError::InvalidPayload(format!("{e:?}")))?;

        let point = PointStruct::new(item.number, embedding, payload);
        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, vec![point]))
            .await
            .map_err(|e| IndexError::Qdrant(e.to_string()))?;
        Ok(())
    }

    /// Nearest neighbors above `threshold`, excluding one item number.
    pub async fn query(
        &self,
        embedding: Vec<f32>,
        threshold: f32,
        limit: u64,
        exclude_number: u64,
    ) -> IndexResult<Vec<NeighborHit>> {
        let filter = Filter::must_not([Condition::matches(
            "number",
            exclude_number as i64,
        )]);

        let res = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, embedding, limit)
                    .filter(filter)
                    .score_threshold(threshold)
                    .with_payload(true),
            )
            .await
            .map_err(|e| IndexError::Qdrant(e.to_string()))?;

        let mut hits = Vec::with_capacity(res.result.len());
        for point in res.result {
            let get_str = |key: &str| {
                point
                    .payload
                    .get(key)
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string())
                    .unwrap_or_default()
            };
            let number = point
                .payload
                .get("number")
                .and_then(|v| v.as_integer())
                .ok_or_else(|| IndexError::InvalidPayload("missing number".into()))?;
            let kind = if get_str("kind") == "issue" {
                ItemKind::Issue
            } else {
                ItemKind::PullRequest
            };
            hits.push(NeighborHit {
                number: number as u64,
                kind,
                score: point.score,
                title: get_str("title"),
                url: get_str("url"),
            });
        }
        debug!("neighbor query returned {} hits", hits.len());
        Ok(hits)
    }
}
