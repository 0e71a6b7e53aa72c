//! Text embeddings and cosine similarity with a bounded cache.
//!
//! Two backends sit behind [`Embedder`]: a deterministic local
//! feature-hashing embedder (no network, always available) and a remote
//! Ollama embedder. Vectors are memoized by SHA-256 content hash in a
//! size-capped LRU so repeated candidates embed once per run — safe under
//! concurrent use because identical text always embeds identically.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;
use sha2::{Digest, Sha256};
use tracing::{debug, trace};

use crate::errors::{EngineError, EngineResult};

/// Deterministic local embedder: feature-hashed bag of words.
///
/// Tokens are lowercased alphanumeric runs; each token hashes into one
/// bucket of a fixed-dimension count vector which is then L2-normalized.
/// Identical texts embed identically, and texts sharing no vocabulary land
/// in (almost certainly) disjoint buckets, so cosine similarity tracks
/// token overlap.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dim: usize,
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    pub fn embed(&self, text: &str) -> EngineResult<Vec<f32>> {
        let mut vec = vec![0.0f32; self.dim];
        let lower = text.to_lowercase();
        let mut tokens = 0usize;
        for tok in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let bucket = (fnv1a_64(tok.as_bytes()) % self.dim as u64) as usize;
            vec[bucket] += 1.0;
            tokens += 1;
        }
        if tokens == 0 {
            return Err(EngineError::Embedding("text has no tokens".into()));
        }
        normalize(&mut vec);
        Ok(vec)
    }
}

/// Remote Ollama embeddings client (`/api/embeddings`).
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    http: reqwest::Client,
    endpoint: String,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(http: reqwest::Client, endpoint: String, model: String) -> Self {
        Self {
            http,
            endpoint,
            model,
        }
    }

    pub async fn embed(&self, text: &str) -> EngineResult<Vec<f32>> {
        #[derive(serde::Serialize)]
        struct Req<'a> {
            model: &'a str,
            input: &'a str,
        }
        #[derive(serde::Deserialize)]
        struct Resp {
            embedding: Vec<f32>,
        }

        let url = format!("{}/api/embeddings", self.endpoint.trim_end_matches('/'));
        let resp = self
            .http
            .post(&url)
            .json(&Req {
                model: &self.model,
                input: text,
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(EngineError::HttpStatus(resp.status().as_u16()));
        }
        let body: Resp = resp.json().await?;
        if body.embedding.is_empty() {
            return Err(EngineError::Embedding("backend returned empty vector".into()));
        }
        Ok(body.embedding)
    }
}

/// Concrete embedding backend (enum-dispatch).
#[derive(Debug, Clone)]
pub enum Embedder {
    Hashing(HashingEmbedder),
    Ollama(OllamaEmbedder),
}

impl Embedder {
    /// Select a backend from the environment: `TRIAGE_EMBED_BACKEND=ollama`
    /// picks the remote backend (endpoint from `OLLAMA_URL`, model from
    /// `TRIAGE_EMBED_MODEL`); anything else uses local hashing.
    pub fn from_env(dim: usize) -> Self {
        let backend = std::env::var("TRIAGE_EMBED_BACKEND").unwrap_or_default();
        if backend == "ollama" {
            let endpoint = std::env::var("OLLAMA_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:11434".to_string());
            let model = std::env::var("TRIAGE_EMBED_MODEL")
                .unwrap_or_else(|_| "nomic-embed-text".to_string());
            debug!("embedder: ollama endpoint={endpoint} model={model}");
            return Self::Ollama(OllamaEmbedder::new(
                reqwest::Client::new(),
                endpoint,
                model,
            ));
        }
        debug!("embedder: local hashing dim={dim}");
        Self::Hashing(HashingEmbedder::new(dim))
    }

    pub async fn embed(&self, text: &str) -> EngineResult<Vec<f32>> {
        match self {
            Self::Hashing(e) => e.embed(text),
            Self::Ollama(e) => e.embed(text).await,
        }
    }
}

/// Embedding memoizer shared by all classifier calls.
pub struct SimilarityIndex {
    embedder: Embedder,
    cache: Mutex<LruCache<[u8; 32], Arc<Vec<f32>>>>,
}

impl SimilarityIndex {
    pub fn new(embedder: Embedder, cache_capacity: usize) -> Self {
        let cap = NonZeroUsize::new(cache_capacity.max(1)).expect("non-zero capacity");
        Self {
            embedder,
            cache: Mutex::new(LruCache::new(cap)),
        }
    }

    /// Embed `text`, deterministic per input, memoized by content hash.
    pub async fn embed(&self, text: &str) -> EngineResult<Arc<Vec<f32>>> {
        let key = content_key(text);
        if let Some(hit) = self.cache.lock().expect("embed cache poisoned").get(&key) {
            trace!("embed cache hit");
            return Ok(Arc::clone(hit));
        }
        let vec = Arc::new(self.embedder.embed(text).await?);
        self.cache
            .lock()
            .expect("embed cache poisoned")
            .put(key, Arc::clone(&vec));
        Ok(vec)
    }
}

/// Cosine similarity in [-1, 1]. Mismatched dimensions or a zero-norm
/// operand yield 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn content_key(text: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher.finalize().into()
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

fn normalize(vec: &mut [f32]) {
    let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vec.iter_mut() {
            *x /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> SimilarityIndex {
        SimilarityIndex::new(Embedder::Hashing(HashingEmbedder::new(512)), 64)
    }

    #[tokio::test]
    async fn identical_texts_embed_identically() {
        let idx = index();
        let a = idx.embed("add user authentication via oauth").await.unwrap();
        let b = idx.embed("add user authentication via oauth").await.unwrap();
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
        // Second call must come from the cache — same allocation.
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn similarity_is_symmetric() {
        let idx = index();
        let a = idx.embed("fix retry logic in network layer").await.unwrap();
        let b = idx.embed("rework network retry handling").await.unwrap();
        let ab = cosine_similarity(&a, &b);
        let ba = cosine_similarity(&b, &a);
        assert!((ab - ba).abs() < 1e-6);
    }

    #[tokio::test]
    async fn disjoint_vocabulary_scores_near_zero() {
        let idx = index();
        let a = idx.embed("oauth login authentication flow").await.unwrap();
        let b = idx.embed("responsive stylesheet mobile layout").await.unwrap();
        assert!(cosine_similarity(&a, &b) < 0.2);
    }

    #[tokio::test]
    async fn empty_text_is_an_error_not_a_zero_vector() {
        let idx = index();
        let err = idx.embed("  ---  ").await;
        assert!(matches!(err, Err(EngineError::Embedding(_))));
    }

    #[test]
    fn cosine_handles_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}
