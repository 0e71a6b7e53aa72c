//! Decision engine: similarity index, duplicate classifier, base scorer.
//!
//! Everything here is a pure function of its inputs plus the shared
//! embedding cache; no stage mutates an item. Suspension points are
//! exclusively the embedding backend — classification and scoring are
//! synchronous and CPU-bound.

pub mod base;
pub mod dedup;
pub mod errors;
pub mod similarity;

pub use base::BaseCandidateScorer;
pub use dedup::DuplicateClassifier;
pub use errors::{EngineError, EngineResult};
pub use similarity::{cosine_similarity, Embedder, HashingEmbedder, OllamaEmbedder, SimilarityIndex};
