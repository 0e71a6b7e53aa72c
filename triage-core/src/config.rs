//! Runtime configuration for all triage components.
//!
//! Every component takes its config explicitly at construction — there is no
//! process-wide settings singleton. All knobs have defaults and can be
//! overridden through `TRIAGE_*` environment variables; `validate()` rejects
//! out-of-range values eagerly so bad thresholds never reach the engine.

use std::str::FromStr;

use thiserror::Error;

/// Configuration problems detected at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid threshold: {0}")]
    InvalidThreshold(String),

    #[error("invalid weight: {0}")]
    InvalidWeight(String),

    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Knobs for the duplicate classifier and its similarity index.
#[derive(Debug, Clone)]
pub struct DedupConfig {
    /// Cosine similarity at or above which the top match makes the target a
    /// duplicate.
    pub duplicate_threshold: f32,
    /// Retention bar for "similar but not duplicate" matches. Always at or
    /// below `duplicate_threshold`.
    pub near_duplicate_threshold: f32,
    /// Limit for external nearest-neighbor queries.
    pub max_candidates: u64,
    /// Dimensionality of the embedding space.
    pub embedding_dim: usize,
    /// Capacity of the bounded embedding cache (entries).
    pub cache_capacity: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        let duplicate_threshold = 0.85;
        Self {
            duplicate_threshold,
            near_duplicate_threshold: duplicate_threshold - 0.10,
            max_candidates: 10,
            embedding_dim: 512,
            cache_capacity: 2048,
        }
    }
}

impl DedupConfig {
    /// Build from environment variables with defaults. The near threshold
    /// defaults to `duplicate_threshold - 0.10` unless set explicitly.
    pub fn from_env() -> Self {
        let duplicate_threshold = parse("TRIAGE_DEDUP_THRESHOLD", 0.85f32);
        Self {
            duplicate_threshold,
            near_duplicate_threshold: parse(
                "TRIAGE_DEDUP_NEAR_THRESHOLD",
                duplicate_threshold - 0.10,
            ),
            max_candidates: parse("TRIAGE_DEDUP_MAX_CANDIDATES", 10),
            embedding_dim: parse("TRIAGE_EMBED_DIM", 512usize),
            cache_capacity: parse("TRIAGE_EMBED_CACHE_CAP", 2048usize),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, v) in [
            ("duplicate_threshold", self.duplicate_threshold),
            ("near_duplicate_threshold", self.near_duplicate_threshold),
        ] {
            if !(0.0..=1.0).contains(&v) || !v.is_finite() {
                return Err(ConfigError::InvalidThreshold(format!("{name}={v}")));
            }
        }
        if self.near_duplicate_threshold > self.duplicate_threshold {
            return Err(ConfigError::InvalidThreshold(format!(
                "near_duplicate_threshold {} exceeds duplicate_threshold {}",
                self.near_duplicate_threshold, self.duplicate_threshold
            )));
        }
        if self.embedding_dim == 0 {
            return Err(ConfigError::InvalidValue("embedding_dim must be > 0".into()));
        }
        if self.cache_capacity == 0 {
            return Err(ConfigError::InvalidValue(
                "cache_capacity must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Signal weights and thresholds for base-candidate detection.
///
/// Weights are not required to sum to 1.0; the total is simply the weighted
/// sum of the five component scores.
#[derive(Debug, Clone)]
pub struct BaseDetectionConfig {
    pub weight_chronological: f32,
    pub weight_quality: f32,
    pub weight_engagement: f32,
    pub weight_author: f32,
    pub weight_completeness: f32,
    /// Minimum total score required to be named base candidate even when
    /// ranked first.
    pub min_quality_score: f32,
    /// Expected coverage fraction; reported coverage is scored against this.
    pub min_test_coverage: f32,
}

impl Default for BaseDetectionConfig {
    fn default() -> Self {
        Self {
            weight_chronological: 0.25,
            weight_quality: 0.30,
            weight_engagement: 0.20,
            weight_author: 0.15,
            weight_completeness: 0.10,
            min_quality_score: 0.6,
            min_test_coverage: 0.5,
        }
    }
}

impl BaseDetectionConfig {
    pub fn from_env() -> Self {
        Self {
            weight_chronological: parse("TRIAGE_BASE_WEIGHT_CHRONOLOGICAL", 0.25f32),
            weight_quality: parse("TRIAGE_BASE_WEIGHT_QUALITY", 0.30f32),
            weight_engagement: parse("TRIAGE_BASE_WEIGHT_ENGAGEMENT", 0.20f32),
            weight_author: parse("TRIAGE_BASE_WEIGHT_AUTHOR", 0.15f32),
            weight_completeness: parse("TRIAGE_BASE_WEIGHT_COMPLETENESS", 0.10f32),
            min_quality_score: parse("TRIAGE_BASE_MIN_QUALITY", 0.6f32),
            min_test_coverage: parse("TRIAGE_BASE_MIN_COVERAGE", 0.5f32),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, w) in [
            ("weight_chronological", self.weight_chronological),
            ("weight_quality", self.weight_quality),
            ("weight_engagement", self.weight_engagement),
            ("weight_author", self.weight_author),
            ("weight_completeness", self.weight_completeness),
        ] {
            if w < 0.0 || !w.is_finite() {
                return Err(ConfigError::InvalidWeight(format!("{name}={w}")));
            }
        }
        if !(0.0..=1.0).contains(&self.min_quality_score) {
            return Err(ConfigError::InvalidThreshold(format!(
                "min_quality_score={}",
                self.min_quality_score
            )));
        }
        if self.min_test_coverage <= 0.0 || self.min_test_coverage > 1.0 {
            return Err(ConfigError::InvalidThreshold(format!(
                "min_test_coverage={}",
                self.min_test_coverage
            )));
        }
        Ok(())
    }
}

/// Knobs for the review analyzer.
#[derive(Debug, Clone)]
pub struct ReviewConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Diff content passed to the model is truncated to this many chars.
    pub max_diff_chars: usize,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            model: "claude-3-5-sonnet-20241022".into(),
            max_tokens: 4000,
            temperature: 0.1,
            max_diff_chars: 8000,
        }
    }
}

impl ReviewConfig {
    pub fn from_env() -> Self {
        Self {
            model: env("TRIAGE_REVIEW_MODEL", "claude-3-5-sonnet-20241022"),
            max_tokens: parse("TRIAGE_REVIEW_MAX_TOKENS", 4000u32),
            temperature: parse("TRIAGE_REVIEW_TEMPERATURE", 0.1f32),
            max_diff_chars: parse("TRIAGE_REVIEW_MAX_DIFF_CHARS", 8000usize),
        }
    }
}

/// Knobs for the vision-alignment analyzer.
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// Path to the project vision document.
    pub vision_doc_path: String,
    /// At or above this alignment score the item counts as aligned.
    pub alignment_threshold: f32,
    /// At or below this alignment score the item counts as misaligned.
    pub auto_reject_threshold: f32,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            vision_doc_path: "./VISION.md".into(),
            alignment_threshold: 0.7,
            auto_reject_threshold: 0.3,
            max_tokens: 2000,
            temperature: 0.1,
        }
    }
}

impl VisionConfig {
    pub fn from_env() -> Self {
        Self {
            vision_doc_path: env("TRIAGE_VISION_DOC", "./VISION.md"),
            alignment_threshold: parse("TRIAGE_VISION_ALIGNMENT_THRESHOLD", 0.7f32),
            auto_reject_threshold: parse("TRIAGE_VISION_REJECT_THRESHOLD", 0.3f32),
            max_tokens: parse("TRIAGE_VISION_MAX_TOKENS", 2000u32),
            temperature: parse("TRIAGE_VISION_TEMPERATURE", 0.1f32),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, v) in [
            ("alignment_threshold", self.alignment_threshold),
            ("auto_reject_threshold", self.auto_reject_threshold),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(ConfigError::InvalidThreshold(format!("{name}={v}")));
            }
        }
        if self.auto_reject_threshold > self.alignment_threshold {
            return Err(ConfigError::InvalidThreshold(format!(
                "auto_reject_threshold {} exceeds alignment_threshold {}",
                self.auto_reject_threshold, self.alignment_threshold
            )));
        }
        Ok(())
    }
}

/// Top-level configuration bag for one pipeline instance.
#[derive(Debug, Clone)]
pub struct TriageConfig {
    pub dedup: DedupConfig,
    pub base: BaseDetectionConfig,
    pub review: ReviewConfig,
    pub vision: VisionConfig,
    /// Page size when listing recent open items as the candidate pool.
    pub candidate_page_size: u32,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            dedup: DedupConfig::default(),
            base: BaseDetectionConfig::default(),
            review: ReviewConfig::default(),
            vision: VisionConfig::default(),
            candidate_page_size: 50,
        }
    }
}

impl TriageConfig {
    pub fn from_env() -> Self {
        Self {
            dedup: DedupConfig::from_env(),
            base: BaseDetectionConfig::from_env(),
            review: ReviewConfig::from_env(),
            vision: VisionConfig::from_env(),
            candidate_page_size: parse("TRIAGE_CANDIDATE_PAGE_SIZE", 50u32),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.dedup.validate()?;
        self.base.validate()?;
        self.vision.validate()?;
        if self.candidate_page_size == 0 {
            return Err(ConfigError::InvalidValue(
                "candidate_page_size must be > 0".into(),
            ));
        }
        Ok(())
    }
}

fn env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse<T: FromStr + Copy>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
