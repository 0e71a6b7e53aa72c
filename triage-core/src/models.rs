//! Normalized data model for items under triage and analysis results.
//!
//! An [`Item`] is a point-in-time snapshot of a pull request or an issue.
//! It is fetched once by the host client and never mutated by the engine;
//! every analysis stage reads it and produces its own result type.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of item being analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    PullRequest,
    Issue,
}

impl ItemKind {
    /// URL path segment used by the web UI ("pull" vs "issues").
    pub fn url_segment(self) -> &'static str {
        match self {
            Self::PullRequest => "pull",
            Self::Issue => "issues",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PullRequest => write!(f, "pull_request"),
            Self::Issue => write!(f, "issue"),
        }
    }
}

/// Identifier of an item inside one repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId {
    pub kind: ItemKind,
    pub number: u64,
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.number)
    }
}

/// Author of an item. Read-only input to the scorer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Author {
    pub username: String,
    pub avatar_url: Option<String>,
    pub contributions_count: u32,
    pub is_first_time: bool,
}

/// Immutable snapshot of a pull request or issue.
///
/// PR-only fields (`branch`, `base_branch`, `files_changed`, `additions`,
/// `deletions`, `is_draft`, `merged_at`, `review_comments_count`) are empty
/// or zero for issues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub kind: ItemKind,
    pub number: u64,
    /// Repository in "owner/name" form. Used for URL generation.
    pub repo: String,
    pub title: String,
    pub body: Option<String>,
    pub author: Author,
    /// Lifecycle state as reported by the host ("open", "closed", ...).
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,

    // Change footprint (PR only)
    pub branch: Option<String>,
    pub base_branch: Option<String>,
    pub files_changed: Vec<String>,
    pub additions: u64,
    pub deletions: u64,
    pub is_draft: bool,

    // Discussion volume
    pub comments_count: u32,
    pub review_comments_count: u32,
    pub reactions_count: u32,

    // Quality flags
    pub has_tests: bool,
    pub has_docs: bool,
    pub test_coverage: Option<f32>,

    pub labels: Vec<String>,
}

impl Item {
    pub fn id(&self) -> ItemId {
        ItemId {
            kind: self.kind,
            number: self.number,
        }
    }

    /// Canonical text used for embedding.
    ///
    /// Field order is fixed — title, description, changed files, labels —
    /// and changing it changes the resulting vector, so keep it stable.
    pub fn embedding_text(&self) -> String {
        format!(
            "Title: {}\nDescription: {}\nFiles changed: {}\nLabels: {}\n",
            self.title,
            self.body.as_deref().unwrap_or(""),
            self.files_changed.join(", "),
            self.labels.join(", "),
        )
    }

    /// Web URL of this item on the host.
    pub fn web_url(&self) -> String {
        format!(
            "https://github.com/{}/{}/{}",
            self.repo,
            self.kind.url_segment(),
            self.number
        )
    }

    /// Total changed lines (added + deleted).
    pub fn lines_changed(&self) -> u64 {
        self.additions + self.deletions
    }
}

/// A potential duplicate match. Lists are kept ordered descending by
/// similarity; matches are never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateMatch {
    pub number: u64,
    pub kind: ItemKind,
    /// Cosine similarity in [0, 1].
    pub similarity: f32,
    pub title: String,
    pub url: String,
    pub reason: String,
}

/// Result of duplicate classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupResult {
    pub is_duplicate: bool,
    /// Similarity of the best match, or 0.0 when nothing was retained.
    pub confidence: f32,
    pub canonical: Option<DuplicateMatch>,
    pub similar_items: Vec<DuplicateMatch>,
    pub summary: String,
}

/// Nearest-neighbor record supplied by an external vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborHit {
    pub number: u64,
    pub kind: ItemKind,
    pub score: f32,
    pub title: String,
    pub url: String,
}

/// Score breakdown for base-candidate detection. All components are in
/// [0, 1]; `total` is the configured weighted sum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BaseScore {
    pub chronological: f32,
    pub quality: f32,
    pub engagement: f32,
    pub author: f32,
    pub completeness: f32,
    pub total: f32,
}

/// Result of base-candidate detection for one target item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseResult {
    pub is_base_candidate: bool,
    pub score: BaseScore,
    pub reasoning: String,
    /// Every other member of the compared set, in ranked order.
    pub competing_prs: Vec<u64>,
    pub recommendation: String,
}

/// A single finding from the review analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewFinding {
    /// critical, high, medium, low, info
    #[serde(default)]
    pub severity: String,
    /// security, performance, style, logic, testing, docs
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub suggestion: Option<String>,
}

fn default_half() -> f32 {
    0.5
}

fn default_risk() -> String {
    "low".to_string()
}

fn default_vision_status() -> String {
    "needs_discussion".to_string()
}

/// Review analysis result. The pipeline treats this as opaque, already
/// validated evidence; defaults let a partially valid model response load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewReport {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub findings: Vec<ReviewFinding>,
    #[serde(default = "default_half")]
    pub overall_quality: f32,
    #[serde(default)]
    pub test_coverage_assessment: String,
    /// low, medium, high, critical, unknown
    #[serde(default = "default_risk")]
    pub security_risk: String,
    #[serde(default)]
    pub breaking_changes: Vec<String>,
    #[serde(default)]
    pub action_items: Vec<String>,
}

/// Vision-alignment result, also opaque to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionReport {
    #[serde(default = "default_half")]
    pub alignment_score: f32,
    /// aligned, needs_discussion, misaligned
    #[serde(default = "default_vision_status")]
    pub status: String,
    #[serde(default)]
    pub fits_vision: Vec<String>,
    #[serde(default)]
    pub concerns: Vec<String>,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub suggested_changes: Vec<String>,
}

/// Status of one pipeline invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriageStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

/// Maintainer-facing priority derived from combined evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Normal,
    High,
    Urgent,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Normal => write!(f, "normal"),
            Self::High => write!(f, "high"),
            Self::Urgent => write!(f, "urgent"),
        }
    }
}

/// Complete result of one triage run for one item. Created fresh per
/// invocation and discarded after consumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageOutcome {
    pub kind: ItemKind,
    pub number: u64,
    pub repo: String,

    pub status: TriageStatus,
    pub dedup: Option<DedupResult>,
    pub base: Option<BaseResult>,
    pub review: Option<ReviewReport>,
    pub vision: Option<VisionReport>,

    pub executive_summary: String,
    pub priority: Priority,
    pub recommended_action: String,

    pub analyzed_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub error: Option<String>,
    /// Non-terminal failures of individual stages. A stage failure never
    /// erases results already produced by earlier stages.
    pub stage_errors: Vec<String>,
}

impl TriageOutcome {
    /// Fresh in-progress outcome for an item about to be analyzed.
    pub fn started(kind: ItemKind, number: u64, repo: impl Into<String>) -> Self {
        Self {
            kind,
            number,
            repo: repo.into(),
            status: TriageStatus::InProgress,
            dedup: None,
            base: None,
            review: None,
            vision: None,
            executive_summary: String::new(),
            priority: Priority::Normal,
            recommended_action: String::new(),
            analyzed_at: Utc::now(),
            elapsed_ms: 0,
            error: None,
            stage_errors: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item() -> Item {
        Item {
            kind: ItemKind::PullRequest,
            number: 7,
            repo: "acme/widgets".into(),
            title: "Add retry logic".into(),
            body: Some("Retries transient failures".into()),
            author: Author {
                username: "alice".into(),
                ..Author::default()
            },
            state: "open".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            closed_at: None,
            merged_at: None,
            branch: Some("feature/retry".into()),
            base_branch: Some("main".into()),
            files_changed: vec!["src/net.rs".into(), "src/lib.rs".into()],
            additions: 120,
            deletions: 8,
            is_draft: false,
            comments_count: 0,
            review_comments_count: 0,
            reactions_count: 0,
            has_tests: true,
            has_docs: false,
            test_coverage: None,
            labels: vec!["networking".into()],
        }
    }

    #[test]
    fn embedding_text_field_order_is_stable() {
        let text = item().embedding_text();
        assert_eq!(
            text,
            "Title: Add retry logic\n\
             Description: Retries transient failures\n\
             Files changed: src/net.rs, src/lib.rs\n\
             Labels: networking\n"
        );
    }

    #[test]
    fn web_url_uses_kind_segment() {
        let pr = item();
        assert_eq!(pr.web_url(), "https://github.com/acme/widgets/pull/7");

        let mut issue = item();
        issue.kind = ItemKind::Issue;
        issue.number = 12;
        assert_eq!(issue.web_url(), "https://github.com/acme/widgets/issues/12");
    }
}
