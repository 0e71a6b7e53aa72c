//! GitHub REST response shapes (subset of fields we actually use).

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct GhUser {
    pub login: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GhLabel {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct GhRef {
    #[serde(rename = "ref")]
    pub branch: String,
}

#[derive(Debug, Deserialize)]
pub struct GhPull {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub user: GhUser,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub draft: bool,
    pub head: GhRef,
    pub base: GhRef,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub comments: u32,
    #[serde(default)]
    pub review_comments: u32,
    #[serde(default)]
    pub labels: Vec<GhLabel>,
}

/// List endpoints return summary objects; only the number is needed since
/// each PR is re-fetched in full to populate the file list.
#[derive(Debug, Deserialize)]
pub struct GhPullSummary {
    pub number: u64,
}

#[derive(Debug, Deserialize)]
pub struct GhPullFile {
    pub filename: String,
}

#[derive(Debug, Deserialize)]
pub struct GhReactions {
    #[serde(default)]
    pub total_count: u32,
}

#[derive(Debug, Deserialize)]
pub struct GhIssue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub user: GhUser,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub comments: u32,
    #[serde(default)]
    pub reactions: Option<GhReactions>,
    #[serde(default)]
    pub labels: Vec<GhLabel>,
    /// Present when the "issue" is actually a pull request; such entries
    /// are skipped by `list_issues`.
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}
