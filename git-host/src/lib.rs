//! Code-host facade w/o async-trait or dynamic trait objects.
//!
//! A single enum `HostSource` with concrete backends: the live GitHub REST
//! client and an in-memory fixture used for tests and offline dry runs.
//! This keeps async fns simple and avoids boxing futures.

pub mod errors;
pub mod fixture;
pub mod github;
pub mod types;

pub use errors::{HostError, HostResult};
pub use fixture::{FixtureHost, RecordedComment};
pub use github::GitHubClient;

use triage_core::{Item, ItemKind};

/// Runtime configuration for the live host client.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// API base, e.g. "https://api.github.com".
    pub base_api: String,
    /// Access token (PAT or app token).
    pub token: String,
}

impl HostConfig {
    /// Build from environment: `TRIAGE_GITHUB_TOKEN` (falling back to
    /// `GITHUB_TOKEN`) and optional `TRIAGE_GITHUB_API`.
    pub fn from_env() -> Self {
        let token = std::env::var("TRIAGE_GITHUB_TOKEN")
            .or_else(|_| std::env::var("GITHUB_TOKEN"))
            .unwrap_or_default();
        let base_api = std::env::var("TRIAGE_GITHUB_API")
            .unwrap_or_else(|_| "https://api.github.com".to_string());
        Self { base_api, token }
    }
}

/// Concrete host source (enum-dispatch).
#[derive(Debug, Clone)]
pub enum HostSource {
    GitHub(GitHubClient),
    Fixture(FixtureHost),
}

impl HostSource {
    /// Construct the live GitHub backend from config.
    pub fn github(cfg: HostConfig) -> HostResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent("repo-triage/0.1")
            .build()
            .map_err(HostError::from)?;
        Ok(Self::GitHub(GitHubClient::new(
            client,
            cfg.base_api,
            cfg.token,
        )))
    }

    pub fn fixture(host: FixtureHost) -> Self {
        Self::Fixture(host)
    }

    /// Fetch one item snapshot.
    pub async fn fetch_item(&self, repo: &str, number: u64, kind: ItemKind) -> HostResult<Item> {
        match self {
            Self::GitHub(c) => match kind {
                ItemKind::PullRequest => c.get_pull_request(repo, number).await,
                ItemKind::Issue => c.get_issue(repo, number).await,
            },
            Self::Fixture(f) => f.fetch_item(repo, number, kind),
        }
    }

    /// List items of one kind in the given lifecycle state.
    pub async fn list_items(
        &self,
        repo: &str,
        state: &str,
        kind: ItemKind,
        per_page: u32,
    ) -> HostResult<Vec<Item>> {
        match self {
            Self::GitHub(c) => match kind {
                ItemKind::PullRequest => c.list_pull_requests(repo, state, per_page).await,
                ItemKind::Issue => c.list_issues(repo, state, per_page).await,
            },
            Self::Fixture(f) => Ok(f.list_items(repo, state, kind, per_page)),
        }
    }

    /// Fetch the unified diff of a pull request.
    pub async fn fetch_diff(&self, repo: &str, number: u64) -> HostResult<String> {
        match self {
            Self::GitHub(c) => c.get_diff(repo, number).await,
            Self::Fixture(f) => f.fetch_diff(repo, number),
        }
    }

    /// Post a comment on an item.
    pub async fn post_comment(&self, repo: &str, number: u64, body: &str) -> HostResult<()> {
        match self {
            Self::GitHub(c) => c.post_comment(repo, number, body).await,
            Self::Fixture(f) => {
                f.post_comment(repo, number, body);
                Ok(())
            }
        }
    }
}
