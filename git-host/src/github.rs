//! GitHub REST v3 client.
//!
//! Endpoints used:
//! - GET  /repos/{repo}/pulls/{number}
//! - GET  /repos/{repo}/pulls/{number}/files
//! - GET  /repos/{repo}/pulls?state=...
//! - GET  /repos/{repo}/issues/{number}
//! - GET  /repos/{repo}/issues?state=...
//! - GET  /repos/{repo}/pulls/{number} with the diff media type
//! - POST /repos/{repo}/issues/{number}/comments

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use triage_core::{Author, Item, ItemKind};

use crate::errors::HostResult;
use crate::types::*;

const API_VERSION: &str = "2022-11-28";
const ACCEPT_JSON: &str = "application/vnd.github+json";
const ACCEPT_DIFF: &str = "application/vnd.github.v3.diff";

#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    base_api: String, // "https://api.github.com"
    token: String,
}

impl GitHubClient {
    pub fn new(http: Client, base_api: String, token: String) -> Self {
        Self {
            http,
            base_api,
            token,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> HostResult<T> {
        let url = format!("{}{}", self.base_api, path);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .header("Accept", ACCEPT_JSON)
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }

    /// Fetch a pull request as a normalized [`Item`].
    pub async fn get_pull_request(&self, repo: &str, number: u64) -> HostResult<Item> {
        let pull: GhPull = self.get_json(&format!("/repos/{repo}/pulls/{number}")).await?;
        let files: Vec<GhPullFile> = self
            .get_json(&format!("/repos/{repo}/pulls/{number}/files"))
            .await?;
        let files_changed: Vec<String> = files.into_iter().map(|f| f.filename).collect();
        Ok(item_from_pull(repo, pull, files_changed))
    }

    /// Fetch an issue as a normalized [`Item`].
    pub async fn get_issue(&self, repo: &str, number: u64) -> HostResult<Item> {
        let issue: GhIssue = self
            .get_json(&format!("/repos/{repo}/issues/{number}"))
            .await?;
        Ok(item_from_issue(repo, issue))
    }

    /// List pull requests. Each PR is re-fetched in full so the file list
    /// and change counters are populated.
    pub async fn list_pull_requests(
        &self,
        repo: &str,
        state: &str,
        per_page: u32,
    ) -> HostResult<Vec<Item>> {
        let summaries: Vec<GhPullSummary> = self
            .get_json(&format!(
                "/repos/{repo}/pulls?state={state}&per_page={per_page}"
            ))
            .await?;
        debug!("list_pull_requests: repo={repo} count={}", summaries.len());

        let mut items = Vec::with_capacity(summaries.len());
        for s in summaries {
            items.push(self.get_pull_request(repo, s.number).await?);
        }
        Ok(items)
    }

    /// List issues. The issues endpoint also returns pull requests; those
    /// entries are skipped.
    pub async fn list_issues(&self, repo: &str, state: &str, per_page: u32) -> HostResult<Vec<Item>> {
        let raw: Vec<GhIssue> = self
            .get_json(&format!(
                "/repos/{repo}/issues?state={state}&per_page={per_page}"
            ))
            .await?;
        let items = raw
            .into_iter()
            .filter(|i| i.pull_request.is_none())
            .map(|i| item_from_issue(repo, i))
            .collect();
        Ok(items)
    }

    /// Fetch the unified diff of a pull request as plain text.
    pub async fn get_diff(&self, repo: &str, number: u64) -> HostResult<String> {
        let url = format!("{}/repos/{repo}/pulls/{number}", self.base_api);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .header("Accept", ACCEPT_DIFF)
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.text().await?)
    }

    /// Post a comment on an issue or pull request.
    pub async fn post_comment(&self, repo: &str, number: u64, body: &str) -> HostResult<()> {
        let url = format!("{}/repos/{repo}/issues/{number}/comments", self.base_api);
        self.http
            .post(&url)
            .bearer_auth(&self.token)
            .header("Accept", ACCEPT_JSON)
            .header("X-GitHub-Api-Version", API_VERSION)
            .json(&serde_json::json!({ "body": body }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

fn parse_author(user: GhUser) -> Author {
    Author {
        username: user.login,
        avatar_url: user.avatar_url,
        // Filling these needs extra per-user API calls; the scorer treats
        // zero contributions without the first-time flag as "unknown".
        contributions_count: 0,
        is_first_time: false,
    }
}

fn item_from_pull(repo: &str, pull: GhPull, files_changed: Vec<String>) -> Item {
    let has_tests = files_changed.iter().any(|f| f.to_lowercase().contains("test"));
    let has_docs = files_changed
        .iter()
        .any(|f| f.ends_with(".md") || f.ends_with(".rst") || f.ends_with(".txt"));
    Item {
        kind: ItemKind::PullRequest,
        number: pull.number,
        repo: repo.to_string(),
        title: pull.title,
        body: pull.body,
        author: parse_author(pull.user),
        state: pull.state,
        created_at: pull.created_at,
        updated_at: pull.updated_at,
        closed_at: pull.closed_at,
        merged_at: pull.merged_at,
        branch: Some(pull.head.branch),
        base_branch: Some(pull.base.branch),
        files_changed,
        additions: pull.additions,
        deletions: pull.deletions,
        is_draft: pull.draft,
        comments_count: pull.comments,
        review_comments_count: pull.review_comments,
        reactions_count: 0,
        has_tests,
        has_docs,
        test_coverage: None,
        labels: pull.labels.into_iter().map(|l| l.name).collect(),
    }
}

fn item_from_issue(repo: &str, issue: GhIssue) -> Item {
    Item {
        kind: ItemKind::Issue,
        number: issue.number,
        repo: repo.to_string(),
        title: issue.title,
        body: issue.body,
        author: parse_author(issue.user),
        state: issue.state,
        created_at: issue.created_at,
        updated_at: issue.updated_at,
        closed_at: issue.closed_at,
        merged_at: None,
        branch: None,
        base_branch: None,
        files_changed: Vec::new(),
        additions: 0,
        deletions: 0,
        is_draft: false,
        comments_count: issue.comments,
        review_comments_count: 0,
        reactions_count: issue.reactions.map(|r| r.total_count).unwrap_or(0),
        has_tests: false,
        has_docs: false,
        test_coverage: None,
        labels: issue.labels.into_iter().map(|l| l.name).collect(),
    }
}
