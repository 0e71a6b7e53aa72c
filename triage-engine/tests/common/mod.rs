//! Shared item builders for engine tests.
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use triage_core::{Author, Item, ItemKind};

pub fn author(username: &str, contributions: u32) -> Author {
    Author {
        username: username.to_string(),
        avatar_url: None,
        contributions_count: contributions,
        is_first_time: false,
    }
}

pub fn pr(number: u64, title: &str, body: &str, created_at: DateTime<Utc>) -> Item {
    Item {
        kind: ItemKind::PullRequest,
        number,
        repo: "acme/widgets".to_string(),
        title: title.to_string(),
        body: if body.is_empty() {
            None
        } else {
            Some(body.to_string())
        },
        author: author("alice", 10),
        state: "open".to_string(),
        created_at,
        updated_at: created_at,
        closed_at: None,
        merged_at: None,
        branch: Some("feature/x".to_string()),
        base_branch: Some("main".to_string()),
        files_changed: Vec::new(),
        additions: 100,
        deletions: 20,
        is_draft: false,
        comments_count: 0,
        review_comments_count: 0,
        reactions_count: 0,
        has_tests: false,
        has_docs: false,
        test_coverage: None,
        labels: Vec::new(),
    }
}

pub fn issue(number: u64, title: &str, body: &str, created_at: DateTime<Utc>) -> Item {
    let mut item = pr(number, title, body, created_at);
    item.kind = ItemKind::Issue;
    item.branch = None;
    item.base_branch = None;
    item.additions = 0;
    item.deletions = 0;
    item
}
