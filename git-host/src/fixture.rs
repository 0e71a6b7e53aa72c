//! In-memory host source for offline runs and tests.
//!
//! Serves pre-registered item snapshots and diffs; posted comments are
//! recorded instead of sent. Missing entries surface as `NotFound`, which
//! keeps failure paths exercisable without a live backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use triage_core::{Item, ItemKind};

use crate::errors::{HostError, HostResult};

/// A comment recorded by [`FixtureHost::post_comment`].
#[derive(Debug, Clone)]
pub struct RecordedComment {
    pub repo: String,
    pub number: u64,
    pub body: String,
}

#[derive(Debug, Clone, Default)]
pub struct FixtureHost {
    items: Vec<Item>,
    diffs: HashMap<(String, u64), String>,
    comments: Arc<Mutex<Vec<RecordedComment>>>,
}

impl FixtureHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_items(mut self, items: impl IntoIterator<Item = Item>) -> Self {
        self.items.extend(items);
        self
    }

    pub fn with_diff(mut self, repo: &str, number: u64, diff: &str) -> Self {
        self.diffs
            .insert((repo.to_string(), number), diff.to_string());
        self
    }

    pub fn fetch_item(&self, repo: &str, number: u64, kind: ItemKind) -> HostResult<Item> {
        self.items
            .iter()
            .find(|i| i.repo == repo && i.number == number && i.kind == kind)
            .cloned()
            .ok_or(HostError::NotFound)
    }

    /// Registered items of the given kind and state, in registration order.
    pub fn list_items(&self, repo: &str, state: &str, kind: ItemKind, per_page: u32) -> Vec<Item> {
        self.items
            .iter()
            .filter(|i| i.repo == repo && i.kind == kind && i.state == state)
            .take(per_page as usize)
            .cloned()
            .collect()
    }

    pub fn fetch_diff(&self, repo: &str, number: u64) -> HostResult<String> {
        self.diffs
            .get(&(repo.to_string(), number))
            .cloned()
            .ok_or(HostError::NotFound)
    }

    pub fn post_comment(&self, repo: &str, number: u64, body: &str) {
        self.comments
            .lock()
            .expect("comment log poisoned")
            .push(RecordedComment {
                repo: repo.to_string(),
                number,
                body: body.to_string(),
            });
    }

    /// Comments recorded so far (for assertions).
    pub fn posted_comments(&self) -> Vec<RecordedComment> {
        self.comments.lock().expect("comment log poisoned").clone()
    }
}
