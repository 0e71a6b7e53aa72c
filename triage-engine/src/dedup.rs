//! Duplicate classification over cached embeddings.
//!
//! Two-threshold policy: candidates at or above the near-duplicate bar are
//! retained as "similar"; only a top match at or above the (strictly
//! higher-or-equal) duplicate bar makes the target a duplicate. This keeps
//! "similar but not duplicate" items visible to maintainers.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::debug;

use triage_core::{DedupConfig, DedupResult, DuplicateMatch, Item, ItemKind, NeighborHit};

use crate::errors::EngineResult;
use crate::similarity::{cosine_similarity, SimilarityIndex};

pub struct DuplicateClassifier {
    index: Arc<SimilarityIndex>,
    cfg: DedupConfig,
}

impl DuplicateClassifier {
    pub fn new(index: Arc<SimilarityIndex>, cfg: DedupConfig) -> Self {
        Self { index, cfg }
    }

    /// Classify `target` against a candidate pool plus optional externally
    /// supplied nearest-neighbor hits.
    ///
    /// Candidates sharing the target's identifier are always excluded.
    /// External hits merge after local matches with first-seen-wins
    /// semantics — a locally derived reason is never overwritten.
    pub async fn classify(
        &self,
        target: &Item,
        candidates: &[Item],
        external: &[NeighborHit],
    ) -> EngineResult<DedupResult> {
        let target_vec = self.index.embed(&target.embedding_text()).await?;

        let mut similar: Vec<DuplicateMatch> = Vec::new();
        for cand in candidates {
            if cand.id() == target.id() {
                continue;
            }
            let cand_vec = self.index.embed(&cand.embedding_text()).await?;
            let sim = cosine_similarity(&target_vec, &cand_vec);
            if sim >= self.cfg.near_duplicate_threshold {
                similar.push(DuplicateMatch {
                    number: cand.number,
                    kind: cand.kind,
                    similarity: sim,
                    title: cand.title.clone(),
                    url: cand.web_url(),
                    reason: match_reason(target, cand, sim),
                });
            }
        }

        for hit in external {
            if hit.number == target.number && hit.kind == target.kind {
                continue;
            }
            if similar
                .iter()
                .any(|m| m.number == hit.number && m.kind == hit.kind)
            {
                continue;
            }
            similar.push(DuplicateMatch {
                number: hit.number,
                kind: hit.kind,
                similarity: hit.score,
                title: hit.title.clone(),
                url: hit.url.clone(),
                reason: format!("vector similarity: {:.2}", hit.score),
            });
        }

        similar.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
        });

        let confidence = similar.first().map(|m| m.similarity).unwrap_or(0.0);
        let is_duplicate = confidence >= self.cfg.duplicate_threshold && !similar.is_empty();
        let canonical = if is_duplicate {
            similar.first().cloned()
        } else {
            None
        };

        similar.truncate(5);
        let summary = summary_for(target, is_duplicate, &similar);
        debug!(
            "dedup: {} similar={} duplicate={} confidence={:.2}",
            target.id(),
            similar.len(),
            is_duplicate,
            confidence
        );

        Ok(DedupResult {
            is_duplicate,
            confidence,
            canonical,
            similar_items: similar,
            summary,
        })
    }
}

/// Human-readable reason for a match, independent of the score.
fn match_reason(target: &Item, cand: &Item, similarity: f32) -> String {
    let mut reasons: Vec<String> = Vec::new();

    if title_overlap(&target.title, &cand.title) > 0.5 {
        reasons.push("similar title".to_string());
    }

    match target.kind {
        ItemKind::PullRequest => {
            // Iterate target order so the named overlap is deterministic.
            let shared: Vec<&str> = target
                .files_changed
                .iter()
                .filter(|f| cand.files_changed.contains(f))
                .map(String::as_str)
                .take(3)
                .collect();
            if !shared.is_empty() {
                reasons.push(format!("touches same files: {}", shared.join(", ")));
            }
        }
        ItemKind::Issue => {
            let shared: Vec<&str> = target
                .labels
                .iter()
                .filter(|l| cand.labels.contains(l))
                .map(String::as_str)
                .collect();
            if !shared.is_empty() {
                reasons.push(format!("shared labels: {}", shared.join(", ")));
            }
        }
    }

    let delta = (target.created_at - cand.created_at).num_seconds().abs();
    if delta < 86_400 {
        reasons.push("opened around the same time".to_string());
    }

    if reasons.is_empty() {
        return format!("semantic similarity: {similarity:.2}");
    }
    reasons.join("; ")
}

/// Fraction of shared title tokens relative to the longer title.
fn title_overlap(a: &str, b: &str) -> f32 {
    use std::collections::HashSet;
    let toks_a: HashSet<String> = a.to_lowercase().split_whitespace().map(String::from).collect();
    let toks_b: HashSet<String> = b.to_lowercase().split_whitespace().map(String::from).collect();
    let longest = toks_a.len().max(toks_b.len());
    if longest == 0 {
        return 0.0;
    }
    toks_a.intersection(&toks_b).count() as f32 / longest as f32
}

fn summary_for(target: &Item, is_duplicate: bool, similar: &[DuplicateMatch]) -> String {
    let label = match target.kind {
        ItemKind::PullRequest => "PR",
        ItemKind::Issue => "Issue",
    };
    if is_duplicate {
        let canonical = &similar[0];
        let closing = match target.kind {
            ItemKind::PullRequest => "Consider closing this PR and focusing on the original.",
            ItemKind::Issue => "Consider closing and redirecting to the original.",
        };
        return format!(
            "{label} #{} appears to be a duplicate of #{} (similarity: {:.2}). {closing}",
            target.number, canonical.number, canonical.similarity
        );
    }
    if !similar.is_empty() {
        return match target.kind {
            ItemKind::PullRequest => format!(
                "{label} #{} has {} similar PR(s) but appears to be a distinct implementation. \
                 Review for potential consolidation.",
                target.number,
                similar.len()
            ),
            ItemKind::Issue => format!(
                "{label} #{} has {} similar issue(s). Review for potential duplicates.",
                target.number,
                similar.len()
            ),
        };
    }
    match target.kind {
        ItemKind::PullRequest => format!(
            "{label} #{} appears to be unique with no similar PRs found.",
            target.number
        ),
        ItemKind::Issue => format!(
            "{label} #{} appears to be unique with no similar issues found.",
            target.number
        ),
    }
}
