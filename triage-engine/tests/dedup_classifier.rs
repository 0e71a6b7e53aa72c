//! Scenario tests for the duplicate classifier.

mod common;

use std::sync::Arc;

use chrono::Utc;
use common::{issue, pr};
use triage_core::{DedupConfig, ItemKind, NeighborHit};
use triage_engine::{DuplicateClassifier, Embedder, HashingEmbedder, SimilarityIndex};

fn classifier(cfg: DedupConfig) -> DuplicateClassifier {
    let index = Arc::new(SimilarityIndex::new(
        Embedder::Hashing(HashingEmbedder::new(cfg.embedding_dim)),
        cfg.cache_capacity,
    ));
    DuplicateClassifier::new(index, cfg)
}

/// Loosened thresholds for tests that care about retention, not the
/// duplicate verdict.
fn loose_config() -> DedupConfig {
    DedupConfig {
        duplicate_threshold: 0.6,
        near_duplicate_threshold: 0.3,
        ..DedupConfig::default()
    }
}

#[tokio::test]
async fn similar_prs_are_detected() {
    let engine = classifier(loose_config());
    let target = pr(
        1,
        "Add user authentication",
        "This PR adds OAuth2 authentication support for users",
        Utc::now(),
    );
    let candidate = pr(
        2,
        "Implement user authentication with OAuth",
        "Adding OAuth2 authentication support for user login",
        Utc::now(),
    );

    let result = engine.classify(&target, &[candidate], &[]).await.unwrap();

    assert!(!result.similar_items.is_empty());
    assert_eq!(result.similar_items[0].number, 2);
    assert!(result.similar_items[0].similarity > 0.3);
}

#[tokio::test]
async fn different_prs_stay_unique() {
    let engine = classifier(DedupConfig::default());
    let target = pr(
        1,
        "Add user authentication",
        "This PR adds OAuth2 authentication support",
        Utc::now(),
    );
    let other = pr(
        3,
        "Fix CSS styling on mobile",
        "Update responsive stylesheet rules for small viewports",
        Utc::now(),
    );

    let result = engine.classify(&target, &[other], &[]).await.unwrap();

    assert!(!result.is_duplicate);
    assert!(result.similar_items.is_empty());
    assert!(result.summary.contains("unique"));
}

#[tokio::test]
async fn identical_text_is_flagged_duplicate() {
    let engine = classifier(DedupConfig::default());
    let target = pr(
        1,
        "Add user authentication",
        "This PR adds OAuth2 authentication support",
        Utc::now(),
    );
    let mut twin = target.clone();
    twin.number = 4;

    let result = engine.classify(&target, &[twin], &[]).await.unwrap();

    assert!(result.is_duplicate);
    assert!(result.confidence >= 0.8);
    let canonical = result.canonical.expect("canonical match expected");
    assert_eq!(canonical.number, 4);
    // Anything labeled canonical cleared the duplicate threshold.
    assert!(canonical.similarity >= 0.85);
}

#[tokio::test]
async fn a_candidate_sharing_the_target_identifier_is_excluded() {
    let engine = classifier(loose_config());
    let target = pr(1, "Add caching layer", "Cache repeated lookups", Utc::now());
    let same = target.clone();

    let result = engine.classify(&target, &[same], &[]).await.unwrap();

    assert!(result.similar_items.is_empty());
    assert!(!result.is_duplicate);
}

#[tokio::test]
async fn empty_pool_yields_unique_with_zero_confidence() {
    let engine = classifier(DedupConfig::default());
    let target = pr(1, "Add caching layer", "Cache repeated lookups", Utc::now());

    let result = engine.classify(&target, &[], &[]).await.unwrap();

    assert!(!result.is_duplicate);
    assert_eq!(result.confidence, 0.0);
    assert!(result.canonical.is_none());
    assert!(result.similar_items.is_empty());
}

#[tokio::test]
async fn external_hits_merge_without_overwriting_local_reasons() {
    let engine = classifier(loose_config());
    let target = pr(
        1,
        "Add user authentication",
        "This PR adds OAuth2 authentication support for users",
        Utc::now(),
    );
    let candidate = pr(
        2,
        "Implement user authentication with OAuth",
        "Adding OAuth2 authentication support for user login",
        Utc::now(),
    );

    let external = vec![
        // Same identifier as the local candidate: must be skipped.
        NeighborHit {
            number: 2,
            kind: ItemKind::PullRequest,
            score: 0.99,
            title: "stale title".to_string(),
            url: "https://example.test/2".to_string(),
        },
        // Fresh identifier: merged with its own reason.
        NeighborHit {
            number: 9,
            kind: ItemKind::PullRequest,
            score: 0.41,
            title: "Historic OAuth work".to_string(),
            url: "https://example.test/9".to_string(),
        },
    ];

    let result = engine
        .classify(&target, &[candidate], &external)
        .await
        .unwrap();

    let local = result
        .similar_items
        .iter()
        .find(|m| m.number == 2)
        .expect("local match retained");
    assert!(!local.reason.starts_with("vector similarity"));
    assert!(local.similarity < 0.99); // locally computed, not overwritten

    let merged = result
        .similar_items
        .iter()
        .find(|m| m.number == 9)
        .expect("external hit merged");
    assert_eq!(merged.reason, "vector similarity: 0.41");

    // Descending by similarity after the merge.
    for pair in result.similar_items.windows(2) {
        assert!(pair[0].similarity >= pair[1].similarity);
    }
}

#[tokio::test]
async fn at_most_five_matches_are_returned() {
    let engine = classifier(loose_config());
    let target = pr(
        1,
        "Add user authentication",
        "This PR adds OAuth2 authentication support for users",
        Utc::now(),
    );
    let candidates: Vec<_> = (2..=9)
        .map(|n| {
            pr(
                n,
                "Add user authentication",
                "This PR adds OAuth2 authentication support for users",
                Utc::now(),
            )
        })
        .collect();

    let result = engine.classify(&target, &candidates, &[]).await.unwrap();
    assert_eq!(result.similar_items.len(), 5);
}

#[tokio::test]
async fn issue_matches_name_shared_labels() {
    let engine = classifier(loose_config());
    let mut target = issue(
        1,
        "Bug: login not working",
        "Users cannot log in with OAuth",
        Utc::now(),
    );
    target.labels = vec!["bug".to_string(), "auth".to_string()];
    let mut candidate = issue(
        2,
        "Login broken after update",
        "OAuth login fails with an error",
        Utc::now(),
    );
    candidate.labels = vec!["auth".to_string()];

    let result = engine.classify(&target, &[candidate], &[]).await.unwrap();

    assert!(!result.similar_items.is_empty());
    assert!(result.similar_items[0].reason.contains("shared labels: auth"));
}

#[tokio::test]
async fn pr_matches_name_shared_files() {
    let engine = classifier(loose_config());
    let mut target = pr(
        1,
        "Add user authentication",
        "This PR adds OAuth2 authentication support",
        Utc::now(),
    );
    target.files_changed = vec!["auth.rs".to_string(), "login.rs".to_string()];
    let mut candidate = pr(
        2,
        "Implement OAuth authentication",
        "Adds OAuth2 support for login",
        Utc::now(),
    );
    candidate.files_changed = vec!["auth.rs".to_string(), "oauth.rs".to_string()];

    let result = engine.classify(&target, &[candidate], &[]).await.unwrap();

    assert!(!result.similar_items.is_empty());
    assert!(result.similar_items[0]
        .reason
        .contains("touches same files: auth.rs"));
}
