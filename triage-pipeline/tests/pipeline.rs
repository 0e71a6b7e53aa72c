//! End-to-end pipeline tests over the in-memory fixture host.

use chrono::{Duration, Utc};
use git_host::{FixtureHost, HostSource};
use triage_core::{Author, Item, ItemKind, Priority, TriageConfig, TriageStatus};
use triage_engine::{Embedder, HashingEmbedder};
use triage_pipeline::{StageToggles, TriagePipeline, Worker};
use vector_index::NeighborSource;

const REPO: &str = "acme/widgets";

fn pr(number: u64, title: &str, body: &str) -> Item {
    Item {
        kind: ItemKind::PullRequest,
        number,
        repo: REPO.to_string(),
        title: title.to_string(),
        body: Some(body.to_string()),
        author: Author {
            username: "alice".into(),
            avatar_url: None,
            contributions_count: 10,
            is_first_time: false,
        },
        state: "open".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
        closed_at: None,
        merged_at: None,
        branch: Some("feature/x".into()),
        base_branch: Some("main".into()),
        files_changed: vec!["src/x.rs".into()],
        additions: 150,
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

/// Earlier, higher-quality PR that should win base detection.
fn strong_pr(number: u64, title: &str, body: &str) -> Item {
    let mut item = pr(number, title, body);
    item.created_at = Utc::now() - Duration::hours(2);
    item.updated_at = item.created_at;
    item.author.contributions_count = 50;
    item.files_changed = vec![
        "src/x.rs".into(),
        "tests/x.rs".into(),
        "docs/x.md".into(),
    ];
    item.additions = 200;
    item.deletions = 50;
    item.has_tests = true;
    item.has_docs = true;
    item
}

fn issue(number: u64, title: &str, body: &str) -> Item {
    let mut item = pr(number, title, body);
    item.kind = ItemKind::Issue;
    item.branch = None;
    item.base_branch = None;
    item.files_changed = Vec::new();
    item.additions = 0;
    item.deletions = 0;
    item
}

fn pipeline_over(host: FixtureHost) -> TriagePipeline {
    TriagePipeline::new(
        TriageConfig::default(),
        HostSource::fixture(host),
        Embedder::Hashing(HashingEmbedder::new(512)),
        None,
        NeighborSource::Disabled,
    )
    .expect("default config is valid")
}

const FEATURE_BODY: &str = "Complete implementation of feature X with tests and docs, \
                            covering the edge cases raised in the design discussion.";

#[tokio::test]
async fn missing_item_fails_without_running_downstream_stages() {
    let pipeline = pipeline_over(FixtureHost::new());

    let outcome = pipeline
        .run(REPO, 42, ItemKind::PullRequest, &StageToggles::default())
        .await;

    assert_eq!(outcome.status, TriageStatus::Failed);
    assert_eq!(outcome.error.as_deref(), Some("not found"));
    assert!(outcome.dedup.is_none());
    assert!(outcome.base.is_none());
    assert!(outcome.review.is_none());
    assert!(outcome.vision.is_none());
    assert!(outcome.stage_errors.is_empty());
}

#[tokio::test]
async fn duplicate_pair_flows_through_dedup_base_and_synthesis() {
    let target = strong_pr(1, "Add feature X", FEATURE_BODY);
    let twin = pr(2, "Add feature X", FEATURE_BODY);
    let host = FixtureHost::new()
        .with_items([target, twin])
        .with_diff(REPO, 1, "diff --git a/src/x.rs b/src/x.rs\n+fn x() {}\n");

    let outcome = pipeline_over(host)
        .run(REPO, 1, ItemKind::PullRequest, &StageToggles::default())
        .await;

    assert_eq!(outcome.status, TriageStatus::Completed);
    assert!(outcome.stage_errors.is_empty());

    let dedup = outcome.dedup.as_ref().expect("dedup ran");
    assert!(dedup.is_duplicate);
    assert_eq!(dedup.canonical.as_ref().map(|c| c.number), Some(2));

    let base = outcome.base.as_ref().expect("base detection gated open");
    assert!(base.is_base_candidate);
    assert_eq!(base.competing_prs, vec![2]);

    assert!(outcome.review.is_some());
    assert!(outcome.vision.is_some());

    // Base candidacy outranks the duplicate's low priority.
    assert_eq!(outcome.priority, Priority::High);
    assert!(outcome.recommended_action.contains("Close as duplicate"));
    assert!(outcome.recommended_action.contains("Prioritize for review"));
    assert!(outcome.executive_summary.contains("duplicate of #2"));
}

#[tokio::test]
async fn base_detection_stays_closed_without_similar_items() {
    let target = pr(1, "Add caching layer", "Cache repeated widget lookups in memory");
    let unrelated = pr(3, "Fix mobile stylesheet", "Responsive rules for small viewports");
    let host = FixtureHost::new()
        .with_items([target, unrelated])
        .with_diff(REPO, 1, "diff --git a/src/cache.rs b/src/cache.rs\n");

    let outcome = pipeline_over(host)
        .run(REPO, 1, ItemKind::PullRequest, &StageToggles::default())
        .await;

    assert_eq!(outcome.status, TriageStatus::Completed);
    let dedup = outcome.dedup.as_ref().expect("dedup ran");
    assert!(dedup.similar_items.is_empty());
    assert!(outcome.base.is_none());
}

#[tokio::test]
async fn a_failed_diff_fetch_is_recorded_without_losing_dedup_results() {
    let target = pr(1, "Add caching layer", "Cache repeated widget lookups in memory");
    let host = FixtureHost::new().with_item(target); // no diff registered

    let outcome = pipeline_over(host)
        .run(REPO, 1, ItemKind::PullRequest, &StageToggles::default())
        .await;

    assert_eq!(outcome.status, TriageStatus::Completed);
    assert!(outcome.dedup.is_some());
    // The review stage still produced a (diff-less) report.
    assert!(outcome.review.is_some());
    assert!(outcome
        .stage_errors
        .iter()
        .any(|e| e.starts_with("review: diff fetch failed")));
}

#[tokio::test]
async fn issues_run_dedup_only() {
    let mut target = issue(10, "Login broken", "Cannot log in with OAuth since the update");
    target.labels = vec!["bug".into()];
    let twin = issue(11, "Login broken", "Cannot log in with OAuth since the update");
    let host = FixtureHost::new().with_items([target, twin]);

    let outcome = pipeline_over(host)
        .run(REPO, 10, ItemKind::Issue, &StageToggles::default())
        .await;

    assert_eq!(outcome.status, TriageStatus::Completed);
    assert!(outcome.dedup.is_some());
    assert!(outcome.base.is_none());
    assert!(outcome.review.is_none());
    assert!(outcome.vision.is_none());
    // The "bug" label outranks the duplicate's low priority.
    assert_eq!(outcome.priority, Priority::High);
}

#[tokio::test]
async fn duplicate_issue_without_urgent_labels_is_low_priority() {
    let target = issue(10, "Login broken", "Cannot log in with OAuth since the update");
    let twin = issue(11, "Login broken", "Cannot log in with OAuth since the update");
    let host = FixtureHost::new().with_items([target, twin]);

    let outcome = pipeline_over(host)
        .run(REPO, 10, ItemKind::Issue, &StageToggles::default())
        .await;

    assert_eq!(outcome.priority, Priority::Low);
    assert_eq!(
        outcome.recommended_action,
        "Close and redirect to canonical issue"
    );
}

#[tokio::test]
async fn disabled_stages_leave_a_neutral_outcome() {
    let target = pr(1, "Add caching layer", "Cache repeated widget lookups in memory");
    let host = FixtureHost::new().with_item(target);
    let toggles = StageToggles {
        dedup: false,
        base_detection: false,
        review: false,
        vision: false,
    };

    let outcome = pipeline_over(host)
        .run(REPO, 1, ItemKind::PullRequest, &toggles)
        .await;

    assert_eq!(outcome.status, TriageStatus::Completed);
    assert!(outcome.dedup.is_none());
    assert!(outcome.base.is_none());
    assert!(outcome.review.is_none());
    assert!(outcome.vision.is_none());
    assert_eq!(outcome.executive_summary, "Analysis complete");
    assert_eq!(outcome.recommended_action, "Ready for review");
    assert_eq!(outcome.priority, Priority::Normal);
}

#[tokio::test]
async fn batch_worker_collects_findings_and_posts_comments() {
    let strong = strong_pr(1, "Add feature X", FEATURE_BODY);
    let twin = pr(2, "Add feature X", FEATURE_BODY);
    let host = FixtureHost::new()
        .with_items([strong, twin])
        .with_diff(REPO, 1, "diff --git a/src/x.rs b/src/x.rs\n")
        .with_diff(REPO, 2, "diff --git a/src/x.rs b/src/x.rs\n");
    // Clone shares the comment log with the pipeline's copy.
    let observer = host.clone();

    let worker = Worker::new(pipeline_over(host), true);
    let summary = worker
        .run_batch(REPO, 50, &StageToggles::default())
        .await
        .expect("batch over fixture");

    assert_eq!(summary.total, 2);
    assert_eq!(summary.failed, 0);
    // Each of the pair sees the other as its duplicate.
    assert_eq!(summary.duplicates.len(), 2);
    // Only the stronger, earlier PR is named base candidate.
    assert_eq!(summary.base_candidates.len(), 1);
    assert_eq!(summary.base_candidates[0].number, 1);

    let comments = observer.posted_comments();
    assert_eq!(comments.len(), 2);
    assert!(comments[0].body.contains("Triage Analysis"));
}
