//! The triage pipeline: fetch → dedup → base detection → review → vision →
//! synthesis.
//!
//! One pipeline instance processes one item per `run` call. Stages run
//! sequentially (stage 3 depends on stage 2, stage 5 on stage 4) and each
//! of stages 2–5 is individually caught: a stage failure is recorded in
//! the outcome and never erases an earlier stage's result. Only the
//! initial item fetch is terminal.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use git_host::HostSource;
use llm_service::CompletionClient;
use triage_analysis::{ReviewAnalyzer, VisionAnalyzer};
use triage_core::{
    DedupResult, Item, ItemKind, TriageConfig, TriageOutcome, TriageStatus,
};
use triage_engine::{
    BaseCandidateScorer, DuplicateClassifier, Embedder, SimilarityIndex,
};
use vector_index::NeighborSource;

use crate::errors::PipelineResult;
use crate::synthesize;

/// Independently toggle-able pipeline stages.
#[derive(Debug, Clone, Copy)]
pub struct StageToggles {
    pub dedup: bool,
    pub base_detection: bool,
    pub review: bool,
    pub vision: bool,
}

impl Default for StageToggles {
    fn default() -> Self {
        Self {
            dedup: true,
            base_detection: true,
            review: true,
            vision: true,
        }
    }
}

pub struct TriagePipeline {
    cfg: TriageConfig,
    host: HostSource,
    similarity: Arc<SimilarityIndex>,
    dedup: DuplicateClassifier,
    base: BaseCandidateScorer,
    review: ReviewAnalyzer,
    vision: VisionAnalyzer,
    neighbors: NeighborSource,
}

impl TriagePipeline {
    /// Wire up a pipeline from validated configuration and collaborators.
    pub fn new(
        cfg: TriageConfig,
        host: HostSource,
        embedder: Embedder,
        completion: Option<CompletionClient>,
        neighbors: NeighborSource,
    ) -> PipelineResult<Self> {
        cfg.validate()?;
        let similarity = Arc::new(SimilarityIndex::new(embedder, cfg.dedup.cache_capacity));
        let dedup = DuplicateClassifier::new(Arc::clone(&similarity), cfg.dedup.clone());
        let base = BaseCandidateScorer::new(cfg.base.clone());
        let review = ReviewAnalyzer::from_client(completion.clone(), cfg.review.clone());
        let vision = VisionAnalyzer::from_client(completion, cfg.vision.clone(), &cfg.review.model);
        Ok(Self {
            cfg,
            host,
            similarity,
            dedup,
            base,
            review,
            vision,
            neighbors,
        })
    }

    /// The host source this pipeline talks to.
    pub fn host(&self) -> &HostSource {
        &self.host
    }

    /// Run the full pipeline for one item. Never returns an error: every
    /// failure is represented in the outcome (`failed` status for a fetch
    /// failure, `stage_errors` entries for anything downstream).
    pub async fn run(
        &self,
        repo: &str,
        number: u64,
        kind: ItemKind,
        toggles: &StageToggles,
    ) -> TriageOutcome {
        let t0 = Instant::now();
        let mut outcome = TriageOutcome::started(kind, number, repo);

        debug!("stage1: fetch {kind}#{number} from {repo}");
        let item = match self.host.fetch_item(repo, number, kind).await {
            Ok(item) => item,
            Err(err) => {
                warn!("stage1: fetch failed for {kind}#{number}: {err}");
                outcome.status = TriageStatus::Failed;
                outcome.error = Some(err.to_string());
                outcome.elapsed_ms = t0.elapsed().as_millis() as u64;
                return outcome;
            }
        };

        let mut pool: Vec<Item> = Vec::new();
        if toggles.dedup {
            let t = Instant::now();
            match self.run_dedup(&item).await {
                Ok((result, candidates)) => {
                    debug!(
                        "stage2: dedup done, similar={} ({} ms)",
                        result.similar_items.len(),
                        t.elapsed().as_millis()
                    );
                    pool = candidates;
                    outcome.dedup = Some(result);
                }
                Err(err) => {
                    warn!("stage2: dedup failed: {err}");
                    outcome.stage_errors.push(format!("dedup: {err}"));
                }
            }
        }

        // Base detection is deliberately gated on dedup results — ranking
        // competing implementations is meaningless when none were found
        // similar.
        if toggles.base_detection && item.kind == ItemKind::PullRequest {
            if let Some(dedup) = &outcome.dedup {
                if !dedup.similar_items.is_empty() {
                    let competing: Vec<Item> = pool
                        .iter()
                        .filter(|c| {
                            dedup
                                .similar_items
                                .iter()
                                .any(|m| m.number == c.number && m.kind == c.kind)
                        })
                        .cloned()
                        .collect();
                    debug!("stage3: base detection over {} competitors", competing.len());
                    outcome.base = Some(self.base.score(&item, &competing));
                }
            }
        }

        if toggles.review && item.kind == ItemKind::PullRequest {
            let t = Instant::now();
            let diff = match self.host.fetch_diff(repo, number).await {
                Ok(diff) => Some(diff),
                Err(err) => {
                    warn!("stage4: diff fetch failed: {err}");
                    outcome
                        .stage_errors
                        .push(format!("review: diff fetch failed: {err}"));
                    None
                }
            };
            outcome.review = Some(self.review.review(&item, diff.as_deref()).await);
            debug!("stage4: review done ({} ms)", t.elapsed().as_millis());
        }

        if toggles.vision && item.kind == ItemKind::PullRequest {
            let t = Instant::now();
            let diff_summary = outcome
                .review
                .as_ref()
                .map(|r| truncate_chars(&r.summary, 500));
            outcome.vision = Some(self.vision.check(&item, diff_summary.as_deref()).await);
            debug!("stage5: vision done ({} ms)", t.elapsed().as_millis());
        }

        match item.kind {
            ItemKind::PullRequest => {
                outcome.executive_summary = synthesize::executive_summary(&outcome);
                outcome.priority = synthesize::priority(&outcome);
                outcome.recommended_action = synthesize::action(&outcome);
            }
            ItemKind::Issue => {
                outcome.executive_summary = synthesize::issue_summary(&outcome);
                outcome.priority = synthesize::issue_priority(&item, &outcome);
                outcome.recommended_action = synthesize::issue_action(&outcome);
            }
        }

        outcome.status = TriageStatus::Completed;
        outcome.elapsed_ms = t0.elapsed().as_millis() as u64;
        debug!(
            "completed {kind}#{number}: priority={} ({} ms)",
            outcome.priority, outcome.elapsed_ms
        );
        outcome
    }

    /// Fetch the candidate pool, query the optional neighbor index, and
    /// classify. Returns the pool alongside the result so base detection
    /// can narrow it without refetching.
    async fn run_dedup(&self, item: &Item) -> PipelineResult<(DedupResult, Vec<Item>)> {
        let pool = self
            .host
            .list_items(
                &item.repo,
                "open",
                item.kind,
                self.cfg.candidate_page_size,
            )
            .await?;

        let hits = if self.neighbors.is_enabled() {
            let embedding = self.similarity.embed(&item.embedding_text()).await?;
            match self
                .neighbors
                .query(
                    embedding.as_ref().clone(),
                    self.cfg.dedup.near_duplicate_threshold,
                    self.cfg.dedup.max_candidates,
                    item.number,
                )
                .await
            {
                Ok(hits) => hits,
                Err(err) => {
                    // The external index is optional evidence; local
                    // classification proceeds without it.
                    warn!("neighbor query failed: {err}");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let result = self.dedup.classify(item, &pool, &hits).await?;
        Ok((result, pool))
    }
}

/// Truncate to at most `max` chars on a char boundary.
fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
