//! Batch worker: triage every open PR of a repository.
//!
//! One item's failure never aborts the batch; failures are counted and the
//! loop moves on. Interesting findings (duplicates, base candidates) are
//! collected into a summary for the console.

use colored::Colorize;
use tracing::{info, warn};

use triage_core::{ItemKind, TriageStatus};

use crate::errors::PipelineResult;
use crate::pipeline::{StageToggles, TriagePipeline};
use crate::report::format_comment;

/// A duplicate found during a batch run.
#[derive(Debug, Clone)]
pub struct DuplicateEntry {
    pub number: u64,
    pub duplicate_of: u64,
    pub confidence: f32,
}

/// A base candidate found during a batch run.
#[derive(Debug, Clone)]
pub struct BaseEntry {
    pub number: u64,
    pub score: f32,
    pub competing: Vec<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub repo: String,
    pub total: usize,
    pub failed: usize,
    pub duplicates: Vec<DuplicateEntry>,
    pub base_candidates: Vec<BaseEntry>,
}

pub struct Worker {
    pipeline: TriagePipeline,
    /// When set, a formatted comment is posted back to each analyzed PR.
    post_comments: bool,
}

impl Worker {
    pub fn new(pipeline: TriagePipeline, post_comments: bool) -> Self {
        Self {
            pipeline,
            post_comments,
        }
    }

    /// Triage up to `limit` open PRs of `repo` sequentially.
    pub async fn run_batch(
        &self,
        repo: &str,
        limit: u32,
        toggles: &StageToggles,
    ) -> PipelineResult<BatchSummary> {
        info!("batch: start repo={repo} limit={limit}");
        let prs = self
            .pipeline
            .host()
            .list_items(repo, "open", ItemKind::PullRequest, limit)
            .await?;
        println!(
            "{} {} open PRs in {}",
            "Analyzing".bold(),
            prs.len(),
            repo
        );

        let mut summary = BatchSummary {
            repo: repo.to_string(),
            total: prs.len(),
            ..BatchSummary::default()
        };

        for (i, pr) in prs.iter().enumerate() {
            println!(
                "  [{}/{}] PR #{} {}",
                i + 1,
                prs.len(),
                pr.number,
                pr.title.dimmed()
            );
            let outcome = self
                .pipeline
                .run(repo, pr.number, ItemKind::PullRequest, toggles)
                .await;

            if outcome.status == TriageStatus::Failed {
                warn!(
                    "batch: PR #{} failed: {}",
                    pr.number,
                    outcome.error.as_deref().unwrap_or("unknown")
                );
                summary.failed += 1;
                continue;
            }

            if let Some(dedup) = &outcome.dedup {
                if dedup.is_duplicate {
                    if let Some(canonical) = &dedup.canonical {
                        summary.duplicates.push(DuplicateEntry {
                            number: pr.number,
                            duplicate_of: canonical.number,
                            confidence: dedup.confidence,
                        });
                    }
                }
            }

            if let Some(base) = &outcome.base {
                if base.is_base_candidate {
                    summary.base_candidates.push(BaseEntry {
                        number: pr.number,
                        score: base.score.total,
                        competing: base.competing_prs.clone(),
                    });
                }
            }

            if self.post_comments {
                let comment = format_comment(&outcome);
                if let Err(err) = self
                    .pipeline
                    .host()
                    .post_comment(repo, pr.number, &comment)
                    .await
                {
                    warn!("batch: comment on PR #{} failed: {err}", pr.number);
                }
            }
        }

        print_summary(&summary);
        Ok(summary)
    }
}

fn print_summary(summary: &BatchSummary) {
    println!();
    println!("{}", "Batch analysis complete".bold());
    println!("  PRs analyzed:    {}", summary.total);
    println!("  Failed:          {}", summary.failed);
    println!(
        "  Duplicates:      {}",
        summary.duplicates.len().to_string().yellow()
    );
    println!(
        "  Base candidates: {}",
        summary.base_candidates.len().to_string().green()
    );

    for d in &summary.duplicates {
        println!(
            "    PR #{} -> #{} ({:.0}%)",
            d.number,
            d.duplicate_of,
            d.confidence * 100.0
        );
    }
    for b in &summary.base_candidates {
        println!("    PR #{} (score: {:.0}%)", b.number, b.score * 100.0);
    }
}
