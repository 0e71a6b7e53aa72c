//! Vision-alignment analyzer: does a change fit the project's stated
//! direction?
//!
//! The vision document is loaded once at construction from the configured
//! path, falling back to a built-in default. Without a model the check
//! scores vocabulary overlap between the item and the vision document —
//! project-agnostic, no hard-coded keyword list.

use std::path::Path;

use llm_service::{CompletionClient, CompletionRequest};
use tracing::warn;

use triage_core::{Item, VisionConfig, VisionReport};

use crate::extract::extract_json_object;

const DEFAULT_VISION: &str = "\
# Project Vision

## Mission
Keep the project focused, dependable, and maintainable for the community
that relies on it.

## Core Principles

1. **Small, reviewable changes**: prefer incremental improvements over
   sweeping rewrites
2. **Tests and docs travel with code**: every change ships with coverage
   and documentation
3. **Compatibility**: no breaking changes without a migration path
4. **Scope discipline**: features must serve the core use case

## What We Avoid

- Scope creep and speculative features
- Large rewrites without prior discussion
- Breaking changes without migration paths
";

pub enum VisionAnalyzer {
    Heuristic {
        cfg: VisionConfig,
        vision: String,
    },
    Llm {
        client: CompletionClient,
        cfg: VisionConfig,
        vision: String,
        model: String,
    },
}

impl VisionAnalyzer {
    /// LLM-backed when a client is available, heuristic otherwise. The
    /// vision document is read from `cfg.vision_doc_path` when present.
    pub fn from_client(client: Option<CompletionClient>, cfg: VisionConfig, model: &str) -> Self {
        let vision = load_vision(&cfg.vision_doc_path);
        match client {
            Some(client) => Self::Llm {
                client,
                cfg,
                vision,
                model: model.to_string(),
            },
            None => Self::Heuristic { cfg, vision },
        }
    }

    pub async fn check(&self, item: &Item, diff_summary: Option<&str>) -> VisionReport {
        match self {
            Self::Heuristic { cfg, vision } => heuristic_check(item, vision, cfg),
            Self::Llm {
                client,
                cfg,
                vision,
                model,
            } => {
                let prompt = build_check_prompt(item, vision, diff_summary);
                let req = CompletionRequest {
                    prompt: &prompt,
                    model,
                    max_tokens: cfg.max_tokens,
                    temperature: cfg.temperature,
                };
                match client.complete(&req).await {
                    Ok(raw) => parse_vision_response(&raw),
                    Err(err) => {
                        warn!("vision: completion failed, using heuristics: {err}");
                        let mut report = heuristic_check(item, vision, cfg);
                        report
                            .concerns
                            .push("Model alignment check unavailable".into());
                        report
                    }
                }
            }
        }
    }
}

fn load_vision(path: &str) -> String {
    match std::fs::read_to_string(Path::new(path)) {
        Ok(text) => text,
        Err(_) => DEFAULT_VISION.to_string(),
    }
}

fn build_check_prompt(item: &Item, vision: &str, diff_summary: Option<&str>) -> String {
    let mut prompt = format!(
        "You are a maintainer reviewing a PR against the project vision. Assess alignment.\n\n\
         ## Project Vision\n\n{vision}\n\n\
         ## PR Information\n\n\
         Title: {}\n\
         Description: {}\n\
         Files Changed: {}\n\
         Labels: {}\n\n",
        item.title,
        item.body.as_deref().unwrap_or("No description"),
        item.files_changed.join(", "),
        item.labels.join(", "),
    );

    if let Some(summary) = diff_summary {
        prompt.push_str(&format!("## Changes Summary\n\n{summary}\n\n"));
    }

    prompt.push_str(
        "## Assessment Instructions\n\n\
         Analyze this PR against the project vision and return ONLY JSON with this exact \
         shape:\n\n\
         {\"alignment_score\": 0.85, \"status\": \"aligned\", \"fits_vision\": [\"...\"], \
         \"concerns\": [\"...\"], \"recommendation\": \"...\", \"suggested_changes\": \
         [\"...\"]}\n\n\
         Status is one of \"aligned\", \"needs_discussion\", \"misaligned\". Be objective \
         and constructive.",
    );

    prompt
}

fn parse_vision_response(raw: &str) -> VisionReport {
    let parsed = extract_json_object(raw).and_then(|json| serde_json::from_str(json).ok());
    match parsed {
        Some(report) => report,
        None => {
            warn!("vision: model response had no parseable JSON");
            VisionReport {
                alignment_score: 0.5,
                status: "needs_discussion".into(),
                fits_vision: Vec::new(),
                concerns: vec!["Model response could not be parsed".into()],
                recommendation: "Manual review required".into(),
                suggested_changes: Vec::new(),
            }
        }
    }
}

/// Model-free alignment check: vocabulary overlap with the vision document
/// plus a size sanity bound.
fn heuristic_check(item: &Item, vision: &str, cfg: &VisionConfig) -> VisionReport {
    use std::collections::HashSet;

    let vision_vocab: HashSet<String> = tokens(vision);
    let combined = format!("{} {}", item.title, item.body.as_deref().unwrap_or(""));
    let item_tokens = tokens(&combined);

    let mut fits: Vec<String> = Vec::new();
    let mut concerns: Vec<String> = Vec::new();

    let overlap = item_tokens.intersection(&vision_vocab).count();
    if overlap >= 5 {
        fits.push("Shares vocabulary with the project vision".into());
    }
    if item_tokens.contains("test") || item_tokens.contains("tests") {
        fits.push("Includes testing".into());
    }

    if combined.to_lowercase().contains("breaking change") {
        concerns.push("Mentions breaking changes - verify a migration path exists".into());
    }
    if item.lines_changed() > 2000 {
        concerns.push("Large change - review carefully for scope creep".into());
    }

    let score = (0.7 + 0.1 * fits.len() as f32 - 0.15 * concerns.len() as f32).clamp(0.0, 1.0);

    let status = if score >= cfg.alignment_threshold {
        "aligned"
    } else if score <= cfg.auto_reject_threshold {
        "misaligned"
    } else {
        "needs_discussion"
    };

    VisionReport {
        alignment_score: score,
        status: status.into(),
        fits_vision: if fits.is_empty() {
            vec!["No strong signals either way".into()]
        } else {
            fits
        },
        concerns,
        recommendation: "Automated basic check - human review recommended".into(),
        suggested_changes: Vec::new(),
    }
}

fn tokens(text: &str) -> std::collections::HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 2)
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use triage_core::{Author, ItemKind};

    fn item(title: &str, body: &str, lines: u64) -> Item {
        Item {
            kind: ItemKind::PullRequest,
            number: 3,
            repo: "acme/widgets".into(),
            title: title.into(),
            body: Some(body.into()),
            author: Author::default(),
            state: "open".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            closed_at: None,
            merged_at: None,
            branch: None,
            base_branch: None,
            files_changed: Vec::new(),
            additions: lines,
            deletions: 0,
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

    #[test]
    fn on_theme_small_change_is_aligned() {
        let cfg = VisionConfig::default();
        let report = heuristic_check(
            &item(
                "Add incremental migration tests",
                "Small reviewable change with tests and documentation for the core use case",
                120,
            ),
            DEFAULT_VISION,
            &cfg,
        );
        assert_eq!(report.status, "aligned");
        assert!(report.alignment_score >= cfg.alignment_threshold);
    }

    #[test]
    fn huge_off_theme_change_raises_concerns() {
        let cfg = VisionConfig::default();
        let report = heuristic_check(
            &item("Rework everything", "breaking change to the whole API", 5000),
            DEFAULT_VISION,
            &cfg,
        );
        assert!(!report.concerns.is_empty());
        assert!(report.alignment_score < cfg.alignment_threshold);
    }

    #[test]
    fn valid_model_json_is_parsed() {
        let raw = r#"{"alignment_score": 0.9, "status": "aligned",
            "fits_vision": ["scoped"], "concerns": [],
            "recommendation": "merge", "suggested_changes": []}"#;
        let report = parse_vision_response(raw);
        assert_eq!(report.status, "aligned");
        assert!((report.alignment_score - 0.9).abs() < 1e-6);
    }

    #[test]
    fn unparseable_output_needs_discussion() {
        let report = parse_vision_response("nope");
        assert_eq!(report.status, "needs_discussion");
        assert!(!report.concerns.is_empty());
    }
}
