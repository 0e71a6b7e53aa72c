//! Code-review analyzer: LLM-backed when a completion client is
//! configured, deterministic signal-based heuristics otherwise.
//!
//! Unusable model output never aborts a triage run — it degrades to a
//! placeholder report carrying an explicit "review manually" action.

use llm_service::{CompletionClient, CompletionRequest};
use tracing::warn;

use triage_core::{Item, ReviewConfig, ReviewFinding, ReviewReport};

use crate::extract::extract_json_object;

pub enum ReviewAnalyzer {
    /// No model configured: review from the item's own quality signals.
    Heuristic,
    Llm {
        client: CompletionClient,
        cfg: ReviewConfig,
    },
}

impl ReviewAnalyzer {
    /// LLM-backed when a client is available, heuristic otherwise.
    pub fn from_client(client: Option<CompletionClient>, cfg: ReviewConfig) -> Self {
        match client {
            Some(client) => Self::Llm { client, cfg },
            None => Self::Heuristic,
        }
    }

    pub async fn review(&self, item: &Item, diff: Option<&str>) -> ReviewReport {
        match self {
            Self::Heuristic => heuristic_review(item),
            Self::Llm { client, cfg } => {
                let prompt = build_review_prompt(item, diff, cfg.max_diff_chars);
                let req = CompletionRequest {
                    prompt: &prompt,
                    model: &cfg.model,
                    max_tokens: cfg.max_tokens,
                    temperature: cfg.temperature,
                };
                match client.complete(&req).await {
                    Ok(raw) => parse_review_response(&raw),
                    Err(err) => {
                        warn!("review: completion failed, using heuristics: {err}");
                        let mut report = heuristic_review(item);
                        report
                            .action_items
                            .push("Model review unavailable - heuristic assessment only".into());
                        report
                    }
                }
            }
        }
    }
}

fn build_review_prompt(item: &Item, diff: Option<&str>, max_diff_chars: usize) -> String {
    let author_note = if item.author.is_first_time {
        "first-time contributor".to_string()
    } else {
        format!("{} contributions", item.author.contributions_count)
    };

    let mut prompt = format!(
        "You are an expert code reviewer analyzing a pull request. Provide a thorough, \
         actionable review.\n\n\
         ## PR Information\n\n\
         Title: {}\n\
         Description: {}\n\
         Author: {} ({})\n\
         Files Changed: {}\n\
         Additions: {}\n\
         Deletions: {}\n\
         Has Tests: {}\n\
         Has Docs: {}\n\n",
        item.title,
        item.body.as_deref().unwrap_or("No description provided"),
        item.author.username,
        author_note,
        item.files_changed.len(),
        item.additions,
        item.deletions,
        if item.has_tests { "Yes" } else { "No" },
        if item.has_docs { "Yes" } else { "No" },
    );

    if let Some(diff) = diff {
        let truncated: String = diff.chars().take(max_diff_chars).collect();
        prompt.push_str(&format!("## Diff Content\n\n```diff\n{truncated}\n```\n\n"));
    }

    prompt.push_str(
        "## Review Instructions\n\n\
         Analyze this PR and provide:\n\n\
         1. **Summary**: a concise summary of what this PR does and its overall quality\n\
         2. **Findings**: specific issues with severity (critical/high/medium/low/info), \
         category (security/performance/style/logic/testing/docs), file/line references when \
         possible, and actionable suggestions\n\
         3. **Overall Quality Score**: 0.0-1.0\n\
         4. **Test Coverage Assessment**: brief evaluation\n\
         5. **Security Risk**: low, medium, high, or critical\n\
         6. **Breaking Changes**: list any\n\
         7. **Action Items**: prioritized list\n\n\
         Return ONLY JSON with this exact shape:\n\n\
         {\"summary\": \"...\", \"findings\": [{\"severity\": \"high\", \"category\": \
         \"security\", \"file\": \"path\", \"line\": 42, \"message\": \"...\", \"suggestion\": \
         \"...\"}], \"overall_quality\": 0.75, \"test_coverage_assessment\": \"...\", \
         \"security_risk\": \"medium\", \"breaking_changes\": [\"...\"], \"action_items\": \
         [\"...\"]}\n\n\
         Be thorough but concise. Focus on issues that actually matter, not nitpicks.",
    );

    prompt
}

/// Parse the model response; unparseable output degrades to a placeholder
/// report instead of an error.
fn parse_review_response(raw: &str) -> ReviewReport {
    let parsed = extract_json_object(raw).and_then(|json| serde_json::from_str(json).ok());
    match parsed {
        Some(report) => report,
        None => {
            warn!("review: model response had no parseable JSON");
            let excerpt: String = raw.chars().take(200).collect();
            ReviewReport {
                summary: format!("Model response could not be parsed. Raw excerpt: {excerpt}"),
                findings: Vec::new(),
                overall_quality: 0.5,
                test_coverage_assessment: "Unable to assess".into(),
                security_risk: "unknown".into(),
                breaking_changes: Vec::new(),
                action_items: vec!["Review manually - automated analysis failed".into()],
            }
        }
    }
}

/// Review from the item's own signals, no model involved.
fn heuristic_review(item: &Item) -> ReviewReport {
    let mut findings: Vec<ReviewFinding> = Vec::new();
    let mut action_items: Vec<String> = Vec::new();

    if !item.has_tests {
        findings.push(finding(
            "medium",
            "testing",
            "No tests detected",
            "Add unit tests for new functionality",
        ));
        action_items.push("Add tests".into());
    }

    if !item.has_docs {
        findings.push(finding(
            "low",
            "docs",
            "No documentation updates",
            "Update documentation if user-facing changes",
        ));
    }

    let total_lines = item.lines_changed();
    if total_lines > 1000 {
        findings.push(finding(
            "medium",
            "style",
            &format!("Large PR ({total_lines} lines changed)"),
            "Consider breaking into smaller PRs",
        ));
        action_items.push("Consider splitting PR".into());
    }

    let body_len = item.body.as_deref().map(str::len).unwrap_or(0);
    if body_len < 50 {
        findings.push(finding(
            "low",
            "docs",
            "Brief or missing description",
            "Add more context about the changes",
        ));
    }

    let mut quality: f32 = 0.7;
    if item.has_tests {
        quality += 0.15;
    }
    if item.has_docs {
        quality += 0.1;
    }
    if total_lines < 500 {
        quality += 0.05;
    }

    ReviewReport {
        summary: format!(
            "Basic automated review for PR #{}. {} finding(s).",
            item.number,
            findings.len()
        ),
        findings,
        overall_quality: quality.min(1.0),
        test_coverage_assessment: if item.has_tests {
            "Tests present".into()
        } else {
            "No tests detected".into()
        },
        security_risk: "unknown".into(),
        breaking_changes: Vec::new(),
        action_items: if action_items.is_empty() {
            vec!["Ready for human review".into()]
        } else {
            action_items
        },
    }
}

fn finding(severity: &str, category: &str, message: &str, suggestion: &str) -> ReviewFinding {
    ReviewFinding {
        severity: severity.into(),
        category: category.into(),
        file: None,
        line: None,
        message: message.into(),
        suggestion: Some(suggestion.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use triage_core::{Author, ItemKind};

    fn item(has_tests: bool, has_docs: bool) -> Item {
        Item {
            kind: ItemKind::PullRequest,
            number: 5,
            repo: "acme/widgets".into(),
            title: "Add widget".into(),
            body: Some("A short body".into()),
            author: Author::default(),
            state: "open".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            closed_at: None,
            merged_at: None,
            branch: None,
            base_branch: None,
            files_changed: vec!["src/widget.rs".into()],
            additions: 50,
            deletions: 5,
            is_draft: false,
            comments_count: 0,
            review_comments_count: 0,
            reactions_count: 0,
            has_tests,
            has_docs,
            test_coverage: None,
            labels: Vec::new(),
        }
    }

    #[test]
    fn heuristic_review_flags_missing_tests() {
        let report = heuristic_review(&item(false, true));
        assert!(report.findings.iter().any(|f| f.category == "testing"));
        assert!(report.action_items.contains(&"Add tests".to_string()));
    }

    #[test]
    fn heuristic_review_rewards_tests_and_docs() {
        let with = heuristic_review(&item(true, true));
        let without = heuristic_review(&item(false, false));
        assert!(with.overall_quality > without.overall_quality);
    }

    #[test]
    fn valid_model_json_is_parsed() {
        let raw = r#"Sure, here is my review:
```json
{"summary": "Solid change", "findings": [], "overall_quality": 0.9,
 "test_coverage_assessment": "good", "security_risk": "low",
 "breaking_changes": [], "action_items": ["merge"]}
```"#;
        let report = parse_review_response(raw);
        assert_eq!(report.summary, "Solid change");
        assert_eq!(report.security_risk, "low");
        assert_eq!(report.action_items, vec!["merge".to_string()]);
    }

    #[test]
    fn partial_model_json_fills_defaults() {
        let report = parse_review_response(r#"{"summary": "ok"}"#);
        assert_eq!(report.summary, "ok");
        assert_eq!(report.security_risk, "low");
        assert_eq!(report.overall_quality, 0.5);
    }

    #[test]
    fn unparseable_output_degrades_to_placeholder() {
        let report = parse_review_response("I could not produce JSON today.");
        assert_eq!(report.security_risk, "unknown");
        assert!(report
            .action_items
            .contains(&"Review manually - automated analysis failed".to_string()));
    }
}
