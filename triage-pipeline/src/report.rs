//! Markdown formatting of a triage outcome for posting back to the host.

use triage_core::{TriageOutcome, TriageStatus};

/// Render an outcome as a Markdown comment.
pub fn format_comment(outcome: &TriageOutcome) -> String {
    let mut lines: Vec<String> = vec![
        "## 🤖 Triage Analysis".to_string(),
        String::new(),
        format!("**Executive Summary:** {}", outcome.executive_summary),
        format!(
            "**Priority:** {}",
            outcome.priority.to_string().to_uppercase()
        ),
        format!("**Recommended Action:** {}", outcome.recommended_action),
        String::new(),
    ];

    if outcome.status == TriageStatus::Failed {
        lines.push("### ❌ Analysis Failed".to_string());
        if let Some(error) = &outcome.error {
            lines.push(error.clone());
        }
        lines.push(String::new());
        return lines.join("\n");
    }

    if let Some(dedup) = &outcome.dedup {
        if dedup.is_duplicate {
            lines.push("### ⚠️ Duplicate Detected".to_string());
            if let Some(canonical) = &dedup.canonical {
                lines.push(format!("Likely duplicate of #{}", canonical.number));
            }
            lines.push(String::new());
        }
    }

    if let Some(base) = &outcome.base {
        if base.is_base_candidate {
            lines.push("### ⭐ Base PR Candidate".to_string());
            lines.push(format!("Score: {:.0}%", base.score.total * 100.0));
            lines.push(String::new());
        }
    }

    if let Some(review) = &outcome.review {
        lines.push("### Code Review".to_string());
        lines.push(format!(
            "Quality: {:.0}%",
            review.overall_quality * 100.0
        ));
        lines.push(format!("Security: {}", review.security_risk));
        lines.push(String::new());

        if !review.findings.is_empty() {
            lines.push("**Findings:**".to_string());
            for finding in review.findings.iter().take(5) {
                lines.push(format!(
                    "- {}: {}",
                    finding.severity.to_uppercase(),
                    finding.message
                ));
            }
            lines.push(String::new());
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::{ItemKind, Priority, TriageOutcome};

    #[test]
    fn comment_carries_summary_priority_and_action() {
        let mut outcome = TriageOutcome::started(ItemKind::PullRequest, 7, "acme/widgets");
        outcome.status = TriageStatus::Completed;
        outcome.executive_summary = "✅ No duplicates detected".into();
        outcome.priority = Priority::High;
        outcome.recommended_action = "Ready for review".into();

        let comment = format_comment(&outcome);
        assert!(comment.contains("## 🤖 Triage Analysis"));
        assert!(comment.contains("**Priority:** HIGH"));
        assert!(comment.contains("Ready for review"));
    }

    #[test]
    fn failed_outcome_renders_the_error() {
        let mut outcome = TriageOutcome::started(ItemKind::PullRequest, 7, "acme/widgets");
        outcome.status = TriageStatus::Failed;
        outcome.error = Some("not found".into());

        let comment = format_comment(&outcome);
        assert!(comment.contains("Analysis Failed"));
        assert!(comment.contains("not found"));
    }
}
