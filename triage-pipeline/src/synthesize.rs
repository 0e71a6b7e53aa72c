//! Outcome synthesis: executive summary, priority, recommended action.
//!
//! Each derivation only reads evidence that is actually present — an
//! absent analysis contributes no clause and never blocks the others.

use triage_core::{Item, Priority, TriageOutcome};

/// One short tagged clause per populated analysis, joined with " | ".
pub fn executive_summary(outcome: &TriageOutcome) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(dedup) = &outcome.dedup {
        if dedup.is_duplicate {
            if let Some(canonical) = &dedup.canonical {
                parts.push(format!("🔁 Likely duplicate of #{}", canonical.number));
            }
        } else if !dedup.similar_items.is_empty() {
            parts.push(format!(
                "📎 {} similar PR(s) found",
                dedup.similar_items.len()
            ));
        } else {
            parts.push("✅ No duplicates detected".to_string());
        }
    }

    if let Some(base) = &outcome.base {
        if base.is_base_candidate {
            parts.push("⭐ Base PR candidate".to_string());
        } else {
            parts.push(format!("📊 Base score: {:.2}", base.score.total));
        }
    }

    if let Some(review) = &outcome.review {
        let quality = review.overall_quality;
        let emoji = if quality >= 0.8 {
            "🟢"
        } else if quality >= 0.6 {
            "🟡"
        } else {
            "🔴"
        };
        parts.push(format!("{emoji} Quality: {:.0}%", quality * 100.0));

        if matches!(review.security_risk.as_str(), "high" | "critical") {
            parts.push(format!("🚨 Security: {}", review.security_risk));
        }
        if !review.breaking_changes.is_empty() {
            parts.push(format!(
                "⚠️ Breaking changes: {}",
                review.breaking_changes.len()
            ));
        }
    }

    if let Some(vision) = &outcome.vision {
        let alignment = vision.alignment_score;
        if alignment >= 0.8 {
            parts.push("✨ Vision aligned".to_string());
        } else if alignment <= 0.4 {
            parts.push("❌ Vision concerns".to_string());
        } else {
            parts.push(format!("🤔 Vision: {:.0}%", alignment * 100.0));
        }
    }

    if parts.is_empty() {
        return "Analysis complete".to_string();
    }
    parts.join(" | ")
}

/// Fixed precedence, first match wins: security ⇒ urgent; breaking
/// changes, vision misalignment or base candidacy ⇒ high; duplicate ⇒
/// low; otherwise normal.
pub fn priority(outcome: &TriageOutcome) -> Priority {
    if let Some(review) = &outcome.review {
        if matches!(review.security_risk.as_str(), "high" | "critical") {
            return Priority::Urgent;
        }
        if !review.breaking_changes.is_empty() {
            return Priority::High;
        }
    }

    if let Some(vision) = &outcome.vision {
        if vision.status == "misaligned" {
            return Priority::High;
        }
    }

    if let Some(base) = &outcome.base {
        if base.is_base_candidate {
            return Priority::High;
        }
    }

    if let Some(dedup) = &outcome.dedup {
        if dedup.is_duplicate {
            return Priority::Low;
        }
    }

    Priority::Normal
}

/// Applicable clauses appended in fixed order (duplicate → base →
/// security → findings → vision), joined by "; ".
pub fn action(outcome: &TriageOutcome) -> String {
    let mut actions: Vec<String> = Vec::new();

    if let Some(dedup) = &outcome.dedup {
        if dedup.is_duplicate {
            actions.push("Close as duplicate".to_string());
        }
    }

    if let Some(base) = &outcome.base {
        if base.is_base_candidate {
            actions.push("Prioritize for review".to_string());
        }
    }

    if let Some(review) = &outcome.review {
        if matches!(review.security_risk.as_str(), "high" | "critical") {
            actions.push("Security review required".to_string());
        }
        if !review.action_items.is_empty() {
            actions.push(format!("Address {} finding(s)", review.action_items.len()));
        }
    }

    if let Some(vision) = &outcome.vision {
        if vision.status == "misaligned" {
            actions.push("Vision discussion needed".to_string());
        } else if !vision.suggested_changes.is_empty() {
            actions.push("Consider suggested changes".to_string());
        }
    }

    if actions.is_empty() {
        return "Ready for review".to_string();
    }
    actions.join("; ")
}

/// Issues only run dedup; the summary reflects that.
pub fn issue_summary(outcome: &TriageOutcome) -> String {
    if let Some(dedup) = &outcome.dedup {
        if dedup.is_duplicate {
            if let Some(canonical) = &dedup.canonical {
                return format!("🔁 Duplicate of #{}", canonical.number);
            }
        }
        if !dedup.similar_items.is_empty() {
            return format!("📎 {} similar issue(s)", dedup.similar_items.len());
        }
    }
    "✅ No duplicates detected".to_string()
}

/// Label-driven priority for issues; duplicates are deprioritized.
pub fn issue_priority(item: &Item, outcome: &TriageOutcome) -> Priority {
    const URGENT_LABELS: [&str; 4] = ["bug", "critical", "security", "urgent"];
    if item
        .labels
        .iter()
        .any(|l| URGENT_LABELS.contains(&l.to_lowercase().as_str()))
    {
        return Priority::High;
    }
    if let Some(dedup) = &outcome.dedup {
        if dedup.is_duplicate {
            return Priority::Low;
        }
    }
    Priority::Normal
}

pub fn issue_action(outcome: &TriageOutcome) -> String {
    if let Some(dedup) = &outcome.dedup {
        if dedup.is_duplicate {
            return "Close and redirect to canonical issue".to_string();
        }
    }
    "Triage to appropriate maintainer".to_string()
}
