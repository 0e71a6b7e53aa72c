//! Base-candidate detection among competing pull requests.
//!
//! Scores every member of `{target} ∪ competitors` with the same five
//! signals against the same set, ranks by weighted total, and names the
//! target base candidate only when it both ranks first and clears the
//! configured quality floor — first place alone is not enough when quality
//! is universally low.

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::debug;

use triage_core::{BaseDetectionConfig, BaseResult, BaseScore, Item, ItemId};

pub struct BaseCandidateScorer {
    cfg: BaseDetectionConfig,
}

impl BaseCandidateScorer {
    pub fn new(cfg: BaseDetectionConfig) -> Self {
        Self { cfg }
    }

    /// Score `target` against its competitors. Pure and synchronous;
    /// identical inputs always produce identical rankings and totals.
    pub fn score(&self, target: &Item, competitors: &[Item]) -> BaseResult {
        // Merge and deduplicate by identifier, target first.
        let mut seen: HashSet<ItemId> = HashSet::new();
        let mut all: Vec<&Item> = Vec::with_capacity(competitors.len() + 1);
        seen.insert(target.id());
        all.push(target);
        for c in competitors {
            if seen.insert(c.id()) {
                all.push(c);
            }
        }

        let mut ranked: Vec<(&Item, BaseScore)> = all
            .iter()
            .map(|&item| (item, self.calculate(item, &all)))
            .collect();
        // Stable sort: ties keep iteration order (not semantically
        // meaningful).
        ranked.sort_by(|a, b| {
            b.1.total
                .partial_cmp(&a.1.total)
                .unwrap_or(Ordering::Equal)
        });

        let is_first = ranked[0].0.id() == target.id();
        let target_score = ranked
            .iter()
            .find(|(item, _)| item.id() == target.id())
            .map(|(_, s)| *s)
            .expect("target is always a member of the ranked set");

        let competing_prs: Vec<u64> = ranked
            .iter()
            .filter(|(item, _)| item.id() != target.id())
            .map(|(item, _)| item.number)
            .collect();

        let reasoning = reasoning_for(target, &target_score, &ranked, is_first);
        let recommendation = recommendation_for(is_first, &ranked);
        let is_base_candidate = is_first && target_score.total >= self.cfg.min_quality_score;

        debug!(
            "base: {} rank_first={} total={:.2} competitors={}",
            target.id(),
            is_first,
            target_score.total,
            competing_prs.len()
        );

        BaseResult {
            is_base_candidate,
            score: target_score,
            reasoning,
            competing_prs,
            recommendation,
        }
    }

    fn calculate(&self, item: &Item, all: &[&Item]) -> BaseScore {
        let chronological = self.score_chronological(item, all);
        let quality = self.score_quality(item);
        let engagement = score_engagement(item);
        let author = score_author(item);
        let completeness = score_completeness(item);

        let total = chronological * self.cfg.weight_chronological
            + quality * self.cfg.weight_quality
            + engagement * self.cfg.weight_engagement
            + author * self.cfg.weight_author
            + completeness * self.cfg.weight_completeness;

        BaseScore {
            chronological,
            quality,
            engagement,
            author,
            completeness,
            total,
        }
    }

    /// Being first to address the problem matters a lot: exponential decay
    /// over the zero-based chronological rank.
    fn score_chronological(&self, item: &Item, all: &[&Item]) -> f32 {
        if all.len() <= 1 {
            return 1.0;
        }
        let mut by_age: Vec<&Item> = all.to_vec();
        by_age.sort_by_key(|i| i.created_at);
        match by_age.iter().position(|i| i.id() == item.id()) {
            Some(position) => (-0.5 * position as f32).exp(),
            None => 0.5,
        }
    }

    fn score_quality(&self, item: &Item) -> f32 {
        let mut scores: Vec<f32> = Vec::with_capacity(4);

        scores.push(if item.has_tests { 1.0 } else { 0.3 });
        scores.push(if item.has_docs { 1.0 } else { 0.5 });

        if let Some(coverage) = item.test_coverage {
            scores.push((coverage / self.cfg.min_test_coverage).min(1.0));
        }

        let total_lines = item.lines_changed();
        scores.push(if (10..=500).contains(&total_lines) {
            1.0
        } else if total_lines < 10 {
            0.5
        } else if total_lines < 1000 {
            0.8
        } else {
            0.5
        });

        scores.iter().sum::<f32>() / scores.len() as f32
    }
}

fn score_engagement(item: &Item) -> f32 {
    let total = item.comments_count + item.review_comments_count + item.reactions_count;
    match total {
        20.. => 1.0,
        10..=19 => 0.8,
        5..=9 => 0.6,
        1..=4 => 0.4,
        0 => 0.2,
    }
}

fn score_author(item: &Item) -> f32 {
    match item.author.contributions_count {
        50.. => 1.0,
        20..=49 => 0.9,
        10..=19 => 0.8,
        5..=9 => 0.7,
        1..=4 => 0.6,
        0 => {
            if item.author.is_first_time {
                0.3
            } else {
                0.4
            }
        }
    }
}

fn score_completeness(item: &Item) -> f32 {
    let body_len = item.body.as_deref().map(str::len).unwrap_or(0);
    let body_score = if body_len > 100 {
        1.0
    } else if body_len > 0 {
        0.6
    } else {
        0.3
    };

    let files_score = if item.files_changed.len() >= 3 {
        1.0
    } else if item.files_changed.len() >= 2 {
        0.8
    } else {
        0.6
    };

    let draft_score = if item.is_draft { 0.4 } else { 1.0 };

    (body_score + files_score + draft_score) / 3.0
}

fn reasoning_for(
    target: &Item,
    score: &BaseScore,
    ranked: &[(&Item, BaseScore)],
    is_first: bool,
) -> String {
    let mut parts: Vec<String> = Vec::new();

    if is_first {
        parts.push(format!(
            "PR #{} scores highest ({:.2}) among {} competing PRs.",
            target.number,
            score.total,
            ranked.len()
        ));
    } else {
        let (winner, winner_score) = &ranked[0];
        parts.push(format!(
            "PR #{} scores {:.2}, below #{} ({:.2}).",
            target.number, score.total, winner.number, winner_score.total
        ));
    }

    // Fixed signal order in both lists.
    let signals = [
        (score.chronological, "early submission", "late submission"),
        (score.quality, "high code quality", "quality concerns"),
        (
            score.engagement,
            "strong community engagement",
            "low engagement",
        ),
        (score.author, "experienced contributor", "new contributor"),
        (score.completeness, "complete solution", "incomplete solution"),
    ];

    let strengths: Vec<&str> = signals
        .iter()
        .filter(|(v, _, _)| *v >= 0.8)
        .map(|(_, s, _)| *s)
        .collect();
    if !strengths.is_empty() {
        parts.push(format!("Strengths: {}.", strengths.join(", ")));
    }

    let concerns: Vec<&str> = signals
        .iter()
        .filter(|(v, _, _)| *v < 0.5)
        .map(|(_, _, c)| *c)
        .collect();
    if !concerns.is_empty() {
        parts.push(format!("Concerns: {}.", concerns.join(", ")));
    }

    parts.join(" ")
}

fn recommendation_for(is_first: bool, ranked: &[(&Item, BaseScore)]) -> String {
    if is_first {
        if ranked.len() > 1 {
            let others = ranked[1..]
                .iter()
                .map(|(p, _)| format!("#{}", p.number))
                .collect::<Vec<_>>()
                .join(", ");
            return format!(
                "This appears to be the base PR. Consider merging this one and closing {others} \
                 as duplicates."
            );
        }
        return "This is the primary implementation. Ready for final review.".to_string();
    }
    let winner = ranked[0].0;
    format!(
        "Consider closing this in favor of #{} which scores higher. Alternatively, identify \
         what this PR does better and suggest incorporating those improvements into the base PR.",
        winner.number
    )
}
