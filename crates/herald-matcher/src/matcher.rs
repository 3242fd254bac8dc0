//! Best-match selection over one platform's candidate list.

use chrono::{DateTime, Utc};
use herald_core::{CandidateEpisode, PlatformMatch};

use crate::scorer::score;

/// A candidate paired with its matching cost.
#[derive(Debug, Clone, Copy)]
pub struct ScoredCandidate<'a> {
    pub candidate: &'a CandidateEpisode,
    pub score: f64,
}

/// Score every candidate against the target, cheapest first.
///
/// The sort is stable, so candidates with equal scores keep input order.
#[must_use]
pub fn rank_candidates<'a>(
    candidates: &'a [CandidateEpisode],
    target_title: &str,
    target_date: DateTime<Utc>,
) -> Vec<ScoredCandidate<'a>> {
    let mut ranked: Vec<ScoredCandidate<'a>> = candidates
        .iter()
        .map(|candidate| ScoredCandidate {
            candidate,
            score: score(
                target_title,
                target_date,
                &candidate.display_name,
                candidate.release_date,
            ),
        })
        .collect();
    ranked.sort_by(|a, b| a.score.total_cmp(&b.score));
    ranked
}

/// Pick the candidate that best matches `(target_title, target_date)`.
///
/// Returns `None` when `candidates` is empty, or when the winning candidate
/// has no usable id or link. A runner-up is never promoted in that case.
#[must_use]
pub fn find_best_match(
    candidates: &[CandidateEpisode],
    target_title: &str,
    target_date: DateTime<Utc>,
) -> Option<PlatformMatch> {
    let mut best: Option<(&CandidateEpisode, f64)> = None;
    for candidate in candidates {
        let cost = score(
            target_title,
            target_date,
            &candidate.display_name,
            candidate.release_date,
        );
        // Strict comparison: the first minimal element wins ties.
        if best.is_none_or(|(_, best_cost)| cost < best_cost) {
            best = Some((candidate, cost));
        }
    }

    let (winner, _) = best?;
    Some(PlatformMatch {
        episode_id: winner.usable_id()?.to_string(),
        link: winner.usable_url()?.to_string(),
    })
}
