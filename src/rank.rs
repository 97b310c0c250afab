//! Passage ranking: threshold filter, order, cap.
//!
//! Sits between the vector index search and the prompt composer. Candidates
//! that clear the score threshold are ordered by descending score (ties keep
//! their original retrieval order) and truncated to the passage cap.

use crate::models::{RankedPassage, ScoredPassage};

/// Filter, order, and cap search candidates.
///
/// - Keeps candidates with `score >= score_threshold` (inclusive).
/// - Sorts by descending score; the sort is stable, so equal scores preserve
///   retrieval order and the result is deterministic.
/// - Truncates to at most `max_passages` entries.
///
/// An empty result is a valid outcome (no candidate cleared the threshold),
/// not an error.
pub fn rank_passages(
    candidates: Vec<ScoredPassage>,
    score_threshold: f64,
    max_passages: usize,
) -> Vec<RankedPassage> {
    let mut ranked: Vec<RankedPassage> = candidates
        .into_iter()
        .filter(|c| c.score >= score_threshold)
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(max_passages);

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(id: &str, score: f64) -> ScoredPassage {
        ScoredPassage {
            id: id.to_string(),
            text: format!("text for {}", id),
            score,
            metadata: serde_json::json!({}),
        }
    }

    #[test]
    fn test_filters_below_threshold_and_orders_descending() {
        let candidates = vec![passage("1", 0.9), passage("2", 0.2), passage("3", 0.5)];
        let ranked = rank_passages(candidates, 0.35, 5);
        let ids: Vec<&str> = ranked.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(ranked[0].score, 0.9);
        assert_eq!(ranked[1].score, 0.5);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let ranked = rank_passages(vec![passage("a", 0.35)], 0.35, 5);
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn test_truncates_to_max_passages() {
        let candidates = (0..10)
            .map(|i| passage(&i.to_string(), 0.9 - i as f64 * 0.01))
            .collect();
        let ranked = rank_passages(candidates, 0.0, 3);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].id, "0");
    }

    #[test]
    fn test_ties_keep_retrieval_order() {
        let candidates = vec![passage("first", 0.5), passage("second", 0.5)];
        let ranked = rank_passages(candidates, 0.0, 5);
        let ids: Vec<&str> = ranked.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[test]
    fn test_empty_input_and_unreachable_threshold() {
        assert!(rank_passages(Vec::new(), 0.35, 5).is_empty());
        let candidates = vec![passage("a", 0.9), passage("b", 1.0)];
        assert!(rank_passages(candidates, 1.1, 5).is_empty());
    }

    #[test]
    fn test_idempotent_on_ranked_input() {
        let candidates = vec![passage("1", 0.9), passage("2", 0.2), passage("3", 0.5)];
        let once = rank_passages(candidates, 0.35, 5);
        let twice = rank_passages(once.clone(), 0.35, 5);
        let ids = |v: &[RankedPassage]| v.iter().map(|p| p.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&once), ids(&twice));
    }
}
