use crate::result::RankedResult;
use log::debug;
use serde::{Deserialize, Serialize};

/// What to return when every result falls below the minimum score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmptyPoolPolicy {
    /// Return no results
    Strict,
    /// Keep the single best-scoring result despite the threshold
    BestEffortTopOne,
}

/// Minimum-score filter over final scores
///
/// Keeps results whose final score reaches `min_score`, preserving input
/// order. An all-below pool is resolved by the configured policy instead
/// of silently returning the unfiltered list.
pub struct ThresholdFilter {
    min_score: f32,
    policy: EmptyPoolPolicy,
}

impl ThresholdFilter {
    pub fn new(min_score: f32, policy: EmptyPoolPolicy) -> Self {
        Self { min_score, policy }
    }

    pub fn apply(&self, results: Vec<RankedResult>) -> Vec<RankedResult> {
        if results.is_empty() {
            return results;
        }

        let any_kept = results.iter().any(|r| r.final_score >= self.min_score);
        if !any_kept {
            return match self.policy {
                EmptyPoolPolicy::Strict => {
                    debug!(
                        "All {} results below threshold {}, returning none",
                        results.len(),
                        self.min_score
                    );
                    Vec::new()
                }
                EmptyPoolPolicy::BestEffortTopOne => {
                    debug!(
                        "All {} results below threshold {}, keeping the best one",
                        results.len(),
                        self.min_score
                    );
                    let best = results.into_iter().max_by(|a, b| {
                        a.final_score
                            .partial_cmp(&b.final_score)
                            .unwrap_or(std::cmp::Ordering::Equal)
                            // On ties prefer the smaller chunk id
                            .then_with(|| b.chunk.id.cmp(&a.chunk.id))
                    });
                    best.into_iter().collect()
                }
            };
        }

        results
            .into_iter()
            .filter(|r| r.final_score >= self.min_score)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quarry_vector_index::Chunk;
    use std::sync::Arc;

    fn ranked(id: &str, final_score: f32) -> RankedResult {
        let mut result = RankedResult::new(
            Arc::new(Chunk::new(id, "file.rs", 1, 3, "fn body() {}")),
            final_score,
        );
        result.final_score = final_score;
        result
    }

    fn scores(results: &[RankedResult]) -> Vec<f32> {
        results.iter().map(|r| r.final_score).collect()
    }

    #[test]
    fn test_drops_results_below_threshold() {
        let filter = ThresholdFilter::new(0.5, EmptyPoolPolicy::Strict);
        let kept = filter.apply(vec![ranked("a", 0.8), ranked("b", 0.6), ranked("c", 0.3)]);
        assert_eq!(scores(&kept), vec![0.8, 0.6]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let filter = ThresholdFilter::new(0.5, EmptyPoolPolicy::Strict);
        let kept = filter.apply(vec![ranked("a", 0.5)]);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_all_below_strict_returns_empty() {
        let filter = ThresholdFilter::new(0.5, EmptyPoolPolicy::Strict);
        let kept = filter.apply(vec![ranked("a", 0.4), ranked("b", 0.2)]);
        assert!(kept.is_empty());
    }

    #[test]
    fn test_all_below_best_effort_keeps_top_one() {
        let filter = ThresholdFilter::new(0.5, EmptyPoolPolicy::BestEffortTopOne);
        let kept = filter.apply(vec![ranked("a", 0.2), ranked("b", 0.4), ranked("c", 0.1)]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].chunk.id, "b");
    }

    #[test]
    fn test_best_effort_tie_prefers_smaller_id() {
        let filter = ThresholdFilter::new(0.9, EmptyPoolPolicy::BestEffortTopOne);
        let kept = filter.apply(vec![ranked("beta", 0.3), ranked("alpha", 0.3)]);
        assert_eq!(kept[0].chunk.id, "alpha");
    }

    #[test]
    fn test_empty_input_passthrough() {
        let filter = ThresholdFilter::new(0.5, EmptyPoolPolicy::BestEffortTopOne);
        assert!(filter.apply(Vec::new()).is_empty());
    }
}
