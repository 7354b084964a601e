/// Min-max normalize a score batch onto [0, 1]
///
/// A batch with no spread (all scores equal, including a single score)
/// maps to 0.5 for every element, keeping degenerate batches away from
/// both the floor and the ceiling of downstream thresholds.
pub fn min_max(scores: &[f32]) -> Vec<f32> {
    if scores.is_empty() {
        return Vec::new();
    }

    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &score in scores {
        min = min.min(score);
        max = max.max(score);
    }

    let range = max - min;
    if range <= f32::EPSILON {
        return vec![0.5; scores.len()];
    }

    scores.iter().map(|s| (s - min) / range).collect()
}

/// Blends normalized raw and rerank scores into the final score
///
/// Both inputs are normalized over the batch before blending, so the two
/// signals are compared on the same [0, 1] scale regardless of their
/// native units. When the rerank ensemble produced nothing, the raw
/// signal carries the full weight.
pub struct ScoreNormalizer {
    rerank_weight: f32,
    raw_weight: f32,
}

impl ScoreNormalizer {
    pub fn new(rerank_weight: f32, raw_weight: f32) -> Self {
        Self {
            rerank_weight,
            raw_weight,
        }
    }

    pub fn finalize(&self, raw_scores: &[f32], rerank_scores: Option<&[f32]>) -> Vec<f32> {
        let raw_norm = min_max(raw_scores);

        match rerank_scores {
            Some(rerank) => {
                let rerank_norm = min_max(rerank);
                raw_norm
                    .iter()
                    .zip(&rerank_norm)
                    .map(|(raw, rr)| self.raw_weight * raw + self.rerank_weight * rr)
                    .collect()
            }
            None => raw_norm,
        }
    }
}
