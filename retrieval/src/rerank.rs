use crate::config::SearchConfig;
use crate::normalize::min_max;
use async_trait::async_trait;
use log::{debug, warn};
use quarry_vector_index::Chunk;
use std::sync::Arc;
use std::time::Duration;

/// Opaque pairwise relevance scorer
///
/// Implementations typically wrap a cross-attention model scoring
/// (query, text) pairs. One score per text, in input order.
#[async_trait]
pub trait PairwiseScorer: Send + Sync {
    async fn score_batch(&self, query: &str, texts: &[String]) -> anyhow::Result<Vec<f32>>;
}

/// One named signal in the rerank ensemble
///
/// Scores are on a strategy-local scale; the ensemble min-max normalizes
/// each batch before weighting, so strategies never need to agree on units.
#[async_trait]
pub trait ScoringStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// One raw score per candidate, in input order
    async fn score(&self, query: &str, candidates: &[Arc<Chunk>]) -> anyhow::Result<Vec<f32>>;
}

/// Pairwise model scoring with a deadline and bounded retry
pub struct PairwiseStrategy {
    scorer: Arc<dyn PairwiseScorer>,
    timeout: Duration,
    retries: u32,
    max_chars: usize,
}

impl PairwiseStrategy {
    pub fn new(scorer: Arc<dyn PairwiseScorer>, config: &SearchConfig) -> Self {
        Self {
            scorer,
            timeout: Duration::from_millis(config.rerank_timeout_ms),
            retries: config.rerank_retries,
            max_chars: config.rerank_max_chars,
        }
    }
}

#[async_trait]
impl ScoringStrategy for PairwiseStrategy {
    fn name(&self) -> &'static str {
        "pairwise"
    }

    async fn score(&self, query: &str, candidates: &[Arc<Chunk>]) -> anyhow::Result<Vec<f32>> {
        let texts: Vec<String> = candidates
            .iter()
            .map(|c| c.content.chars().take(self.max_chars).collect())
            .collect();

        let mut last_error = anyhow::anyhow!("pairwise scorer was never called");
        for attempt in 0..=self.retries {
            match tokio::time::timeout(self.timeout, self.scorer.score_batch(query, &texts)).await
            {
                Ok(Ok(scores)) => return Ok(scores),
                Ok(Err(e)) => {
                    warn!("Pairwise scoring attempt {attempt} failed: {e}");
                    last_error = e;
                }
                Err(_) => {
                    warn!(
                        "Pairwise scoring attempt {attempt} timed out after {:?}",
                        self.timeout
                    );
                    last_error = anyhow::anyhow!("pairwise scoring timed out");
                }
            }
        }
        Err(last_error)
    }
}

/// Fraction of distinct query terms present in the chunk content
pub struct LexicalOverlapStrategy;

#[async_trait]
impl ScoringStrategy for LexicalOverlapStrategy {
    fn name(&self) -> &'static str {
        "lexical_overlap"
    }

    async fn score(&self, query: &str, candidates: &[Arc<Chunk>]) -> anyhow::Result<Vec<f32>> {
        let mut terms: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        terms.sort();
        terms.dedup();

        if terms.is_empty() {
            return Ok(vec![0.0; candidates.len()]);
        }

        Ok(candidates
            .iter()
            .map(|chunk| {
                let content = chunk.content.to_lowercase();
                let matched = terms.iter().filter(|t| content.contains(t.as_str())).count();
                matched as f32 / terms.len() as f32
            })
            .collect())
    }
}

/// Ingestion timestamp as a freshness signal
///
/// Chunks without a timestamp score 0 and end up at the batch minimum
/// after normalization.
pub struct RecencyStrategy;

#[async_trait]
impl ScoringStrategy for RecencyStrategy {
    fn name(&self) -> &'static str {
        "recency"
    }

    async fn score(&self, _query: &str, candidates: &[Arc<Chunk>]) -> anyhow::Result<Vec<f32>> {
        Ok(candidates
            .iter()
            .map(|chunk| chunk.metadata.indexed_at.unwrap_or(0) as f32)
            .collect())
    }
}

/// Weighted ensemble over scoring strategies
///
/// Each strategy's batch is min-max normalized, then combined by weight.
/// A strategy that fails or returns the wrong number of scores is dropped
/// for that call and the remaining weights are renormalized, so one broken
/// signal reweights the others instead of zeroing them. `rerank` returns
/// `None` only when every strategy dropped out.
pub struct EnsembleReranker {
    strategies: Vec<(Box<dyn ScoringStrategy>, f32)>,
}

impl EnsembleReranker {
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    pub fn push(&mut self, strategy: Box<dyn ScoringStrategy>, weight: f32) {
        self.strategies.push((strategy, weight));
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub async fn rerank(&self, query: &str, candidates: &[Arc<Chunk>]) -> Option<Vec<f32>> {
        if candidates.is_empty() {
            return Some(Vec::new());
        }

        let mut surviving: Vec<(f32, Vec<f32>)> = Vec::with_capacity(self.strategies.len());
        for (strategy, weight) in &self.strategies {
            match strategy.score(query, candidates).await {
                Ok(scores) if scores.len() == candidates.len() => {
                    debug!("Strategy '{}' scored {} candidates", strategy.name(), scores.len());
                    surviving.push((*weight, min_max(&scores)));
                }
                Ok(scores) => {
                    warn!(
                        "Strategy '{}' returned {} scores for {} candidates, dropping it",
                        strategy.name(),
                        scores.len(),
                        candidates.len()
                    );
                }
                Err(e) => {
                    warn!("Strategy '{}' failed, dropping it: {e}", strategy.name());
                }
            }
        }

        if surviving.is_empty() {
            return None;
        }

        let total_weight: f32 = surviving.iter().map(|(w, _)| w).sum();
        let mut combined = vec![0.0f32; candidates.len()];
        for (weight, scores) in &surviving {
            // Renormalize so surviving weights sum to 1; if every surviving
            // weight is 0, fall back to an equal split
            let share = if total_weight > f32::EPSILON {
                weight / total_weight
            } else {
                1.0 / surviving.len() as f32
            };
            for (slot, score) in combined.iter_mut().zip(scores) {
                *slot += share * score;
            }
        }

        Some(combined)
    }
}

impl Default for EnsembleReranker {
    fn default() -> Self {
        Self::new()
    }
}
