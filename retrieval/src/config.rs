use crate::expand::ExpansionStrategy;
use crate::threshold::EmptyPoolPolicy;
use serde::{Deserialize, Serialize};

/// Configuration for the search pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Rewriting angles tried during query expansion, in order
    #[serde(default = "default_expansion_strategies")]
    pub expansion_strategies: Vec<ExpansionStrategy>,

    /// Maximum query variants per search, original included
    #[serde(default = "default_max_variants")]
    pub max_variants: usize,

    /// Deadline for each rewrite call (ms)
    #[serde(default = "default_rewrite_timeout_ms")]
    pub rewrite_timeout_ms: u64,

    /// Nearest neighbors fetched per query variant
    #[serde(default = "default_retrieval_width")]
    pub retrieval_width: usize,

    /// Ensemble weight of the pairwise relevance scorer
    #[serde(default = "default_pairwise_weight")]
    pub pairwise_weight: f32,

    /// Ensemble weight of lexical term overlap
    #[serde(default = "default_overlap_weight")]
    pub overlap_weight: f32,

    /// Ensemble weight of ingestion recency
    #[serde(default = "default_recency_weight")]
    pub recency_weight: f32,

    /// Deadline for each pairwise scoring call (ms)
    #[serde(default = "default_rerank_timeout_ms")]
    pub rerank_timeout_ms: u64,

    /// Retries after a failed pairwise scoring call
    #[serde(default = "default_rerank_retries")]
    pub rerank_retries: u32,

    /// Characters of chunk content passed to the pairwise scorer
    #[serde(default = "default_rerank_max_chars")]
    pub rerank_max_chars: usize,

    /// Weight of the rerank score in the final combination
    #[serde(default = "default_rerank_blend_weight")]
    pub rerank_blend_weight: f32,

    /// Weight of the raw similarity score in the final combination
    #[serde(default = "default_raw_blend_weight")]
    pub raw_blend_weight: f32,

    /// Results admitted per file before deferral
    #[serde(default = "default_max_per_file")]
    pub max_per_file: usize,

    /// Minimum final score a result must reach
    #[serde(default = "default_min_score")]
    pub min_score: f32,

    /// What to return when every result falls below `min_score`
    #[serde(default = "default_empty_pool_policy")]
    pub empty_pool_policy: EmptyPoolPolicy,

    /// Deadline for each context enrichment call (ms)
    #[serde(default = "default_enrich_timeout_ms")]
    pub enrich_timeout_ms: u64,

    /// Minimum query length
    #[serde(default = "default_min_query_length")]
    pub min_query_length: usize,

    /// Enable caching of search results
    #[serde(default = "default_true")]
    pub enable_cache: bool,

    /// Cache size (number of queries to cache)
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,
}

fn default_expansion_strategies() -> Vec<ExpansionStrategy> {
    vec![
        ExpansionStrategy::Synonym,
        ExpansionStrategy::RelatedConcept,
        ExpansionStrategy::ImplementationPattern,
    ]
}

fn default_max_variants() -> usize {
    4
}

fn default_rewrite_timeout_ms() -> u64 {
    10_000
}

fn default_retrieval_width() -> usize {
    10
}

fn default_pairwise_weight() -> f32 {
    0.6
}

fn default_overlap_weight() -> f32 {
    0.3
}

fn default_recency_weight() -> f32 {
    0.1
}

fn default_rerank_timeout_ms() -> u64 {
    10_000
}

fn default_rerank_retries() -> u32 {
    1
}

fn default_rerank_max_chars() -> usize {
    512
}

fn default_rerank_blend_weight() -> f32 {
    0.7
}

fn default_raw_blend_weight() -> f32 {
    0.3
}

fn default_max_per_file() -> usize {
    2
}

fn default_min_score() -> f32 {
    0.5
}

fn default_empty_pool_policy() -> EmptyPoolPolicy {
    EmptyPoolPolicy::BestEffortTopOne
}

fn default_enrich_timeout_ms() -> u64 {
    5_000
}

fn default_min_query_length() -> usize {
    2
}

fn default_true() -> bool {
    true
}

fn default_cache_size() -> usize {
    100
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            expansion_strategies: default_expansion_strategies(),
            max_variants: default_max_variants(),
            rewrite_timeout_ms: default_rewrite_timeout_ms(),
            retrieval_width: default_retrieval_width(),
            pairwise_weight: default_pairwise_weight(),
            overlap_weight: default_overlap_weight(),
            recency_weight: default_recency_weight(),
            rerank_timeout_ms: default_rerank_timeout_ms(),
            rerank_retries: default_rerank_retries(),
            rerank_max_chars: default_rerank_max_chars(),
            rerank_blend_weight: default_rerank_blend_weight(),
            raw_blend_weight: default_raw_blend_weight(),
            max_per_file: default_max_per_file(),
            min_score: default_min_score(),
            empty_pool_policy: default_empty_pool_policy(),
            enrich_timeout_ms: default_enrich_timeout_ms(),
            min_query_length: default_min_query_length(),
            enable_cache: true,
            cache_size: default_cache_size(),
        }
    }
}

impl SearchConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_variants == 0 {
            return Err("max_variants must be > 0".to_string());
        }

        if self.retrieval_width == 0 {
            return Err("retrieval_width must be > 0".to_string());
        }

        for (name, weight) in [
            ("pairwise_weight", self.pairwise_weight),
            ("overlap_weight", self.overlap_weight),
            ("recency_weight", self.recency_weight),
        ] {
            if !(0.0..=1.0).contains(&weight) {
                return Err(format!("{name} must be in [0.0, 1.0], got {weight}"));
            }
        }

        let ensemble_total = self.pairwise_weight + self.overlap_weight + self.recency_weight;
        if (ensemble_total - 1.0).abs() > 0.01 {
            return Err(format!(
                "ensemble weights must sum to 1.0, got {ensemble_total}"
            ));
        }

        let blend_total = self.rerank_blend_weight + self.raw_blend_weight;
        if !(0.0..=1.0).contains(&self.rerank_blend_weight)
            || !(0.0..=1.0).contains(&self.raw_blend_weight)
            || (blend_total - 1.0).abs() > 0.01
        {
            return Err(format!(
                "rerank_blend_weight + raw_blend_weight must sum to 1.0, got {blend_total}"
            ));
        }

        if self.max_per_file == 0 {
            return Err("max_per_file must be > 0".to_string());
        }

        if !(0.0..=1.0).contains(&self.min_score) {
            return Err(format!(
                "min_score must be in [0.0, 1.0], got {}",
                self.min_score
            ));
        }

        if self.min_query_length == 0 {
            return Err("min_query_length must be > 0".to_string());
        }

        if self.enable_cache && self.cache_size == 0 {
            return Err("cache_size must be > 0 when caching is enabled".to_string());
        }

        Ok(())
    }

    /// Create config optimized for speed: no expansion, narrow retrieval
    pub fn fast() -> Self {
        Self {
            expansion_strategies: Vec::new(),
            max_variants: 1,
            retrieval_width: 5,
            ..Default::default()
        }
    }

    /// Create config optimized for recall: every rewriting angle, wide retrieval
    pub fn thorough() -> Self {
        Self {
            expansion_strategies: ExpansionStrategy::all().to_vec(),
            max_variants: 6,
            retrieval_width: 20,
            ..Default::default()
        }
    }
}
