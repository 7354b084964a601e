use crate::enrich::ChunkContext;
use quarry_vector_index::Chunk;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A candidate surfaced by the retrieval stage
///
/// The variant index records which query variant produced the winning
/// score: 0 is always the original query. When several variants surface
/// the same chunk, the merged hit keeps the maximum score and the index
/// of the variant that achieved it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalHit {
    /// Id of the matched chunk
    pub chunk_id: String,

    /// Raw similarity score from the index
    pub raw_score: f32,

    /// Query variant that produced `raw_score`
    pub variant_index: usize,
}

/// A candidate carrying every per-stage score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedResult {
    /// The code chunk found
    pub chunk: Arc<Chunk>,

    /// Raw similarity score from the retrieval stage
    pub raw_score: f32,

    /// Ensemble rerank score, absent when every scoring strategy failed
    pub rerank_score: Option<f32>,

    /// Combined score used for ordering and thresholding (0.0 - 1.0)
    pub final_score: f32,
}

impl RankedResult {
    pub fn new(chunk: Arc<Chunk>, raw_score: f32) -> Self {
        Self {
            chunk,
            raw_score,
            rerank_score: None,
            final_score: 0.0,
        }
    }
}

/// A single search result as returned to callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The code chunk found
    pub chunk: Arc<Chunk>,

    /// Raw similarity score from the retrieval stage
    pub raw_score: f32,

    /// Ensemble rerank score, absent when reranking was skipped entirely
    pub rerank_score: Option<f32>,

    /// Combined score used for ordering (0.0 - 1.0, higher is better)
    pub final_score: f32,

    /// Optional enrichment attached after ranking
    pub context: Option<ChunkContext>,
}

impl From<RankedResult> for SearchResult {
    fn from(ranked: RankedResult) -> Self {
        Self {
            chunk: ranked.chunk,
            raw_score: ranked.raw_score,
            rerank_score: ranked.rerank_score,
            final_score: ranked.final_score,
            context: None,
        }
    }
}

/// Collection of search results with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    /// Query that produced these results
    pub query: String,

    /// Search results, best first
    pub results: Vec<SearchResult>,

    /// Search statistics
    pub stats: SearchStats,
}

/// Search performance statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchStats {
    /// Total search time in milliseconds
    pub total_time_ms: u64,

    /// Query expansion time in milliseconds
    pub expansion_time_ms: u64,

    /// Retrieval and merge time in milliseconds
    pub retrieval_time_ms: u64,

    /// Reranking time in milliseconds
    pub rerank_time_ms: u64,

    /// Context enrichment time in milliseconds
    pub enrich_time_ms: u64,

    /// Query variants issued, original included
    pub variant_count: usize,

    /// Hits across all variants before merging
    pub raw_hit_count: usize,

    /// Distinct candidates after merging
    pub candidate_count: usize,

    /// Retrieval fell back to keyword matching
    pub lexical_fallback: bool,

    /// Cache hit
    pub cache_hit: bool,
}

impl SearchResults {
    /// Create new search results
    pub fn new(query: String) -> Self {
        Self {
            query,
            results: Vec::new(),
            stats: SearchStats::default(),
        }
    }

    /// Add results
    pub fn with_results(mut self, results: Vec<SearchResult>) -> Self {
        self.results = results;
        self
    }

    /// Set stats
    pub fn with_stats(mut self, stats: SearchStats) -> Self {
        self.stats = stats;
        self
    }

    /// Get top N results
    pub fn top(&self, n: usize) -> &[SearchResult] {
        &self.results[..n.min(self.results.len())]
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Number of results
    pub fn len(&self) -> usize {
        self.results.len()
    }
}
