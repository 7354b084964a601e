use crate::config::SearchConfig;
use crate::diversify::Diversifier;
use crate::enrich::ContextEnricher;
use crate::error::{Result, SearchError};
use crate::expand::{ExpandedQuery, QueryExpander, QueryRewriter};
use crate::normalize::ScoreNormalizer;
use crate::rerank::{
    EnsembleReranker, LexicalOverlapStrategy, PairwiseScorer, PairwiseStrategy, RecencyStrategy,
};
use crate::result::{RankedResult, SearchResult, SearchResults, SearchStats};
use crate::retriever::SemanticRetriever;
use crate::threshold::ThresholdFilter;
use log::{debug, info, warn};
use lru::LruCache;
use quarry_embedder::EmbeddingClient;
use quarry_vector_index::{Chunk, VectorIndex};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Per-call search options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Maximum results to return
    pub top_k: usize,

    /// Expand the query into variants before retrieval
    pub use_expansion: bool,

    /// Attach chunk context to results
    pub use_context: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            top_k: 5,
            use_expansion: true,
            use_context: true,
        }
    }
}

/// Optional external collaborators of the pipeline
///
/// Each one is a seam, not a requirement: without a rewriter searches run
/// unexpanded, without a pairwise scorer the rerank ensemble runs on its
/// intrinsic signals, and without an enricher results ship bare.
#[derive(Default)]
pub struct SearchServices {
    pub rewriter: Option<Arc<dyn QueryRewriter>>,
    pub pairwise_scorer: Option<Arc<dyn PairwiseScorer>>,
    pub enricher: Option<Arc<dyn ContextEnricher>>,
}

type CacheKey = (String, usize, bool, bool);

/// Multi-stage semantic search over a vector index
///
/// One search takes a single index snapshot and runs it through expansion,
/// multi-variant retrieval, ensemble reranking, score normalization,
/// per-file diversification, threshold filtering, context enrichment and
/// truncation. External collaborators degrade individually; the only
/// fatal conditions are an unpopulated index and an invalid query.
pub struct SearchPipeline {
    config: SearchConfig,
    index: Arc<VectorIndex>,
    expander: QueryExpander,
    retriever: SemanticRetriever,
    reranker: EnsembleReranker,
    normalizer: ScoreNormalizer,
    diversifier: Diversifier,
    threshold: ThresholdFilter,
    enricher: Option<Arc<dyn ContextEnricher>>,
    cache: Arc<RwLock<LruCache<CacheKey, SearchResults>>>,
}

impl SearchPipeline {
    pub fn new(
        config: SearchConfig,
        index: Arc<VectorIndex>,
        embedder: EmbeddingClient,
        services: SearchServices,
    ) -> Result<Self> {
        config.validate().map_err(SearchError::InvalidConfig)?;

        let expander = QueryExpander::new(services.rewriter, &config);
        let retriever = SemanticRetriever::new(embedder, config.retrieval_width);

        let mut reranker = EnsembleReranker::new();
        if let Some(scorer) = services.pairwise_scorer {
            reranker.push(
                Box::new(PairwiseStrategy::new(scorer, &config)),
                config.pairwise_weight,
            );
        }
        reranker.push(Box::new(LexicalOverlapStrategy), config.overlap_weight);
        reranker.push(Box::new(RecencyStrategy), config.recency_weight);

        let normalizer = ScoreNormalizer::new(config.rerank_blend_weight, config.raw_blend_weight);
        let diversifier = Diversifier::new(config.max_per_file);
        let threshold = ThresholdFilter::new(config.min_score, config.empty_pool_policy);

        let cache = if config.enable_cache {
            let size = NonZeroUsize::new(config.cache_size)
                .ok_or_else(|| SearchError::Cache("Invalid cache size".to_string()))?;
            LruCache::new(size)
        } else {
            LruCache::new(NonZeroUsize::MIN)
        };

        Ok(Self {
            config,
            index,
            expander,
            retriever,
            reranker,
            normalizer,
            diversifier,
            threshold,
            enricher: services.enricher,
            cache: Arc::new(RwLock::new(cache)),
        })
    }

    /// Run one search over the current index snapshot
    pub async fn search(&self, query: &str, options: SearchOptions) -> Result<SearchResults> {
        let start = Instant::now();

        let query = query.trim();
        if query.len() < self.config.min_query_length {
            return Err(SearchError::QueryTooShort {
                min: self.config.min_query_length,
                actual: query.len(),
            });
        }

        debug!("Search for: '{query}'");

        let cache_key = (
            query.to_string(),
            options.top_k,
            options.use_expansion,
            options.use_context,
        );
        if self.config.enable_cache {
            let mut cache = self.cache.write().await;
            if let Some(cached) = cache.get(&cache_key) {
                info!("Cache hit for query: '{query}'");
                let mut results = cached.clone();
                results.stats.cache_hit = true;
                results.stats.total_time_ms = start.elapsed().as_millis() as u64;
                return Ok(results);
            }
        }

        let snapshot = self.index.snapshot().await;
        if snapshot.dimension().is_none() {
            return Err(SearchError::IndexUnavailable(
                "no chunks have been indexed or loaded".to_string(),
            ));
        }

        let mut stats = SearchStats::default();

        // Stage 1: query expansion
        let expansion_start = Instant::now();
        let expanded = if options.use_expansion {
            self.expander.expand(query).await
        } else {
            ExpandedQuery::original_only(query)
        };
        stats.expansion_time_ms = expansion_start.elapsed().as_millis() as u64;
        stats.variant_count = expanded.len();
        debug!("Expansion produced {} query variants", expanded.len());

        // Stage 2: retrieval with union merge
        let retrieval_start = Instant::now();
        let outcome = self.retriever.retrieve(&snapshot, expanded.queries()).await;
        stats.retrieval_time_ms = retrieval_start.elapsed().as_millis() as u64;
        stats.raw_hit_count = outcome.raw_hit_count;
        stats.candidate_count = outcome.hits.len();
        stats.lexical_fallback = outcome.lexical_fallback;
        debug!(
            "Retrieval merged {} raw hits into {} candidates",
            outcome.raw_hit_count,
            outcome.hits.len()
        );

        let mut candidates: Vec<RankedResult> = outcome
            .hits
            .iter()
            .filter_map(|hit| {
                snapshot
                    .chunk(&hit.chunk_id)
                    .map(|chunk| RankedResult::new(chunk, hit.raw_score))
            })
            .collect();

        // Stage 3: rerank ensemble
        let rerank_start = Instant::now();
        let chunk_refs: Vec<Arc<Chunk>> = candidates.iter().map(|c| c.chunk.clone()).collect();
        let rerank_scores = self.reranker.rerank(query, &chunk_refs).await;
        match &rerank_scores {
            Some(scores) => {
                for (candidate, score) in candidates.iter_mut().zip(scores) {
                    candidate.rerank_score = Some(*score);
                }
            }
            None => debug!("Every rerank strategy dropped out, ranking on raw scores"),
        }
        stats.rerank_time_ms = rerank_start.elapsed().as_millis() as u64;

        // Stage 4: normalization and final combination
        let raw_scores: Vec<f32> = candidates.iter().map(|c| c.raw_score).collect();
        let final_scores = self.normalizer.finalize(&raw_scores, rerank_scores.as_deref());
        for (candidate, final_score) in candidates.iter_mut().zip(final_scores) {
            candidate.final_score = final_score;
        }
        candidates.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk.id.cmp(&b.chunk.id))
        });

        // Stage 5: per-file diversification
        let diversified = self.diversifier.apply(candidates);

        // Stage 6: threshold filter
        let kept = self.threshold.apply(diversified);

        let mut results: Vec<SearchResult> = kept.into_iter().map(SearchResult::from).collect();

        // Stage 7: context enrichment
        let enrich_start = Instant::now();
        if options.use_context {
            self.enrich(&mut results).await;
        }
        stats.enrich_time_ms = enrich_start.elapsed().as_millis() as u64;

        // Stage 8: truncation
        results.truncate(options.top_k);

        stats.total_time_ms = start.elapsed().as_millis() as u64;
        stats.cache_hit = false;

        let results = SearchResults::new(query.to_string())
            .with_results(results)
            .with_stats(stats);

        if self.config.enable_cache {
            let mut cache = self.cache.write().await;
            cache.put(cache_key, results.clone());
        }

        info!(
            "Search completed in {}ms, returned {} results",
            results.stats.total_time_ms,
            results.len()
        );

        Ok(results)
    }

    /// Attach context to results; failures cost only the context
    async fn enrich(&self, results: &mut [SearchResult]) {
        let Some(enricher) = &self.enricher else {
            return;
        };

        let deadline = Duration::from_millis(self.config.enrich_timeout_ms);
        for result in results.iter_mut() {
            match tokio::time::timeout(deadline, enricher.enrich(&result.chunk)).await {
                Ok(Ok(context)) => result.context = context,
                Ok(Err(e)) => {
                    warn!("Context enrichment failed for '{}': {e}", result.chunk.id);
                }
                Err(_) => {
                    warn!("Context enrichment timed out for '{}'", result.chunk.id);
                }
            }
        }
    }

    /// Clear search cache
    pub async fn clear_cache(&self) {
        let mut cache = self.cache.write().await;
        cache.clear();
        info!("Search cache cleared");
    }

    /// Get cache statistics
    pub async fn cache_stats(&self) -> CacheStats {
        let cache = self.cache.read().await;
        CacheStats {
            size: cache.len(),
            capacity: cache.cap().get(),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quarry_embedder::HashingEmbedder;
    use quarry_vector_index::IndexRecord;

    async fn indexed_chunks(texts: &[(&str, &str, &str)]) -> Arc<VectorIndex> {
        // (id, path, content)
        let embedder = HashingEmbedder::new(64);
        let index = VectorIndex::new();
        let mut records = Vec::new();
        for (id, path, content) in texts {
            let embedding = embed_blocking(&embedder, content).await;
            records.push(IndexRecord::new(
                Chunk::new(*id, *path, 1, 4, *content),
                embedding,
            ));
        }
        index.add(records).await.unwrap();
        Arc::new(index)
    }

    async fn embed_blocking(embedder: &HashingEmbedder, text: &str) -> Vec<f32> {
        use quarry_embedder::Embedder;
        embedder.embed(text).await.unwrap()
    }

    fn pipeline(index: Arc<VectorIndex>, config: SearchConfig) -> SearchPipeline {
        let embedder = EmbeddingClient::new(Arc::new(HashingEmbedder::new(64)));
        SearchPipeline::new(config, index, embedder, SearchServices::default()).unwrap()
    }

    fn permissive_config() -> SearchConfig {
        SearchConfig {
            min_score: 0.0,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_search_returns_relevant_chunk_first() {
        let index = indexed_chunks(&[
            ("cache", "cache.rs", "fn cache_lookup(key: &str) cache cache hit miss"),
            ("parser", "parser.rs", "fn parse_tokens(input: &str) grammar syntax tree"),
            ("socket", "socket.rs", "fn open_socket(addr: SocketAddr) tcp listen accept"),
        ])
        .await;
        let pipeline = pipeline(index, permissive_config());

        let results = pipeline
            .search("cache lookup hit", SearchOptions::default())
            .await
            .unwrap();

        assert!(!results.is_empty());
        assert_eq!(results.results[0].chunk.id, "cache");
        assert!(!results.stats.cache_hit);
        assert!(results.stats.variant_count >= 1);
    }

    #[tokio::test]
    async fn test_results_respect_top_k() {
        let texts: Vec<(String, String, String)> = (0..10)
            .map(|i| {
                (
                    format!("c{i}"),
                    format!("file{i}.rs"),
                    format!("shared token alpha beta {i}"),
                )
            })
            .collect();
        let refs: Vec<(&str, &str, &str)> = texts
            .iter()
            .map(|(a, b, c)| (a.as_str(), b.as_str(), c.as_str()))
            .collect();
        let index = indexed_chunks(&refs).await;
        let pipeline = pipeline(index, permissive_config());

        let options = SearchOptions {
            top_k: 3,
            ..Default::default()
        };
        let results = pipeline.search("shared token alpha", options).await.unwrap();
        assert!(results.len() <= 3);
    }

    #[tokio::test]
    async fn test_no_duplicate_chunk_ids_in_output() {
        let index = indexed_chunks(&[
            ("a", "a.rs", "retry with backoff on transient failures"),
            ("b", "b.rs", "retry loop around the network call"),
        ])
        .await;
        let pipeline = pipeline(index, permissive_config());

        let results = pipeline
            .search("retry network backoff", SearchOptions::default())
            .await
            .unwrap();

        let mut ids: Vec<&str> = results.results.iter().map(|r| r.chunk.id.as_str()).collect();
        ids.sort_unstable();
        let before = ids.len();
        ids.dedup();
        assert_eq!(ids.len(), before);
    }

    #[tokio::test]
    async fn test_empty_index_is_unavailable() {
        let pipeline = pipeline(Arc::new(VectorIndex::new()), SearchConfig::default());

        let result = pipeline.search("anything at all", SearchOptions::default()).await;
        assert!(matches!(result, Err(SearchError::IndexUnavailable(_))));
    }

    #[tokio::test]
    async fn test_short_query_rejected() {
        let index = indexed_chunks(&[("a", "a.rs", "content body")]).await;
        let pipeline = pipeline(index, SearchConfig::default());

        let result = pipeline.search(" a ", SearchOptions::default()).await;
        assert!(matches!(result, Err(SearchError::QueryTooShort { .. })));
    }

    #[tokio::test]
    async fn test_cache_hit_on_repeat_query() {
        let index = indexed_chunks(&[("a", "a.rs", "tokenize the input stream")]).await;
        let pipeline = pipeline(index, permissive_config());
        let options = SearchOptions::default();

        let first = pipeline.search("tokenize input", options).await.unwrap();
        assert!(!first.stats.cache_hit);

        let second = pipeline.search("tokenize input", options).await.unwrap();
        assert!(second.stats.cache_hit);
        assert_eq!(first.len(), second.len());

        pipeline.clear_cache().await;
        let third = pipeline.search("tokenize input", options).await.unwrap();
        assert!(!third.stats.cache_hit);
    }

    #[tokio::test]
    async fn test_cache_keyed_by_options() {
        let index = indexed_chunks(&[
            ("a", "a.rs", "walk the directory tree"),
            ("b", "b.rs", "walk the syntax tree"),
        ])
        .await;
        let pipeline = pipeline(index, permissive_config());

        let wide = SearchOptions {
            top_k: 2,
            ..Default::default()
        };
        let narrow = SearchOptions {
            top_k: 1,
            ..Default::default()
        };

        let first = pipeline.search("walk tree", wide).await.unwrap();
        assert!(!first.stats.cache_hit);

        // Different top_k must not reuse the cached entry
        let second = pipeline.search("walk tree", narrow).await.unwrap();
        assert!(!second.stats.cache_hit);
        assert!(second.len() <= 1);
    }

    #[tokio::test]
    async fn test_final_scores_non_increasing_without_deferrals() {
        let texts: Vec<(String, String, String)> = (0..6)
            .map(|i| {
                (
                    format!("c{i}"),
                    format!("file{i}.rs"),
                    format!("hash map entry insert remove {i}"),
                )
            })
            .collect();
        let refs: Vec<(&str, &str, &str)> = texts
            .iter()
            .map(|(a, b, c)| (a.as_str(), b.as_str(), c.as_str()))
            .collect();
        let index = indexed_chunks(&refs).await;
        let pipeline = pipeline(index, permissive_config());

        let options = SearchOptions {
            top_k: 6,
            ..Default::default()
        };
        let results = pipeline.search("hash map insert", options).await.unwrap();

        // One chunk per file, so diversification defers nothing
        for pair in results.results.windows(2) {
            assert!(pair[0].final_score >= pair[1].final_score);
        }
    }

    #[tokio::test]
    async fn test_disabled_cache_never_hits() {
        let index = indexed_chunks(&[("a", "a.rs", "serialize to json")]).await;
        let config = SearchConfig {
            enable_cache: false,
            min_score: 0.0,
            ..Default::default()
        };
        let pipeline = pipeline(index, config);

        let options = SearchOptions::default();
        pipeline.search("serialize json", options).await.unwrap();
        let again = pipeline.search("serialize json", options).await.unwrap();
        assert!(!again.stats.cache_hit);
    }
}
