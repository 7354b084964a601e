use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use log::info;
use quarry_embedder::{Embedder, EmbeddingClient};
use quarry_ingest::{ChunkSource, IngestPipeline, IngestStats};
use quarry_retrieval::{
    CacheStats, ContextEnricher, PairwiseScorer, QueryRewriter, SearchOptions, SearchPipeline,
    SearchResult, SearchResults, SearchServices,
};
use quarry_vector_index::{Chunk, VectorIndex};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Snapshot of engine state for callers and diagnostics
#[derive(Debug, Clone, Serialize)]
pub struct EngineInfo {
    /// Chunks currently indexed
    pub chunk_count: usize,

    /// Embedding dimension of the index, once known
    pub dimension: Option<usize>,

    /// Whether searches can be served
    pub ready: bool,
}

/// Builder wiring optional collaborators into a [`SearchEngine`]
///
/// Only the embedder is mandatory. Rewriter, pairwise scorer and enricher
/// are seams the engine runs without, each degrading its own stage only.
pub struct SearchEngineBuilder {
    config: EngineConfig,
    embedder: Arc<dyn Embedder>,
    rewriter: Option<Arc<dyn QueryRewriter>>,
    pairwise_scorer: Option<Arc<dyn PairwiseScorer>>,
    enricher: Option<Arc<dyn ContextEnricher>>,
}

impl SearchEngineBuilder {
    pub fn new(config: EngineConfig, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            config,
            embedder,
            rewriter: None,
            pairwise_scorer: None,
            enricher: None,
        }
    }

    /// Attach a query rewriter for expansion
    pub fn with_rewriter(mut self, rewriter: Arc<dyn QueryRewriter>) -> Self {
        self.rewriter = Some(rewriter);
        self
    }

    /// Attach a pairwise scorer to the rerank ensemble
    pub fn with_pairwise_scorer(mut self, scorer: Arc<dyn PairwiseScorer>) -> Self {
        self.pairwise_scorer = Some(scorer);
        self
    }

    /// Attach a context enricher
    pub fn with_enricher(mut self, enricher: Arc<dyn ContextEnricher>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    /// Build an engine over an empty index
    pub fn build(self) -> Result<SearchEngine> {
        self.assemble(VectorIndex::new())
    }

    /// Build an engine over an index loaded from disk
    pub async fn load(self, path: &Path) -> Result<SearchEngine> {
        let index = VectorIndex::load(path).await?;
        info!("Loaded index from {}", path.display());
        self.assemble(index)
    }

    fn assemble(self, index: VectorIndex) -> Result<SearchEngine> {
        self.config
            .validate()
            .map_err(EngineError::InvalidConfig)?;

        let index = Arc::new(index);
        let embedder = EmbeddingClient::with_config(self.embedder, self.config.embedding.clone());

        let services = SearchServices {
            rewriter: self.rewriter,
            pairwise_scorer: self.pairwise_scorer,
            enricher: self.enricher,
        };
        let pipeline = SearchPipeline::new(
            self.config.search.clone(),
            index.clone(),
            embedder.clone(),
            services,
        )?;
        let ingestor = IngestPipeline::new(self.config.ingest.clone(), embedder, index.clone())?;

        Ok(SearchEngine {
            config: self.config,
            index,
            pipeline,
            ingestor,
        })
    }
}

/// Facade over ingestion, indexing and search
///
/// Owns one [`VectorIndex`] shared by the ingest and search pipelines.
/// Index mutations invalidate the search cache, so a search issued after
/// an update always sees the new snapshot.
pub struct SearchEngine {
    config: EngineConfig,
    index: Arc<VectorIndex>,
    pipeline: SearchPipeline,
    ingestor: IngestPipeline,
}

impl SearchEngine {
    /// Start building an engine
    pub fn builder(config: EngineConfig, embedder: Arc<dyn Embedder>) -> SearchEngineBuilder {
        SearchEngineBuilder::new(config, embedder)
    }

    /// Drain a chunk source into the index
    pub async fn ingest(&self, source: &mut dyn ChunkSource) -> Result<IngestStats> {
        let stats = self.ingestor.run(source).await?;
        self.pipeline.clear_cache().await;
        Ok(stats)
    }

    /// Embed and index pre-built chunks, replacing same-id records
    pub async fn update_chunks(&self, chunks: Vec<Chunk>) -> Result<IngestStats> {
        info!("Updating index with {} chunks", chunks.len());
        let stats = self.ingestor.ingest_chunks(chunks).await?;
        self.pipeline.clear_cache().await;
        Ok(stats)
    }

    /// Search the index
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
        use_expansion: bool,
        use_context: bool,
    ) -> Result<Vec<SearchResult>> {
        let options = SearchOptions {
            top_k,
            use_expansion,
            use_context,
        };
        Ok(self.pipeline.search(query, options).await?.results)
    }

    /// Search and return per-stage statistics along with results
    pub async fn search_with_stats(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> Result<SearchResults> {
        Ok(self.pipeline.search(query, options).await?)
    }

    /// Write the current index snapshot to disk
    pub async fn persist(&self, path: &Path) -> Result<()> {
        self.index.persist(path).await?;
        info!("Persisted index to {}", path.display());
        Ok(())
    }

    /// Current engine state
    pub async fn info(&self) -> EngineInfo {
        let snapshot = self.index.snapshot().await;
        EngineInfo {
            chunk_count: snapshot.len(),
            dimension: snapshot.dimension(),
            ready: snapshot.dimension().is_some(),
        }
    }

    /// Clear the search cache
    pub async fn clear_cache(&self) {
        self.pipeline.clear_cache().await;
    }

    /// Search cache statistics
    pub async fn cache_stats(&self) -> CacheStats {
        self.pipeline.cache_stats().await
    }

    /// Get configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
