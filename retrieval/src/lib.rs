/*!
# Quarry Retrieval

Multi-stage semantic search pipeline for code, combining:
- **Query expansion** via a pluggable rewriter for better recall
- **Multi-variant retrieval** with union merge over one index snapshot
- **Ensemble reranking** mixing model, lexical and recency signals
- **Score normalization and thresholding** on one [0, 1] scale
- **Per-file diversification** so one file cannot crowd the results

## Features

- **Fail-open expansion**: a dead rewriter costs variants, never the search
- **Max-merge dedup**: chunks seen by several variants keep their best score
- **Keyword fallback**: searches still answer when no variant embeds
- **Additive enrichment**: context lookups attach after ranking or not at all
- **LRU caching**: repeat queries keyed by query and options
- **Performance metrics**: per-stage timings in every response

## Architecture

```text
Query
  └─> Expansion (rewriter, fail-open)
        └─> Variants (original always first)
              ├─> Embed + top-K per variant (concurrent)
              └─> Union merge (max score per chunk)
                    └─> Rerank ensemble (pairwise / overlap / recency)
                          └─> Normalize + blend with raw score
                                └─> Diversify (per-file cap, deferral)
                                      └─> Threshold (policy on empty pool)
                                            └─> Enrich (additive)
                                                  └─> Truncate to top_k
```

## Example

```rust,no_run
use quarry_embedder::{EmbeddingClient, HashingEmbedder};
use quarry_retrieval::{SearchConfig, SearchOptions, SearchPipeline, SearchServices};
use quarry_vector_index::VectorIndex;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let index = Arc::new(VectorIndex::load(std::path::Path::new("index.json")).await?);
    let embedder = EmbeddingClient::new(Arc::new(HashingEmbedder::default()));

    let pipeline = SearchPipeline::new(
        SearchConfig::default(),
        index,
        embedder,
        SearchServices::default(),
    )?;

    let results = pipeline
        .search("async error handling", SearchOptions::default())
        .await?;

    for (i, result) in results.top(5).iter().enumerate() {
        println!("{}. {} ({:.2})", i + 1, result.chunk.path, result.final_score);
    }

    Ok(())
}
```
*/

mod config;
mod diversify;
mod enrich;
mod error;
mod expand;
mod lexical;
mod normalize;
mod pipeline;
mod rerank;
mod result;
mod retriever;
mod threshold;

pub use config::SearchConfig;
pub use diversify::Diversifier;
pub use enrich::{ChunkContext, CommitInfo, ContextEnricher};
pub use error::{Result, SearchError};
pub use expand::{ExpandedQuery, ExpansionStrategy, QueryExpander, QueryRewriter};
pub use lexical::LexicalMatcher;
pub use normalize::{min_max, ScoreNormalizer};
pub use pipeline::{CacheStats, SearchOptions, SearchPipeline, SearchServices};
pub use rerank::{
    EnsembleReranker, LexicalOverlapStrategy, PairwiseScorer, PairwiseStrategy, RecencyStrategy,
    ScoringStrategy,
};
pub use result::{RankedResult, RetrievalHit, SearchResult, SearchResults, SearchStats};
pub use retriever::{RetrievalOutcome, SemanticRetriever};
pub use threshold::{EmptyPoolPolicy, ThresholdFilter};
