//! # Quarry Ingest
//!
//! Ingestion pipeline that turns chunk records into indexed vectors.
//! Chunk production is pluggable twice over: a [`ChunkSource`] supplies
//! records from wherever they live, and a [`StrategyRegistry`] maps file
//! languages to [`ChunkStrategy`] implementations for callers that start
//! from raw text.
//!
//! ## Features
//!
//! - Batched embedding with a bounded number of in-flight batches
//! - Per-language chunking strategies with a line-window fallback
//! - Skip-and-count handling of failed embedding batches
//! - Ingestion timestamps for downstream recency scoring
//!
//! ## Example
//!
//! ```no_run
//! use quarry_embedder::{EmbeddingClient, HashingEmbedder};
//! use quarry_ingest::{ChunkListSource, IngestConfig, IngestPipeline, StrategyRegistry};
//! use quarry_vector_index::VectorIndex;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let registry = StrategyRegistry::default();
//!     let chunks = registry.chunk_text("src/lib.rs", "fn main() {}\n");
//!
//!     let index = Arc::new(VectorIndex::new());
//!     let embedder = EmbeddingClient::new(Arc::new(HashingEmbedder::default()));
//!     let pipeline = IngestPipeline::new(IngestConfig::default(), embedder, index)?;
//!
//!     let mut source = ChunkListSource::new(chunks);
//!     let stats = pipeline.run(&mut source).await?;
//!     println!("Indexed {} chunks", stats.chunks_embedded);
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod language;
mod pipeline;
mod source;
mod strategy;

pub use config::IngestConfig;
pub use error::{IngestError, Result};
pub use language::Language;
pub use pipeline::{IngestPipeline, IngestStats};
pub use source::{ChunkListSource, ChunkSource};
pub use strategy::{ChunkStrategy, LineWindowStrategy, StrategyRegistry};
