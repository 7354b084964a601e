use crate::config::IngestConfig;
use crate::error::{IngestError, Result};
use crate::source::ChunkSource;
use log::{debug, info, warn};
use quarry_embedder::EmbeddingClient;
use quarry_vector_index::{Chunk, IndexRecord, VectorIndex};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Semaphore;

/// Statistics about one ingestion operation
#[derive(Debug, Clone, Default)]
pub struct IngestStats {
    pub chunks_received: usize,
    pub chunks_embedded: usize,
    pub chunks_failed: usize,
    pub batches_failed: usize,
}

impl IngestStats {
    fn merge(&mut self, other: IngestStats) {
        self.chunks_received += other.chunks_received;
        self.chunks_embedded += other.chunks_embedded;
        self.chunks_failed += other.chunks_failed;
        self.batches_failed += other.batches_failed;
    }
}

/// Pipeline that embeds chunks and writes them into a vector index
///
/// Chunks are embedded in batches, with at most `max_concurrent` batches
/// in flight. A batch whose embedding call fails is skipped and counted;
/// the rest of the ingestion continues. Index write failures abort, since
/// they indicate a dimension or storage problem rather than a transient
/// service hiccup.
pub struct IngestPipeline {
    config: IngestConfig,
    embedder: EmbeddingClient,
    index: Arc<VectorIndex>,
}

impl IngestPipeline {
    pub fn new(
        config: IngestConfig,
        embedder: EmbeddingClient,
        index: Arc<VectorIndex>,
    ) -> Result<Self> {
        config.validate().map_err(IngestError::InvalidConfig)?;
        Ok(Self {
            config,
            embedder,
            index,
        })
    }

    /// Drain a chunk source into the index
    pub async fn run(&self, source: &mut dyn ChunkSource) -> Result<IngestStats> {
        let mut stats = IngestStats::default();

        while let Some(chunks) = source.next_batch().await? {
            if chunks.is_empty() {
                continue;
            }
            stats.merge(self.ingest_chunks(chunks).await?);
        }

        info!(
            "Ingestion complete: {} chunks embedded, {} failed",
            stats.chunks_embedded, stats.chunks_failed
        );
        Ok(stats)
    }

    /// Embed and index a list of pre-built chunks
    pub async fn ingest_chunks(&self, mut chunks: Vec<Chunk>) -> Result<IngestStats> {
        let mut stats = IngestStats {
            chunks_received: chunks.len(),
            ..Default::default()
        };

        if chunks.is_empty() {
            return Ok(stats);
        }

        if self.config.stamp_indexed_at {
            let now = unix_timestamp();
            for chunk in &mut chunks {
                chunk.metadata.indexed_at.get_or_insert(now);
            }
        }

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent));
        let mut tasks = Vec::new();

        let mut remaining = chunks;
        while !remaining.is_empty() {
            let take = self.config.batch_size.min(remaining.len());
            let batch: Vec<Chunk> = remaining.drain(..take).collect();

            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| IngestError::Concurrency(format!("Semaphore error: {e}")))?;

            let embedder = self.embedder.clone();
            let task = tokio::spawn(async move {
                let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
                let result = embedder.embed_batch(&texts).await;
                drop(permit);

                result.map(|embeddings| {
                    batch
                        .into_iter()
                        .zip(embeddings)
                        .map(|(chunk, embedding)| IndexRecord::new(chunk, embedding))
                        .collect::<Vec<_>>()
                })
            });

            tasks.push((take, task));
        }

        for (batch_len, task) in tasks {
            match task.await {
                Ok(Ok(records)) => {
                    debug!("Embedded batch of {} chunks", records.len());
                    stats.chunks_embedded += records.len();
                    self.index.add(records).await?;
                }
                Ok(Err(e)) => {
                    warn!("Embedding batch failed: {e}");
                    stats.chunks_failed += batch_len;
                    stats.batches_failed += 1;
                }
                Err(e) => {
                    warn!("Task join error: {e}");
                    stats.chunks_failed += batch_len;
                    stats.batches_failed += 1;
                }
            }
        }

        Ok(stats)
    }
}

fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
