use crate::error::Result;
use async_trait::async_trait;
use quarry_vector_index::Chunk;

/// Supplier of chunk records for ingestion
///
/// Where chunks come from (repository walkers, archive readers, editor
/// buffers) is the supplier's concern. The pipeline only pulls batches
/// until the source reports exhaustion with `None`.
#[async_trait]
pub trait ChunkSource: Send + Sync {
    /// Produce the next batch of chunks, or `None` when exhausted
    async fn next_batch(&mut self) -> Result<Option<Vec<Chunk>>>;
}

/// In-memory source backed by a pre-built chunk list
pub struct ChunkListSource {
    chunks: Vec<Chunk>,
    batch_size: usize,
}

impl ChunkListSource {
    pub fn new(chunks: Vec<Chunk>) -> Self {
        Self {
            chunks,
            batch_size: 64,
        }
    }

    /// Override how many chunks each `next_batch` call yields
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

#[async_trait]
impl ChunkSource for ChunkListSource {
    async fn next_batch(&mut self) -> Result<Option<Vec<Chunk>>> {
        if self.chunks.is_empty() {
            return Ok(None);
        }

        let take = self.batch_size.min(self.chunks.len());
        Ok(Some(self.chunks.drain(..take).collect()))
    }
}
