use async_trait::async_trait;
use quarry_vector_index::Chunk;
use serde::{Deserialize, Serialize};

/// Last commit touching a chunk's file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub hash: String,
    pub author: String,
    pub message: String,
    pub timestamp: i64,
}

/// Supplementary context attached to a search result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkContext {
    /// Most recent commit touching the chunk's file, when known
    pub last_commit: Option<CommitInfo>,

    /// Paths related to the chunk (imports, co-changed files)
    #[serde(default)]
    pub related_paths: Vec<String>,
}

/// External source of chunk context
///
/// Enrichment is strictly additive: it runs after ranking, and a result
/// whose lookup fails simply ships without context. Implementations may
/// return `Ok(None)` when nothing useful is known for a chunk.
#[async_trait]
pub trait ContextEnricher: Send + Sync {
    async fn enrich(&self, chunk: &Chunk) -> anyhow::Result<Option<ChunkContext>>;
}
