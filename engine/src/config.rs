use quarry_embedder::EmbeddingClientConfig;
use quarry_ingest::IngestConfig;
use quarry_retrieval::SearchConfig;
use serde::{Deserialize, Serialize};

/// Configuration for the search engine
///
/// Groups the per-stage configurations so one document configures the
/// whole engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Search pipeline configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Ingestion configuration
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Embedding client configuration
    #[serde(default)]
    pub embedding: EmbeddingClientConfig,
}

impl EngineConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        self.search.validate()?;
        self.ingest.validate()?;
        Ok(())
    }
}
