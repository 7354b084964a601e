use serde::{Deserialize, Serialize};

/// Configuration for the ingestion pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Number of chunks embedded per batch call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum concurrent embedding batches
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Stamp chunks with an ingestion timestamp when they carry none
    #[serde(default = "default_true")]
    pub stamp_indexed_at: bool,
}

fn default_batch_size() -> usize {
    32
}

fn default_max_concurrent() -> usize {
    num_cpus::get()
}

fn default_true() -> bool {
    true
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_concurrent: default_max_concurrent(),
            stamp_indexed_at: true,
        }
    }
}

impl IngestConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("Batch size must be > 0".to_string());
        }

        if self.max_concurrent == 0 {
            return Err("Max concurrent must be > 0".to_string());
        }

        Ok(())
    }
}
