use crate::error::{EmbedError, Result};
use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Text-to-vector embedding service
///
/// Implementations are opaque: a local model, a remote API, or the
/// deterministic hashing fallback all satisfy the same contract.
/// `embed_batch` must be order-preserving and every produced vector must
/// have length [`Embedder::dimension`].
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts, one vector per input, in input order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Dimension of the vectors this embedder produces
    fn dimension(&self) -> usize;
}

/// Configuration for the embedding client wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingClientConfig {
    /// Deadline for a single embedding call, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Additional attempts after a failed call
    #[serde(default = "default_retries")]
    pub retries: u32,
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_retries() -> u32 {
    1
}

impl Default for EmbeddingClientConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            retries: default_retries(),
        }
    }
}

/// Deadline- and retry-aware wrapper around an [`Embedder`]
///
/// Every call is bounded by the configured timeout; a failed or timed-out
/// call is retried the configured number of times before the last error
/// is returned. Callers that can degrade (e.g. skipping one query variant)
/// handle that error themselves.
#[derive(Clone)]
pub struct EmbeddingClient {
    inner: Arc<dyn Embedder>,
    config: EmbeddingClientConfig,
}

impl EmbeddingClient {
    /// Wrap an embedder with the default timeout and retry policy
    pub fn new(inner: Arc<dyn Embedder>) -> Self {
        Self::with_config(inner, EmbeddingClientConfig::default())
    }

    /// Wrap an embedder with a custom timeout and retry policy
    pub fn with_config(inner: Arc<dyn Embedder>, config: EmbeddingClientConfig) -> Self {
        Self { inner, config }
    }

    /// Embed a single text, retrying on failure
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let timeout = Duration::from_millis(self.config.timeout_ms);
        let mut last_err = None;

        for attempt in 0..=self.config.retries {
            if attempt > 0 {
                warn!("Retrying embedding call (attempt {})", attempt + 1);
            }

            match tokio::time::timeout(timeout, self.inner.embed(text)).await {
                Ok(Ok(vector)) => return Ok(vector),
                Ok(Err(e)) => {
                    debug!("Embedding call failed: {e}");
                    last_err = Some(e);
                }
                Err(_) => {
                    debug!("Embedding call timed out after {timeout:?}");
                    last_err = Some(EmbedError::Timeout(timeout));
                }
            }
        }

        Err(last_err.unwrap_or_else(|| EmbedError::Generation("no attempts made".to_string())))
    }

    /// Embed a batch of texts, retrying on failure
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let timeout = Duration::from_millis(self.config.timeout_ms);
        let mut last_err = None;

        for attempt in 0..=self.config.retries {
            if attempt > 0 {
                warn!(
                    "Retrying batch embedding of {} texts (attempt {})",
                    texts.len(),
                    attempt + 1
                );
            }

            match tokio::time::timeout(timeout, self.inner.embed_batch(texts)).await {
                Ok(Ok(vectors)) => return Ok(vectors),
                Ok(Err(e)) => {
                    debug!("Batch embedding failed: {e}");
                    last_err = Some(e);
                }
                Err(_) => {
                    debug!("Batch embedding timed out after {timeout:?}");
                    last_err = Some(EmbedError::Timeout(timeout));
                }
            }
        }

        Err(last_err.unwrap_or_else(|| EmbedError::Generation("no attempts made".to_string())))
    }

    /// Dimension of the vectors the wrapped embedder produces
    pub fn dimension(&self) -> usize {
        self.inner.dimension()
    }
}
