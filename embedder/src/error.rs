use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during embedding operations
#[derive(Debug, Error)]
pub enum EmbedError {
    /// Failed to generate embeddings
    #[error("Failed to generate embeddings: {0}")]
    Generation(String),

    /// Embedding call exceeded its deadline
    #[error("Embedding call timed out after {0:?}")]
    Timeout(Duration),

    /// Invalid input provided to the embedder
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The backing embedding service is unreachable
    #[error("Embedding service unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, EmbedError>;
