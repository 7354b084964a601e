use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Embedding error: {0}")]
    Embedding(#[from] quarry_embedder::EmbedError),

    #[error("Index error: {0}")]
    Index(#[from] quarry_vector_index::IndexError),

    #[error("Chunk source error: {0}")]
    Source(String),

    #[error("Concurrency error: {0}")]
    Concurrency(String),

    #[error("Invalid ingest configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, IngestError>;
