use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Index error: {0}")]
    Index(#[from] quarry_vector_index::IndexError),

    #[error("Ingestion error: {0}")]
    Ingest(#[from] quarry_ingest::IngestError),

    #[error("Search error: {0}")]
    Search(#[from] quarry_retrieval::SearchError),

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
