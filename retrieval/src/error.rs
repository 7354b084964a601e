use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Query too short: minimum {min} characters, got {actual}")]
    QueryTooShort { min: usize, actual: usize },

    #[error("Invalid search configuration: {0}")]
    InvalidConfig(String),

    #[error("Cache error: {0}")]
    Cache(String),
}

pub type Result<T> = std::result::Result<T, SearchError>;
