//! # Quarry Embedder
//!
//! This crate defines the text embedding seam for semantic code search.
//! How vectors are actually computed is a backend concern; the pipeline
//! only depends on the [`Embedder`] trait and on [`EmbeddingClient`], which
//! adds the timeout and bounded-retry policy every external call carries.
//!
//! ## Features
//!
//! - `Embedder` trait for pluggable backends (local model, remote API)
//! - `EmbeddingClient` with per-call deadlines and a single bounded retry
//! - `HashingEmbedder`, a deterministic offline fallback for tests and
//!   air-gapped use
//!
//! ## Example
//!
//! ```no_run
//! use quarry_embedder::{EmbeddingClient, HashingEmbedder};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = EmbeddingClient::new(Arc::new(HashingEmbedder::default()));
//!     let vector = client.embed("fn hello() { println!(\"Hello\"); }").await?;
//!     println!("Generated a {}-dimensional embedding", vector.len());
//!     Ok(())
//! }
//! ```

mod error;
mod hashing;
mod service;

pub use error::{EmbedError, Result};
pub use hashing::HashingEmbedder;
pub use service::{Embedder, EmbeddingClient, EmbeddingClientConfig};

/// Default embedding dimension
pub const DEFAULT_EMBEDDING_DIM: usize = 768;
