//! # Quarry Vector Index
//!
//! This crate provides the chunk data model and an in-memory vector index
//! with copy-on-write snapshots for semantic code search. Embeddings are
//! computed externally and stored alongside their chunks; lookups use
//! cosine similarity (higher = more similar).
//!
//! ## Features
//!
//! - Snapshot reads: searches observe one consistent view of the index
//!   while appends swap in fresh snapshots
//! - Deterministic ordering: equal scores tie-break by chunk id
//! - JSON persistence for durable indexes
//!
//! ## Example
//!
//! ```no_run
//! use quarry_vector_index::{Chunk, IndexRecord, VectorIndex};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let index = VectorIndex::new();
//!
//!     let chunk = Chunk::new("auth.rs:1-12", "auth.rs", 1, 12, "fn login() {}");
//!     index.add(vec![IndexRecord::new(chunk, vec![0.1, 0.9])]).await?;
//!
//!     let snapshot = index.snapshot().await;
//!     let hits = snapshot.query(&[0.1, 0.9], 5);
//!     println!("Found {} hits", hits.len());
//!     Ok(())
//! }
//! ```

mod chunk;
mod error;
mod index;

pub use chunk::{Chunk, ChunkMetadata, Symbol, SymbolKind};
pub use error::{IndexError, Result};
pub use index::{IndexRecord, IndexSnapshot, VectorIndex};
