use crate::chunk::Chunk;
use crate::error::{IndexError, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A chunk together with its precomputed embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRecord {
    /// The chunk being indexed
    pub chunk: Chunk,

    /// Embedding vector for the chunk content
    pub embedding: Vec<f32>,
}

impl IndexRecord {
    /// Create a new index record
    pub fn new(chunk: Chunk, embedding: Vec<f32>) -> Self {
        Self { chunk, embedding }
    }
}

#[derive(Debug, Clone)]
struct SnapshotEntry {
    chunk: Arc<Chunk>,
    embedding: Vec<f32>,
}

/// Immutable view of the index contents at one point in time
///
/// A search takes one snapshot up front and resolves every hit against it,
/// so a concurrent append can never produce a hit that points at a chunk
/// the search cannot see.
#[derive(Debug, Default)]
pub struct IndexSnapshot {
    entries: Vec<SnapshotEntry>,
    by_id: HashMap<String, usize>,
    dimension: Option<usize>,
}

impl IndexSnapshot {
    /// Nearest-neighbor lookup by cosine similarity (higher = more similar)
    ///
    /// Returns up to `k` (chunk id, score) pairs ordered by descending
    /// score; equal scores order by ascending chunk id so repeated queries
    /// are reproducible. An empty index yields an empty list, not an error.
    pub fn query(&self, embedding: &[f32], k: usize) -> Vec<(String, f32)> {
        if k == 0 || self.entries.is_empty() {
            return Vec::new();
        }

        if let Some(dim) = self.dimension
            && dim != embedding.len()
        {
            debug!(
                "Query embedding has dimension {}, index has {dim}; returning no hits",
                embedding.len()
            );
            return Vec::new();
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (idx, cosine_similarity(embedding, &entry.embedding)))
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| self.entries[a.0].chunk.id.cmp(&self.entries[b.0].chunk.id))
        });

        scored
            .into_iter()
            .take(k)
            .map(|(idx, score)| (self.entries[idx].chunk.id.clone(), score))
            .collect()
    }

    /// Resolve a chunk id to its chunk
    pub fn chunk(&self, id: &str) -> Option<Arc<Chunk>> {
        self.by_id.get(id).map(|&idx| self.entries[idx].chunk.clone())
    }

    /// Iterate over all chunks in this snapshot
    pub fn chunks(&self) -> impl Iterator<Item = &Arc<Chunk>> {
        self.entries.iter().map(|entry| &entry.chunk)
    }

    /// Number of chunks in this snapshot
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the snapshot holds no chunks
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding dimension of the stored vectors, if any are stored
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }
}

/// In-memory vector index with copy-on-write snapshots
///
/// Appends build a fresh snapshot and swap it in under a write lock;
/// readers clone the current snapshot `Arc` once and are unaffected by
/// later mutations.
#[derive(Debug, Default)]
pub struct VectorIndex {
    current: RwLock<Arc<IndexSnapshot>>,
}

impl VectorIndex {
    /// Create a new, empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an index previously written with [`VectorIndex::persist`]
    pub async fn load(path: &Path) -> Result<Self> {
        info!("Loading vector index from {}", path.display());

        let content = tokio::fs::read(path).await?;
        let records: Vec<IndexRecord> = serde_json::from_slice(&content)?;

        let index = Self::new();
        index
            .add(records)
            .await
            .map_err(|e| IndexError::Corrupt(e.to_string()))?;

        info!("Loaded {} chunks", index.len().await);
        Ok(index)
    }

    /// Add records to the index
    ///
    /// A record whose chunk id is already present replaces the stored one.
    /// Every embedding must match the index dimension, which is fixed by
    /// the first record ever added.
    pub async fn add(&self, records: Vec<IndexRecord>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        info!("Adding {} records to vector index", records.len());

        let mut current = self.current.write().await;

        let mut entries = current.entries.clone();
        let mut by_id = current.by_id.clone();
        let mut dimension = current.dimension;

        for record in records {
            if record.embedding.is_empty() {
                return Err(IndexError::EmptyEmbedding(record.chunk.id));
            }

            let expected = *dimension.get_or_insert(record.embedding.len());
            if record.embedding.len() != expected {
                return Err(IndexError::DimensionMismatch {
                    expected,
                    actual: record.embedding.len(),
                });
            }

            let entry = SnapshotEntry {
                chunk: Arc::new(record.chunk),
                embedding: record.embedding,
            };

            match by_id.get(&entry.chunk.id) {
                Some(&idx) => entries[idx] = entry,
                None => {
                    by_id.insert(entry.chunk.id.clone(), entries.len());
                    entries.push(entry);
                }
            }
        }

        *current = Arc::new(IndexSnapshot {
            entries,
            by_id,
            dimension,
        });

        Ok(())
    }

    /// Take a consistent view of the current index contents
    pub async fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.current.read().await.clone()
    }

    /// Number of chunks currently indexed
    pub async fn len(&self) -> usize {
        self.current.read().await.len()
    }

    /// Check if the index holds no chunks
    pub async fn is_empty(&self) -> bool {
        self.current.read().await.is_empty()
    }

    /// Write the index contents to disk as JSON
    pub async fn persist(&self, path: &Path) -> Result<()> {
        let snapshot = self.snapshot().await;

        let records: Vec<IndexRecord> = snapshot
            .entries
            .iter()
            .map(|entry| IndexRecord {
                chunk: (*entry.chunk).clone(),
                embedding: entry.embedding.clone(),
            })
            .collect();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_vec(&records)?;
        tokio::fs::write(path, content).await?;

        info!("Persisted {} chunks to {}", records.len(), path.display());
        Ok(())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        0.0
    } else {
        dot / (mag_a * mag_b)
    }
}
