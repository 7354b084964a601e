use crate::lexical::LexicalMatcher;
use crate::result::RetrievalHit;
use futures::future::join_all;
use log::{debug, warn};
use quarry_embedder::EmbeddingClient;
use quarry_vector_index::IndexSnapshot;
use std::collections::HashMap;

/// Outcome of the retrieval stage
#[derive(Debug, Clone, Default)]
pub struct RetrievalOutcome {
    /// Merged candidates, best first
    pub hits: Vec<RetrievalHit>,

    /// Hits across all variants before merging
    pub raw_hit_count: usize,

    /// Every variant failed to embed and keyword matching took over
    pub lexical_fallback: bool,
}

/// Multi-variant nearest-neighbor retrieval with union merge
///
/// Each query variant is embedded and looked up concurrently against one
/// snapshot. Per-variant hit lists are merged by chunk id: a chunk seen by
/// several variants keeps its maximum score and the index of the variant
/// that scored it. A variant whose embedding call fails is skipped; only
/// when every variant fails does retrieval fall back to keyword matching
/// with the original query.
pub struct SemanticRetriever {
    embedder: EmbeddingClient,
    width: usize,
}

impl SemanticRetriever {
    pub fn new(embedder: EmbeddingClient, width: usize) -> Self {
        Self { embedder, width }
    }

    pub async fn retrieve(&self, snapshot: &IndexSnapshot, queries: &[String]) -> RetrievalOutcome {
        if queries.is_empty() {
            return RetrievalOutcome::default();
        }

        let lookups = queries.iter().enumerate().map(|(variant_index, query)| async move {
            match self.embedder.embed(query).await {
                Ok(embedding) => Some((variant_index, snapshot.query(&embedding, self.width))),
                Err(e) => {
                    warn!("Skipping query variant {variant_index}: {e}");
                    None
                }
            }
        });
        let per_variant = join_all(lookups).await;

        if per_variant.iter().all(Option::is_none) {
            debug!("No query variant could be embedded, using keyword fallback");
            let hits = LexicalMatcher::search(snapshot, &queries[0], self.width);
            return RetrievalOutcome {
                raw_hit_count: hits.len(),
                lexical_fallback: true,
                hits,
            };
        }

        let mut raw_hit_count = 0;
        let mut merged: HashMap<String, RetrievalHit> = HashMap::new();

        for (variant_index, variant_hits) in per_variant.into_iter().flatten() {
            raw_hit_count += variant_hits.len();
            for (chunk_id, score) in variant_hits {
                merged
                    .entry(chunk_id.clone())
                    .and_modify(|hit| {
                        if score > hit.raw_score {
                            hit.raw_score = score;
                            hit.variant_index = variant_index;
                        }
                    })
                    .or_insert_with(|| RetrievalHit {
                        chunk_id,
                        raw_score: score,
                        variant_index,
                    });
            }
        }

        let mut hits: Vec<RetrievalHit> = merged.into_values().collect();
        hits.sort_by(|a, b| {
            b.raw_score
                .partial_cmp(&a.raw_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk_id.cmp(&b.chunk_id))
        });

        RetrievalOutcome {
            raw_hit_count,
            lexical_fallback: false,
            hits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use quarry_embedder::{EmbedError, Embedder};
    use quarry_vector_index::{Chunk, IndexRecord, VectorIndex};
    use std::sync::Arc;

    /// Maps known texts to fixed unit vectors
    struct TableEmbedder {
        table: Vec<(&'static str, Vec<f32>)>,
    }

    #[async_trait]
    impl Embedder for TableEmbedder {
        async fn embed(&self, text: &str) -> quarry_embedder::Result<Vec<f32>> {
            self.table
                .iter()
                .find(|(key, _)| *key == text)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| EmbedError::Generation(format!("unknown text: {text}")))
        }

        async fn embed_batch(&self, texts: &[String]) -> quarry_embedder::Result<Vec<Vec<f32>>> {
            let mut out = Vec::with_capacity(texts.len());
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    struct BrokenEmbedder;

    #[async_trait]
    impl Embedder for BrokenEmbedder {
        async fn embed(&self, _text: &str) -> quarry_embedder::Result<Vec<f32>> {
            Err(EmbedError::Unavailable("backend down".to_string()))
        }

        async fn embed_batch(&self, _texts: &[String]) -> quarry_embedder::Result<Vec<Vec<f32>>> {
            Err(EmbedError::Unavailable("backend down".to_string()))
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    async fn two_axis_index() -> Arc<IndexSnapshot> {
        // "x" sits on the first axis, "y" on the second
        let index = VectorIndex::new();
        index
            .add(vec![
                IndexRecord::new(Chunk::new("x", "x.rs", 1, 2, "axis x"), vec![1.0, 0.0]),
                IndexRecord::new(Chunk::new("y", "y.rs", 1, 2, "axis y"), vec![0.0, 1.0]),
            ])
            .await
            .unwrap();
        index.snapshot().await
    }

    fn client(embedder: impl Embedder + 'static) -> EmbeddingClient {
        let config = quarry_embedder::EmbeddingClientConfig {
            timeout_ms: 1_000,
            retries: 0,
        };
        EmbeddingClient::with_config(Arc::new(embedder), config)
    }

    #[tokio::test]
    async fn test_union_merge_keeps_max_score_and_its_variant() {
        let snapshot = two_axis_index().await;
        // Variant 0 is closer to y, variant 1 is exactly y
        let embedder = TableEmbedder {
            table: vec![
                ("near y", vec![0.6, 0.8]),
                ("exactly y", vec![0.0, 1.0]),
            ],
        };
        let retriever = SemanticRetriever::new(client(embedder), 10);

        let outcome = retriever
            .retrieve(&snapshot, &["near y".to_string(), "exactly y".to_string()])
            .await;

        let y = outcome.hits.iter().find(|h| h.chunk_id == "y").unwrap();
        assert!((y.raw_score - 1.0).abs() < 1e-5);
        assert_eq!(y.variant_index, 1);

        // Union: both chunks present exactly once
        assert_eq!(outcome.hits.len(), 2);
        assert_eq!(outcome.raw_hit_count, 4);
        assert!(!outcome.lexical_fallback);
    }

    #[tokio::test]
    async fn test_max_merge_on_shared_chunk() {
        let snapshot = two_axis_index().await;
        // Both variants hit "x": similarity 0.4 from one, 0.7 from the other.
        // The merged hit must keep 0.7 and point at the second variant.
        let low = 0.4f32;
        let high = 0.7f32;
        let embedder = TableEmbedder {
            table: vec![
                ("low", vec![low, (1.0 - low * low).sqrt()]),
                ("high", vec![high, (1.0 - high * high).sqrt()]),
            ],
        };
        let retriever = SemanticRetriever::new(client(embedder), 2);

        let outcome = retriever
            .retrieve(&snapshot, &["low".to_string(), "high".to_string()])
            .await;

        let x_hits: Vec<&RetrievalHit> =
            outcome.hits.iter().filter(|h| h.chunk_id == "x").collect();
        assert_eq!(x_hits.len(), 1);
        assert!((x_hits[0].raw_score - high).abs() < 1e-5);
        assert_eq!(x_hits[0].variant_index, 1);
    }

    #[tokio::test]
    async fn test_failed_variant_is_skipped() {
        let snapshot = two_axis_index().await;
        let embedder = TableEmbedder {
            table: vec![("works", vec![1.0, 0.0])],
        };
        let retriever = SemanticRetriever::new(client(embedder), 10);

        let outcome = retriever
            .retrieve(&snapshot, &["works".to_string(), "unknown variant".to_string()])
            .await;

        assert!(!outcome.lexical_fallback);
        assert_eq!(outcome.hits.first().unwrap().chunk_id, "x");
        // Only the surviving variant contributed hits
        assert_eq!(outcome.raw_hit_count, 2);
    }

    #[tokio::test]
    async fn test_all_variants_failing_falls_back_to_keywords() {
        let snapshot = two_axis_index().await;
        let retriever = SemanticRetriever::new(client(BrokenEmbedder), 10);

        let outcome = retriever
            .retrieve(&snapshot, &["axis x".to_string(), "anything".to_string()])
            .await;

        assert!(outcome.lexical_fallback);
        assert_eq!(outcome.hits.first().unwrap().chunk_id, "x");
        assert_eq!(outcome.hits.first().unwrap().variant_index, 0);
    }

    #[tokio::test]
    async fn test_empty_query_list_yields_nothing() {
        let snapshot = two_axis_index().await;
        let embedder = TableEmbedder { table: vec![] };
        let retriever = SemanticRetriever::new(client(embedder), 10);

        let outcome = retriever.retrieve(&snapshot, &[]).await;
        assert!(outcome.hits.is_empty());
        assert!(!outcome.lexical_fallback);
    }
}
