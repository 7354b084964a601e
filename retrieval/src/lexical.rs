use crate::result::RetrievalHit;
use quarry_vector_index::IndexSnapshot;

/// Symbol-name matches outweigh several content matches
const SYMBOL_NAME_BOOST: f32 = 5.0;

/// Keyword matcher used when no query variant could be embedded
///
/// Scores chunks by query-term frequency over their content, with a flat
/// boost when a term appears in the chunk's symbol name. Chunks that match
/// no term at all are excluded rather than returned with a zero score, so
/// the fallback never pads results with noise. Hits use the same shape as
/// the semantic path and carry variant index 0.
pub struct LexicalMatcher;

impl LexicalMatcher {
    pub fn search(snapshot: &IndexSnapshot, query: &str, k: usize) -> Vec<RetrievalHit> {
        let terms: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        if terms.is_empty() || k == 0 {
            return Vec::new();
        }

        let mut hits: Vec<RetrievalHit> = snapshot
            .chunks()
            .filter_map(|chunk| {
                let content = chunk.content.to_lowercase();
                let mut score = 0.0f32;

                for term in &terms {
                    score += content.matches(term.as_str()).count() as f32;
                }

                if let Some(symbol) = &chunk.symbol {
                    let name = symbol.name.to_lowercase();
                    if terms.iter().any(|t| name.contains(t.as_str())) {
                        score += SYMBOL_NAME_BOOST;
                    }
                }

                if score > 0.0 {
                    Some(RetrievalHit {
                        chunk_id: chunk.id.clone(),
                        raw_score: score,
                        variant_index: 0,
                    })
                } else {
                    None
                }
            })
            .collect();

        hits.sort_by(|a, b| {
            b.raw_score
                .partial_cmp(&a.raw_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk_id.cmp(&b.chunk_id))
        });
        hits.truncate(k);
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quarry_vector_index::{Chunk, IndexRecord, Symbol, SymbolKind, VectorIndex};

    async fn snapshot_with(chunks: Vec<Chunk>) -> std::sync::Arc<IndexSnapshot> {
        let index = VectorIndex::new();
        let records = chunks
            .into_iter()
            .map(|c| IndexRecord::new(c, vec![1.0, 0.0]))
            .collect();
        index.add(records).await.unwrap();
        index.snapshot().await
    }

    #[tokio::test]
    async fn test_term_frequency_ordering() {
        let snapshot = snapshot_with(vec![
            Chunk::new("a", "a.rs", 1, 3, "cache cache cache"),
            Chunk::new("b", "b.rs", 1, 3, "cache once"),
            Chunk::new("c", "c.rs", 1, 3, "nothing relevant"),
        ])
        .await;

        let hits = LexicalMatcher::search(&snapshot, "cache", 10);
        let ids: Vec<&str> = hits.iter().map(|h| h.chunk_id.as_str()).collect();

        // Zero-score chunks are excluded entirely
        assert_eq!(ids, vec!["a", "b"]);
        assert!(hits[0].raw_score > hits[1].raw_score);
        assert_eq!(hits[0].variant_index, 0);
    }

    #[tokio::test]
    async fn test_symbol_name_boost_dominates() {
        let symbol_chunk = Chunk::new("sym", "s.rs", 1, 3, "fn body")
            .with_symbol(Symbol::new("cache_lookup", SymbolKind::Function));
        let snapshot = snapshot_with(vec![
            symbol_chunk,
            Chunk::new("txt", "t.rs", 1, 3, "cache cache cache cache"),
        ])
        .await;

        let hits = LexicalMatcher::search(&snapshot, "cache", 10);
        assert_eq!(hits[0].chunk_id, "sym");
    }

    #[tokio::test]
    async fn test_tie_breaks_by_ascending_id() {
        let snapshot = snapshot_with(vec![
            Chunk::new("zeta", "z.rs", 1, 3, "worker pool"),
            Chunk::new("alpha", "a.rs", 1, 3, "worker pool"),
        ])
        .await;

        let hits = LexicalMatcher::search(&snapshot, "worker", 10);
        assert_eq!(hits[0].chunk_id, "alpha");
        assert_eq!(hits[1].chunk_id, "zeta");
    }

    #[tokio::test]
    async fn test_truncates_to_k() {
        let chunks = (0..6)
            .map(|i| Chunk::new(format!("c{i}"), "f.rs", 1, 2, "token"))
            .collect();
        let snapshot = snapshot_with(chunks).await;

        let hits = LexicalMatcher::search(&snapshot, "token", 3);
        assert_eq!(hits.len(), 3);
    }
}
