use crate::error::Result;
use crate::service::Embedder;
use crate::DEFAULT_EMBEDDING_DIM;
use async_trait::async_trait;
use std::collections::HashMap;

/// Deterministic token-hashing embedder
///
/// Hashes terms into fixed-dimension buckets weighted by term frequency
/// and L2-normalizes the result. Far less expressive than a neural model,
/// but dependency-free and stable across runs, which makes it the offline
/// and test-time stand-in for a real embedding service.
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    /// Create a hashing embedder producing vectors of the given dimension
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    /// Hash a term into a bucket index using FNV-1a
    fn bucket(term: &str, dimension: usize) -> usize {
        let mut hash: u64 = 0xcbf29ce484222325;
        for byte in term.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x100000001b3);
        }
        (hash as usize) % dimension
    }

    /// Tokenize text into lowercase identifier-like terms
    fn tokenize(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|s| s.len() >= 2)
            .map(str::to_lowercase)
            .collect()
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let tokens = Self::tokenize(text);
        if tokens.is_empty() {
            return vec![0.0; self.dimension];
        }

        let mut frequencies: HashMap<&str, f32> = HashMap::new();
        for token in &tokens {
            *frequencies.entry(token.as_str()).or_default() += 1.0;
        }

        let total = tokens.len() as f32;
        let mut vector = vec![0.0f32; self.dimension];

        for (term, count) in &frequencies {
            // Longer terms carry more signal than near-stopwords
            let weight = (count / total) * (1.0 + (term.len() as f32).ln());
            vector[Self::bucket(term, self.dimension)] += weight;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for value in &mut vector {
                *value /= norm;
            }
        }

        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_DIM)
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.vector(text)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
