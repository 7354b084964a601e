use crate::language::Language;
use quarry_vector_index::Chunk;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Strategy for splitting one file's text into chunks
///
/// Implementations receive the full file content and return chunks with
/// 1-based line ranges. Chunk ids follow the `path:start-end` convention
/// so re-ingesting a file replaces its previous records.
pub trait ChunkStrategy: Send + Sync {
    /// Split `content` into chunks for the file at `path`
    fn chunk(&self, path: &str, content: &str) -> Vec<Chunk>;
}

/// Sliding line window with overlap
///
/// Language-agnostic default strategy. Windows advance by
/// `window_lines - overlap_lines` so adjacent chunks share context.
pub struct LineWindowStrategy {
    window_lines: usize,
    overlap_lines: usize,
}

impl LineWindowStrategy {
    pub fn new(window_lines: usize, overlap_lines: usize) -> Self {
        let window_lines = window_lines.max(1);
        Self {
            window_lines,
            // The window must advance by at least one line
            overlap_lines: overlap_lines.min(window_lines - 1),
        }
    }
}

impl Default for LineWindowStrategy {
    fn default() -> Self {
        Self::new(50, 10)
    }
}

impl ChunkStrategy for LineWindowStrategy {
    fn chunk(&self, path: &str, content: &str) -> Vec<Chunk> {
        let lines: Vec<&str> = content.lines().collect();
        if lines.is_empty() {
            return Vec::new();
        }

        let language = Language::from_path(Path::new(path));
        let step = self.window_lines - self.overlap_lines;

        let mut chunks = Vec::new();
        let mut start = 0;

        while start < lines.len() {
            let end = (start + self.window_lines).min(lines.len());
            let chunk_content = lines[start..end].join("\n");
            let id = format!("{path}:{}-{}", start + 1, end);

            let mut chunk = Chunk::new(id, path, start + 1, end, chunk_content);
            if language != Language::Unknown {
                chunk = chunk.with_language(language.name());
            }
            chunks.push(chunk);

            if end == lines.len() {
                break;
            }
            start += step;
        }

        chunks
    }
}

/// Dispatch table from language to chunking strategy
///
/// Unregistered languages fall back to the default strategy, so every
/// file yields chunks regardless of its extension.
pub struct StrategyRegistry {
    strategies: HashMap<Language, Arc<dyn ChunkStrategy>>,
    fallback: Arc<dyn ChunkStrategy>,
}

impl StrategyRegistry {
    pub fn new(fallback: Arc<dyn ChunkStrategy>) -> Self {
        Self {
            strategies: HashMap::new(),
            fallback,
        }
    }

    /// Register a strategy for one language, replacing any previous entry
    pub fn register(&mut self, language: Language, strategy: Arc<dyn ChunkStrategy>) {
        self.strategies.insert(language, strategy);
    }

    /// Strategy that will handle the given language
    pub fn strategy_for(&self, language: Language) -> &Arc<dyn ChunkStrategy> {
        self.strategies.get(&language).unwrap_or(&self.fallback)
    }

    /// Split file text into chunks using the strategy registered for its language
    pub fn chunk_text(&self, path: &str, content: &str) -> Vec<Chunk> {
        let language = Language::from_path(Path::new(path));
        self.strategy_for(language).chunk(path, content)
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new(Arc::new(LineWindowStrategy::default()))
    }
}
