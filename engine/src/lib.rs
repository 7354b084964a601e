/*!
# Quarry Engine

Facade tying the quarry crates into one semantic code search engine:
ingest chunks, maintain the vector index, serve multi-stage searches.

## Features

- **One-call setup**: builder wires the embedder and optional services
- **Shared index**: ingest and search operate on the same copy-on-write index
- **Cache coherence**: index mutations invalidate cached search results
- **Persistence**: save the index to disk and load it back at build time

## Example

```rust,no_run
use quarry_embedder::HashingEmbedder;
use quarry_engine::{EngineConfig, SearchEngine};
use quarry_ingest::StrategyRegistry;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let engine = SearchEngine::builder(
        EngineConfig::default(),
        Arc::new(HashingEmbedder::default()),
    )
    .build()?;

    let registry = StrategyRegistry::default();
    let chunks = registry.chunk_text("src/lib.rs", "fn main() { run(); }\n");
    engine.update_chunks(chunks).await?;

    let results = engine.search("run the program", 5, true, false).await?;
    for result in results {
        println!("{} ({:.2})", result.chunk.path, result.final_score);
    }
    Ok(())
}
```
*/

mod config;
mod engine;
mod error;

pub use config::EngineConfig;
pub use engine::{EngineInfo, SearchEngine, SearchEngineBuilder};
pub use error::{EngineError, Result};
