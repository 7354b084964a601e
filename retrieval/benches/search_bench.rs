use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use quarry_embedder::{Embedder, EmbeddingClient, HashingEmbedder};
use quarry_retrieval::{SearchConfig, SearchOptions, SearchPipeline, SearchServices};
use quarry_vector_index::{Chunk, IndexRecord, VectorIndex};
use std::sync::Arc;
use tokio::runtime::Runtime;

fn create_test_chunks(count: usize) -> Vec<Chunk> {
    (0..count)
        .map(|i| {
            Chunk::new(
                format!("src/file_{i}.rs:1-50"),
                format!("src/file_{i}.rs"),
                1,
                50,
                format!(
                    "fn function_{i}() {{\n    let value = {i};\n    value * 2\n}}\n// parse cache retry worker {i}"
                ),
            )
            .with_language("rust")
        })
        .collect()
}

async fn setup_pipeline(chunk_count: usize, config: SearchConfig) -> SearchPipeline {
    let embedder = HashingEmbedder::new(128);
    let index = VectorIndex::new();

    let mut records = Vec::with_capacity(chunk_count);
    for chunk in create_test_chunks(chunk_count) {
        let embedding = embedder.embed(&chunk.content).await.unwrap();
        records.push(IndexRecord::new(chunk, embedding));
    }
    index.add(records).await.unwrap();

    SearchPipeline::new(
        config,
        Arc::new(index),
        EmbeddingClient::new(Arc::new(embedder)),
        SearchServices::default(),
    )
    .unwrap()
}

fn bench_config() -> SearchConfig {
    SearchConfig {
        min_score: 0.0,
        ..Default::default()
    }
}

fn bench_search_latency(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("search_latency");

    for chunk_count in [100, 500, 1000, 5000] {
        group.throughput(Throughput::Elements(chunk_count as u64));

        let pipeline = rt.block_on(setup_pipeline(chunk_count, bench_config()));
        let options = SearchOptions {
            use_expansion: false,
            ..Default::default()
        };

        group.bench_with_input(
            BenchmarkId::from_parameter(chunk_count),
            &chunk_count,
            |b, _| {
                b.to_async(&rt).iter(|| async {
                    let query = format!("cache retry {}", rand::random::<u32>());
                    let results = pipeline
                        .search(black_box(&query), options)
                        .await
                        .unwrap();
                    black_box(results);
                });
            },
        );
    }

    group.finish();
}

fn bench_retrieval_width(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("retrieval_width");

    for width in [5, 10, 50] {
        let config = SearchConfig {
            retrieval_width: width,
            ..bench_config()
        };
        let pipeline = rt.block_on(setup_pipeline(1000, config));
        let options = SearchOptions {
            use_expansion: false,
            ..Default::default()
        };

        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, _| {
            b.to_async(&rt).iter(|| async {
                let query = format!("worker pool {}", rand::random::<u32>());
                let results = pipeline.search(black_box(&query), options).await.unwrap();
                black_box(results);
            });
        });
    }

    group.finish();
}

fn bench_cache_performance(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let pipeline = rt.block_on(setup_pipeline(1000, bench_config()));
    let options = SearchOptions::default();

    let mut group = c.benchmark_group("cache");

    group.bench_function("cold_cache", |b| {
        b.to_async(&rt).iter(|| async {
            let query = format!("unique query {}", rand::random::<u32>());
            let results = pipeline.search(black_box(&query), options).await.unwrap();
            black_box(results);
        });
    });

    let _ = rt.block_on(pipeline.search("cached query", options));
    group.bench_function("warm_cache", |b| {
        b.to_async(&rt).iter(|| async {
            let results = pipeline
                .search(black_box("cached query"), options)
                .await
                .unwrap();
            black_box(results);
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_search_latency,
    bench_retrieval_width,
    bench_cache_performance
);
criterion_main!(benches);
