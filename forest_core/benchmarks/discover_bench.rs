use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use forest_core::{builtin_parameters, AgentId, ChunkMiner, MimcSponge, PerlinNoise};
use forest_schema::{ChunkFootprint, Coordinate};

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");
    let miner = ChunkMiner::new(builtin_parameters()).expect("builtin parameters are valid");

    for side in [4u32, 8, 16] {
        group.bench_with_input(BenchmarkId::new("side", side), &side, |b, &side| {
            b.iter(|| miner.scan(ChunkFootprint::new(Coordinate::new(-8, -8), side)))
        });
    }

    group.finish();
}

fn bench_discover(c: &mut Criterion) {
    let params = builtin_parameters();
    c.bench_function("discover/fresh_agent", |b| {
        b.iter_batched(
            || ChunkMiner::new(Arc::clone(&params)).expect("builtin parameters are valid"),
            |miner| {
                miner.discover(
                    ChunkFootprint::new(Coordinate::new(-8, -8), 8),
                    &AgentId::from("bench"),
                )
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_primitives(c: &mut Criterion) {
    let planet = MimcSponge::planet(69);
    let noise = PerlinNoise::new(69, 512, false, false);
    c.bench_function("mimc/planet", |b| b.iter(|| planet.hash_coords(123, -456)));
    c.bench_function("perlin/floor", |b| {
        b.iter(|| noise.value(Coordinate::new(123, -456), true))
    });
}

criterion_group!(discover_benches, bench_scan, bench_discover, bench_primitives);
criterion_main!(discover_benches);
