//! Partition metadata store benchmarks.
//!
//! Measures tombstone write throughput and lookup latency with and
//! without the bloom fast path. The bloom case is dominated by misses
//! (never-deleted partitions), where a definite negative skips the
//! storage read entirely.

#![allow(clippy::expect_used, missing_docs)]

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use partmeta::{MetaStoreConfig, PartitionMetaStore, StorageEngine};
use tempfile::TempDir;

// =============================================================================
// Helpers
// =============================================================================

fn key_for(i: usize) -> Vec<u8> {
    let mut key = (i as u64).to_be_bytes().to_vec();
    key.extend_from_slice(b"-partition");
    key
}

/// File-backed store with `count` recorded tombstones.
fn populate_store(dir: &TempDir, bloom_total_bits: usize, count: usize) -> PartitionMetaStore {
    let engine = StorageEngine::open(dir.path().join("bench.redb")).expect("create database");
    let config = MetaStoreConfig::builder()
        .token_length(8)
        .bloom_total_bits(bloom_total_bits)
        .build()
        .expect("valid config");
    let store = PartitionMetaStore::new(engine.db(), config).expect("construct store");

    if bloom_total_bits > 0 {
        store.enable_bloom_filter().expect("enable bloom filter");
    }
    for i in 0..count {
        store.delete_partition(&key_for(i), 1000, i as i64).expect("delete");
    }
    store
}

// =============================================================================
// Tombstone writes
// =============================================================================

/// Benchmark delete throughput: fresh markers vs stale no-ops.
fn bench_delete_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("meta/delete_partition");
    group.throughput(Throughput::Elements(1));

    group.bench_function("fresh_marker", |b| {
        let temp_dir = TempDir::new().expect("create temp dir");
        let store = populate_store(&temp_dir, 0, 0);
        let mut marked_at = 0i64;
        b.iter(|| {
            marked_at += 1;
            store
                .delete_partition(black_box(b"01234567-hot-part"), 1000, marked_at)
                .expect("delete");
        });
    });

    group.bench_function("stale_noop", |b| {
        let temp_dir = TempDir::new().expect("create temp dir");
        let store = populate_store(&temp_dir, 0, 0);
        store.delete_partition(b"01234567-hot-part", 1000, i64::MAX).expect("delete");
        b.iter(|| {
            store.delete_partition(black_box(b"01234567-hot-part"), 1000, 0).expect("delete");
        });
    });

    group.finish();
}

// =============================================================================
// Lookups
// =============================================================================

/// Benchmark miss lookups with and without the bloom fast path.
fn bench_lookup_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("meta/lookup_miss");
    group.throughput(Throughput::Elements(1));

    for (label, bloom_total_bits) in [("no_bloom", 0usize), ("bloom_64k", 1 << 16)] {
        let temp_dir = TempDir::new().expect("create temp dir");
        let store = populate_store(&temp_dir, bloom_total_bits, 10_000);

        group.bench_with_input(BenchmarkId::new(label, "10k_tombstones"), &store, |b, store| {
            let mut counter = 0usize;
            b.iter(|| {
                counter += 1;
                // Keys past the populated range never have a marker.
                let key = key_for(1_000_000 + counter);
                black_box(store.partition_delete(&key).expect("lookup"))
            });
        });
    }

    group.finish();
}

/// Benchmark hit lookups (the bloom filter cannot skip these).
fn bench_lookup_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("meta/lookup_hit");
    group.throughput(Throughput::Elements(1));

    let temp_dir = TempDir::new().expect("create temp dir");
    let store = populate_store(&temp_dir, 1 << 16, 10_000);

    group.bench_function("10k_tombstones", |b| {
        let mut counter = 0usize;
        b.iter(|| {
            counter = (counter + 1) % 10_000;
            let key = key_for(counter);
            black_box(store.partition_delete(&key).expect("lookup"))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_delete_partition, bench_lookup_miss, bench_lookup_hit);
criterion_main!(benches);
