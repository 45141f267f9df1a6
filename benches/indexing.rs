//! Construction and query benchmarks over synthetic DNA.
//!
//! Run with: `cargo bench`
//! Save baseline: `cargo bench -- --save-baseline main`
//! Compare: `cargo bench -- --baseline main`

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use esax::esa::{BackendChoice, EsaIndex, IndexOptions};
use esax::seq::Sequence;

fn synthetic_dna(len: usize, mut state: u64) -> Vec<u8> {
    const BASES: [u8; 4] = *b"ACGT";
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            BASES[(state >> 33) as usize % 4]
        })
        .collect()
}

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.sample_size(10);
    for len in [100_000usize, 1_000_000] {
        let seq = Sequence::new("bench", &synthetic_dna(len, 42)).unwrap();
        group.bench_with_input(BenchmarkId::new("dense", len), &seq, |b, seq| {
            b.iter(|| EsaIndex::build(black_box(seq), &IndexOptions::default()).unwrap())
        });
    }
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let bases = synthetic_dna(1_000_000, 7);
    let seq = Sequence::new("bench", &bases).unwrap();
    // 64 patterns sampled from the sequence so every query has hits.
    let patterns: Vec<Vec<u8>> = (0..64)
        .map(|i| bases[i * 10_000..i * 10_000 + 20].to_vec())
        .collect();

    let temp = tempfile::tempdir().unwrap();
    let mut group = c.benchmark_group("query");
    for (label, backend) in [
        ("dense", BackendChoice::Dense),
        ("packed", BackendChoice::Packed),
        ("mmap", BackendChoice::Mmap(temp.path().join("bench.esa"))),
    ] {
        let index = EsaIndex::build(
            &seq,
            &IndexOptions {
                backend,
                bucket_depth: 8,
            },
        )
        .unwrap();
        group.bench_function(label, |b| {
            b.iter(|| {
                for pattern in &patterns {
                    black_box(index.find_hit_count(black_box(pattern)).unwrap());
                }
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_construction, bench_queries);
criterion_main!(benches);
