//! Benchmarks for the decomposition phase
//!
//! Run with: cargo bench --bench decomposition_benchmark

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ptprune_core::{Budget, Input, ItgVariant, NoProgress, PruneConfig, Pruner};
use std::hint::black_box;

/// Generates a table of every contiguous sub-phrase pair of a monotone
/// sentence pair, so long pairs have many decompositions
fn generate_table(sentence_len: usize) -> String {
    let source: Vec<String> = (0..sentence_len).map(|i| format!("s{i}")).collect();
    let target: Vec<String> = (0..sentence_len).map(|i| format!("t{i}")).collect();

    let mut table = String::new();
    for start in 0..sentence_len {
        for end in start + 1..=sentence_len {
            let prob = 1.0 / (end - start + 1) as f64;
            table.push_str(&format!(
                "{} ||| {} ||| {prob} {prob} c={}\n",
                source[start..end].join(" "),
                target[start..end].join(" "),
                end - start
            ));
        }
    }
    table
}

fn score(table: &str, config: PruneConfig) {
    Pruner::new(config)
        .unwrap()
        .score(Input::from_text(table), &NoProgress)
        .unwrap();
}

/// Viterbi against ITG on the same tables
fn bench_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("strategies");

    for len in [6, 10, 14] {
        let table = generate_table(len);
        group.throughput(Throughput::Elements((len * (len + 1) / 2) as u64));

        group.bench_with_input(BenchmarkId::new("viterbi", len), &table, |b, table| {
            b.iter(|| {
                let config = PruneConfig::builder(Budget::TopPercent(50.0))
                    .itg_threshold(None)
                    .build()
                    .unwrap();
                score(black_box(table), config);
            });
        });

        for (name, variant) in [
            ("itg_recursive", ItgVariant::Recursive),
            ("itg_batched", ItgVariant::Batched),
        ] {
            group.bench_with_input(BenchmarkId::new(name, len), &table, |b, table| {
                b.iter(|| {
                    let config = PruneConfig::builder(Budget::TopPercent(50.0))
                        .itg_threshold(Some(2))
                        .itg_variant(variant)
                        .build()
                        .unwrap();
                    score(black_box(table), config);
                });
            });
        }
    }

    group.finish();
}

/// Thread scaling of the parallel scheduler
fn bench_thread_counts(c: &mut Criterion) {
    let mut group = c.benchmark_group("threads");
    let table = generate_table(16);

    for threads in [1, 2, 4] {
        group.bench_with_input(BenchmarkId::from_parameter(threads), &table, |b, table| {
            b.iter(|| {
                let config = PruneConfig::builder(Budget::TopPercent(50.0))
                    .threads(Some(threads))
                    .chunk_size(4)
                    .build()
                    .unwrap();
                score(black_box(table), config);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_strategies, bench_thread_counts);
criterion_main!(benches);
