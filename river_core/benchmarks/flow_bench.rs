use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use river_core::{chemical_source, populate_flow_rate, populated_reference_network, Observation};

#[path = "../tests/common/mod.rs"]
mod common;

fn bench_flow_propagation(c: &mut Criterion) {
    let mut group = c.benchmark_group("flow_propagation");

    for size in [64u32, 512, 4096] {
        group.bench_with_input(BenchmarkId::new("random_basin", size), &size, |b, &size| {
            b.iter_batched(
                || common::random_tree(u64::from(size), size, 0),
                |mut network| {
                    populate_flow_rate(&mut network).expect("random basin is a tree");
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_source_inference(c: &mut Criterion) {
    let network = populated_reference_network();
    let mut group = c.benchmark_group("source_inference");

    let scenarios: [(&str, Vec<Observation>); 2] = [
        (
            "split_branches",
            vec![(58, 3.0).into(), (55, 10.0).into(), (52, 5.0).into()],
        ),
        (
            "diluting_run",
            vec![(57, 10.0).into(), (56, 5.0).into(), (55, 2.0).into()],
        ),
    ];
    for (name, readings) in &scenarios {
        group.bench_with_input(BenchmarkId::new("reference", name), readings, |b, readings| {
            b.iter(|| chemical_source(&network, readings));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_flow_propagation, bench_source_inference);
criterion_main!(benches);
