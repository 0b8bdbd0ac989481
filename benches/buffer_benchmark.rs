//! Benchmark for streaming buffer operations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trueno_live::buffer::StreamBuffer;
use trueno_live::generator::{DataProducer, SyntheticGenerator};

const CATEGORIES: [&str; 4] = ["Alpha", "Beta", "Gamma", "Delta"];

fn filled_buffer(max_points: usize) -> (StreamBuffer, SyntheticGenerator) {
    let mut generator = SyntheticGenerator::new(42);
    let mut buffer = StreamBuffer::new(CATEGORIES, max_points).unwrap();
    buffer.backfill(generator.initial_data(max_points, 0));
    (buffer, generator)
}

fn buffer_append_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_append");

    for max_points in [1_000, 10_000, 100_000] {
        let (mut buffer, mut generator) = filled_buffer(max_points);
        let mut now = max_points as i64 * 100;

        group.bench_with_input(BenchmarkId::from_parameter(max_points), &max_points, |b, _| {
            b.iter(|| {
                now += 100;
                let latest = buffer.latest_per_category();
                let points = generator.next_points(&latest, now);
                black_box(buffer.append(points));
            });
        });
    }

    group.finish();
}

fn buffer_sorted_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_all_points_sorted");

    for max_points in [1_000, 10_000] {
        let (mut buffer, mut generator) = filled_buffer(max_points);
        let mut now = max_points as i64 * 100;

        group.bench_with_input(BenchmarkId::new("rebuild", max_points), &max_points, |b, _| {
            b.iter(|| {
                now += 100;
                let latest = buffer.latest_per_category();
                buffer.append(generator.next_points(&latest, now));
                black_box(buffer.all_points_sorted().len());
            });
        });

        group.bench_with_input(BenchmarkId::new("cached", max_points), &max_points, |b, _| {
            b.iter(|| black_box(buffer.all_points_sorted().len()));
        });
    }

    group.finish();
}

criterion_group!(benches, buffer_append_benchmark, buffer_sorted_benchmark);
criterion_main!(benches);
