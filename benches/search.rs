use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

fn benchmark_scan(c: &mut Criterion) {
    const STEPS: u64 = 1_000_000;
    let mut group = c.benchmark_group("scan");
    group.throughput(Throughput::Elements(STEPS));
    for (p, g) in benchmark_tools::GROUPS {
        group.bench_with_input(BenchmarkId::from_parameter(p), &(p, g), |b, &(p, g)| {
            b.iter(|| benchmark_tools::scan(black_box(p), black_box(g), STEPS))
        });
    }
    group.finish();
}

fn benchmark_race(c: &mut Criterion) {
    let (p, g) = benchmark_tools::GROUPS[1];
    let mut group = c.benchmark_group("race");
    group.significance_level(0.1).sample_size(20);
    group.measurement_time(Duration::new(30, 0));
    for n in [1, 2, 4] {
        group.bench_with_input(BenchmarkId::new("workers", n), &n, |b, &n| {
            b.iter(|| benchmark_tools::race_dlp(p, g, black_box(10_000_000), n))
        });
    }
    group.finish();
}

criterion_group!(scan, benchmark_scan);
criterion_group!(race, benchmark_race);
criterion_main!(scan, race);
