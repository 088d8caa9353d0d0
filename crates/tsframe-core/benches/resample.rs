//! Benchmarks for resampling and lookups

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use tsframe_core::{PartialSpec, RangeEnd, TimeIndex, TimeSeries, Timestamp};

fn create_test_series(rows: usize, freq: &str) -> TimeSeries {
    let start: Timestamp = "2015-01-01".parse().unwrap();
    let index = TimeIndex::range_str(start, RangeEnd::Periods(rows), freq).unwrap();
    let values = (0..rows).map(|i| 100.0 + (i as f64 % 10.0)).collect();
    TimeSeries::from_values(index, values).unwrap()
}

fn bench_downsample(c: &mut Criterion) {
    let minutes_small = create_test_series(1_000, "min");
    let minutes_large = create_test_series(100_000, "min");

    c.bench_function("downsample_sum_1k_rows", |b| {
        b.iter(|| black_box(&minutes_small).resample("1h").unwrap().sum())
    });

    c.bench_function("downsample_mean_100k_rows", |b| {
        b.iter(|| black_box(&minutes_large).resample("1h").unwrap().mean())
    });

    c.bench_function("downsample_month_end_100k_rows", |b| {
        b.iter(|| black_box(&minutes_large).resample("M").unwrap().last())
    });
}

fn bench_upsample(c: &mut Criterion) {
    let days = create_test_series(1_000, "D");

    c.bench_function("upsample_interpolate_1k_days", |b| {
        b.iter(|| black_box(&days).resample("1h").unwrap().interpolate())
    });

    c.bench_function("upsample_forward_fill_1k_days", |b| {
        b.iter(|| black_box(&days).resample("1h").unwrap().forward_fill())
    });
}

fn bench_lookup(c: &mut Criterion) {
    let minutes = create_test_series(100_000, "min");
    let spec: PartialSpec = "2015-02-10".parse().unwrap();
    let ts: Timestamp = "2015-02-10 13:37".parse().unwrap();

    c.bench_function("partial_lookup_100k_rows", |b| {
        b.iter(|| minutes.index().partial_lookup(black_box(&spec)))
    });

    c.bench_function("exact_lookup_100k_rows", |b| {
        b.iter(|| minutes.index().exact_lookup(black_box(ts)))
    });
}

criterion_group!(benches, bench_downsample, bench_upsample, bench_lookup);
criterion_main!(benches);
