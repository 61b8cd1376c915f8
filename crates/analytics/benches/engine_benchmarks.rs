use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;

use salesight_analytics::{KMeans, feature_vector, forecast, normalize, segment};
use salesight_core::{FeatureRecord, PeriodKey, ProductAggregate, TimeSeriesPoint};

/// Synthetic catalogue with a long-tailed sales distribution.
fn catalogue(size: usize) -> Vec<FeatureRecord> {
    (0..size)
        .map(|i| {
            let rank = i as f64 + 1.0;
            let sales = 250_000.0 / rank + (i % 7) as f64 * 300.0;
            let units = 40.0 + (i % 13) as f64 * 25.0;
            ProductAggregate::new(format!("SKU-{i:05}"), sales, units).into()
        })
        .collect()
}

fn monthly_series(months: u32) -> Vec<TimeSeriesPoint> {
    let start = PeriodKey::new(2015, 1).unwrap();
    (0..months)
        .map(|i| {
            let period = start.offset(i).unwrap();
            let seasonal = ((period.month() as f64) * std::f64::consts::PI / 6.0).sin() * 4_000.0;
            TimeSeriesPoint::new(period, 50_000.0 + 120.0 * i as f64 + seasonal)
        })
        .collect()
}

fn bench_kmeans_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("kmeans_fit");

    for size in [100usize, 1_000, 10_000] {
        let records = catalogue(size);
        let rows: Vec<Vec<f64>> = records.iter().map(feature_vector).collect();
        let normalized = normalize(&rows).unwrap();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &normalized, |b, points| {
            b.iter(|| {
                let mut rng = StdRng::seed_from_u64(7);
                black_box(KMeans::new(4).fit(black_box(points), &mut rng))
            })
        });
    }

    group.finish();
}

fn bench_segmentation(c: &mut Criterion) {
    let mut group = c.benchmark_group("segmentation");

    for size in [100usize, 1_000] {
        let records = catalogue(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| {
                let mut rng = StdRng::seed_from_u64(7);
                black_box(segment(black_box(records), 4, &mut rng).unwrap())
            })
        });
    }

    group.finish();
}

fn bench_forecast(c: &mut Criterion) {
    let mut group = c.benchmark_group("forecast");

    for months in [24u32, 120] {
        let series = monthly_series(months);
        group.bench_with_input(BenchmarkId::from_parameter(months), &series, |b, series| {
            b.iter(|| black_box(forecast(black_box(series), 3).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_kmeans_fit, bench_segmentation, bench_forecast);
criterion_main!(benches);
