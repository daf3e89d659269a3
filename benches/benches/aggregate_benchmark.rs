//! Candle engine benchmarks.
//!
//! Run with: `cargo bench --package candlefold-bench`

use candlefold_bench::{split_live, synthetic_ticks};
use candlefold_lib::{Candle, Interval, SeriesState, aggregate, open_candle, rehydrate};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

const SIZES: [usize; 3] = [1_000, 10_000, 100_000];

fn aggregate_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");

    for size in SIZES {
        let ticks = synthetic_ticks(size, 42);
        group.throughput(Throughput::Elements(size as u64));

        for interval in [Interval::MINUTE_1, Interval::HOUR_1] {
            group.bench_with_input(
                BenchmarkId::new(interval.to_string(), size),
                &ticks,
                |b, ticks| b.iter(|| aggregate(black_box(ticks), interval)),
            );
        }
    }

    group.finish();
}

fn rehydrate_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("rehydrate");

    for size in SIZES {
        let (base, live) = split_live(synthetic_ticks(size, 7), 600);
        group.throughput(Throughput::Elements(live.len() as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &(base, live), |b, input| {
            b.iter(|| rehydrate(black_box(input.0.clone()), input.1.iter().cloned()));
        });
    }

    group.finish();
}

fn live_merge_benchmark(c: &mut Criterion) {
    let ticks = synthetic_ticks(10_000, 3);
    let interval = Interval::MINUTE_5;
    let history: Vec<Candle> = aggregate(&ticks[..9_000], interval);
    let live = &ticks[9_000..];

    c.bench_function("live_merge/1000_ticks", |b| {
        b.iter(|| {
            let mut series = SeriesState::from_series(history.clone());
            let mut window: Vec<_> = ticks[..9_000].to_vec();
            for tick in live {
                window.push(tick.clone());
                let bucket = interval.bucket(tick.time);
                if let Some(candle) = open_candle(&window, interval, bucket) {
                    black_box(series.apply(candle));
                }
            }
            series.len()
        });
    });
}

criterion_group!(
    benches,
    aggregate_benchmark,
    rehydrate_benchmark,
    live_merge_benchmark
);
criterion_main!(benches);
