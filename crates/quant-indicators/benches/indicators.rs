//! Benchmarks for indicator implementations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use quant_core::bars_from_closes;
use quant_indicators::{atr, bollinger_bands, ema, macd_lines, rsi, sma};

fn generate_test_data(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| 100.0 + (i as f64 * 0.1).sin() * 10.0)
        .collect()
}

fn benchmark_moving_averages(c: &mut Criterion) {
    let mut group = c.benchmark_group("MovingAverage");

    for size in [1000, 10000, 100000].iter() {
        let data = generate_test_data(*size);

        group.bench_with_input(BenchmarkId::new("sma", size), &data, |b, data| {
            b.iter(|| sma(black_box(data), black_box(20)))
        });

        group.bench_with_input(BenchmarkId::new("ema", size), &data, |b, data| {
            b.iter(|| ema(black_box(data), black_box(20)))
        });
    }

    group.finish();
}

fn benchmark_momentum(c: &mut Criterion) {
    let mut group = c.benchmark_group("Momentum");

    for size in [1000, 10000, 100000].iter() {
        let data = generate_test_data(*size);

        group.bench_with_input(BenchmarkId::new("rsi", size), &data, |b, data| {
            b.iter(|| rsi(black_box(data), black_box(14)))
        });

        group.bench_with_input(BenchmarkId::new("macd", size), &data, |b, data| {
            b.iter(|| macd_lines(black_box(data), 12, 26, 9))
        });
    }

    group.finish();
}

fn benchmark_volatility(c: &mut Criterion) {
    let mut group = c.benchmark_group("Volatility");

    for size in [1000, 10000, 100000].iter() {
        let data = generate_test_data(*size);
        let bars = bars_from_closes(&data, 60_000);

        group.bench_with_input(BenchmarkId::new("bollinger", size), &data, |b, data| {
            b.iter(|| bollinger_bands(black_box(data), black_box(20), 2.0))
        });

        group.bench_with_input(BenchmarkId::new("atr", size), &bars, |b, bars| {
            b.iter(|| atr(black_box(bars), black_box(14)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_moving_averages,
    benchmark_momentum,
    benchmark_volatility
);
criterion_main!(benches);
