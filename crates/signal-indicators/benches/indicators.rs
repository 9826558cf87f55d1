//! Benchmarks for indicator implementations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use signal_core::traits::Indicator;
use signal_indicators::{Ema, Macd, Rsi};

fn generate_test_data(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| 100.0 + (i as f64 * 0.1).sin() * 10.0)
        .collect()
}

// Window sizes around the live rolling window and the default history fetch.
const SIZES: [usize; 3] = [100, 500, 10000];

fn benchmark_ema(c: &mut Criterion) {
    let mut group = c.benchmark_group("EMA");
    let ema = Ema::new(20).unwrap();

    for size in SIZES.iter() {
        let data = generate_test_data(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| ema.calculate(black_box(data)))
        });
    }

    group.finish();
}

fn benchmark_macd(c: &mut Criterion) {
    let mut group = c.benchmark_group("MACD");
    let macd = Macd::with_periods(12, 26, 9).unwrap();

    for size in SIZES.iter() {
        let data = generate_test_data(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| macd.calculate(black_box(data)))
        });
    }

    group.finish();
}

fn benchmark_rsi(c: &mut Criterion) {
    let mut group = c.benchmark_group("RSI");
    let rsi = Rsi::new(14).unwrap();

    for size in SIZES.iter() {
        let data = generate_test_data(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| rsi.calculate(black_box(data)))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_ema, benchmark_macd, benchmark_rsi);
criterion_main!(benches);
