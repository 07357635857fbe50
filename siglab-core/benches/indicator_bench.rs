//! Criterion benchmarks for the per-symbol hot path.
//!
//! Benchmarks:
//! 1. Indicator pass (SMA, Bollinger, returns, RSI)
//! 2. Signal pass (three state machines over a prepared series)
//! 3. Full pass including CSV encoding

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use siglab_core::domain::{PriceBar, Series};
use siglab_core::export::series_to_csv;
use siglab_core::indicators::rolling_mean;
use siglab_core::{compute_indicators, compute_strategies};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_series(n: usize) -> Series {
    let base_date = chrono::NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
    let bars = (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0 + i as f64 * 0.01;
            PriceBar {
                date: base_date + chrono::Duration::days(i as i64),
                open: close - 0.3,
                high: close + 1.5,
                low: close - 1.5,
                close,
                volume: 1_000_000.0 + (i % 500) as f64,
            }
        })
        .collect();
    Series::new("BENCH", bars)
}

// ── 1. Indicators ────────────────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicators");

    for &bar_count in &[1_000, 5_000] {
        let series = make_series(bar_count);
        let closes = series.closes();

        group.bench_with_input(BenchmarkId::new("sma_200", bar_count), &closes, |b, closes| {
            b.iter(|| rolling_mean(black_box(closes), 200));
        });

        group.bench_with_input(BenchmarkId::new("all", bar_count), &series, |b, series| {
            b.iter(|| compute_indicators(black_box(series.clone())));
        });
    }

    group.finish();
}

// ── 2. Signals ───────────────────────────────────────────────────────

fn bench_signals(c: &mut Criterion) {
    let prepared = match compute_indicators(make_series(5_000)) {
        Ok(series) => series,
        Err(e) => panic!("indicator pass failed: {e}"),
    };

    c.bench_function("signals/three_strategies_5000", |b| {
        b.iter(|| compute_strategies(black_box(prepared.clone())));
    });
}

// ── 3. Full pass ─────────────────────────────────────────────────────

fn bench_full_pass(c: &mut Criterion) {
    let series = make_series(5_000);

    c.bench_function("full_pass/5000_with_csv", |b| {
        b.iter(|| {
            let s = compute_indicators(black_box(series.clone())).unwrap();
            let s = compute_strategies(s).unwrap();
            series_to_csv(&s).unwrap()
        });
    });
}

criterion_group!(benches, bench_indicators, bench_signals, bench_full_pass);
criterion_main!(benches);
