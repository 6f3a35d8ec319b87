//! Ladder computation benchmarks.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use woox_grid_bot::domain::grid::{GridSpec, ladder};
use woox_grid_bot::domain::market::Side;

fn bench_ladder(c: &mut Criterion) {
    let spec = GridSpec {
        offset_bps: 3.0,
        step_bps: 10.0,
        grid_size: 3,
        base_size: 0.01,
        size_step: 0.02,
    };
    c.bench_function("ladder_3_levels", |b| {
        b.iter(|| ladder(black_box(30_000.0), Side::Bid, black_box(&spec)));
    });

    let deep = GridSpec {
        grid_size: 50,
        ..spec.clone()
    };
    c.bench_function("ladder_50_levels", |b| {
        b.iter(|| ladder(black_box(30_000.0), Side::Ask, black_box(&deep)));
    });
}

fn bench_both_sides(c: &mut Criterion) {
    let spec = GridSpec {
        offset_bps: 3.0,
        step_bps: 10.0,
        grid_size: 10,
        base_size: 0.01,
        size_step: 0.02,
    };
    c.bench_function("full_requote_both_sides", |b| {
        b.iter(|| {
            let bids = ladder(black_box(30_000.0), Side::Bid, &spec);
            let asks = ladder(black_box(30_000.0), Side::Ask, &spec);
            (bids, asks)
        });
    });
}

criterion_group!(benches, bench_ladder, bench_both_sides);
criterion_main!(benches);
