use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use nest2d::config::{NestConfig, ThreadingMode};
use nest2d::geometry::primitives::{Point, Polygon};
use nest2d::io::ext_repr::{ExtBin, ExtItem, ExtNestInput, ExtSPolygon, ExtShape};
use nest2d::kernel::{GeoKernel, Tolerance};
use nest2d::nfp::NfpEngine;
use nest2d::orchestrator::{CancellationToken, Nester};

criterion_main!(benches);
criterion_group!(benches, nfp_bench, nest_bench);

/// Regular star with `n` spikes, concave for every `n > 2`
fn star(n: usize, r_outer: f64, r_inner: f64) -> Vec<(f64, f64)> {
    (0..2 * n)
        .map(|i| {
            let r = if i % 2 == 0 { r_outer } else { r_inner };
            let angle = std::f64::consts::PI * i as f64 / n as f64;
            (r * angle.cos(), r * angle.sin())
        })
        .collect()
}

fn polygon(points: &[(f64, f64)]) -> Polygon {
    Polygon::from_contours(points.iter().map(|&(x, y)| Point(x, y)).collect(), vec![])
        .expect("valid polygon")
}

/// Outer NFP of two (uncached) stars, for an increasing number of spikes
fn nfp_bench(c: &mut Criterion) {
    let engine = NfpEngine::new(Arc::new(GeoKernel::new()), Tolerance::new(1e-6, 100.0));
    let mut group = c.benchmark_group("star_nfp");
    for n_spikes in [3, 5, 8, 12] {
        let stationary = polygon(&star(n_spikes, 10.0, 4.0));
        let orbiting = polygon(&star(n_spikes, 6.0, 3.0));
        group.bench_function(BenchmarkId::from_parameter(n_spikes), |b| {
            b.iter(|| engine.compute_nfp(&stationary, &orbiting).expect("nfp"))
        });
    }
    group.finish();
}

/// Complete baseline pass over a small mixed instance
fn nest_bench(c: &mut Criterion) {
    let item = |id: u64, shape: ExtShape, quantity: usize| ExtItem {
        id,
        shape,
        quantity,
        priority: 0,
        allowed_rotations: None,
    };
    let input = ExtNestInput {
        items: vec![
            item(0, ExtShape::SimplePolygon(ExtSPolygon(star(5, 6.0, 3.0))), 6),
            item(
                1,
                ExtShape::Rectangle {
                    x_min: 0.0,
                    y_min: 0.0,
                    width: 8.0,
                    height: 3.0,
                },
                8,
            ),
        ],
        bins: vec![ExtBin {
            id: 0,
            shape: ExtShape::Rectangle {
                x_min: 0.0,
                y_min: 0.0,
                width: 40.0,
                height: 30.0,
            },
            stock: None,
        }],
    };

    let mut group = c.benchmark_group("nest_baseline");
    group.sample_size(10);
    for (name, threading_mode) in [
        ("sequential", ThreadingMode::Sequential),
        ("parallel", ThreadingMode::Parallel { n_threads: 0 }),
    ] {
        let nester = Nester::with_default_backends(NestConfig {
            threading_mode,
            ..Default::default()
        });
        group.bench_function(name, |b| {
            b.iter(|| nester.run(&input, &CancellationToken::new()))
        });
    }
    group.finish();
}
