//! Benchmarks for the streamline engine.

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use streamlines::{
    compute::{ColorRamp, StreamlineEngine, VectorField},
    schema::{Bounds, ColorSampling, StreamlineConfig, spectrum_stops},
};

/// Solid-body rotation about the vertical axis with a slow updraft.
fn vortex_field(n: usize) -> Arc<VectorField> {
    let bounds = Bounds {
        x_min: -1.0,
        x_max: 1.0,
        y_min: -1.0,
        y_max: 1.0,
        z_min: 0.0,
        z_max: 2.0,
    };
    let half = n as f32 / 2.0;
    let field = VectorField::from_fn((n, n, n), bounds, |i, j, _| {
        let x = (j as f32 - half) / half;
        let y = (i as f32 - half) / half;
        (x * x + y * y <= 1.0).then_some([-y, x, 0.2])
    })
    .unwrap();
    Arc::new(field)
}

fn bench_engine_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_tick");
    let field = vortex_field(48);

    for particles in [1_000, 10_000, 50_000] {
        let config = StreamlineConfig {
            particle_count: particles,
            velocity_factor: 0.02,
            magnitude_max: 1.5,
            ..Default::default()
        };
        let mut engine = StreamlineEngine::seeded(field.clone(), config, 42).unwrap();

        group.bench_with_input(
            BenchmarkId::from_parameter(particles),
            &particles,
            |b, _| {
                b.iter(|| {
                    black_box(&mut engine).tick();
                });
            },
        );
    }

    group.finish();
}

fn bench_color_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("color_sampling");
    let field = vortex_field(48);

    for sampling in [ColorSampling::Interpolated, ColorSampling::Bucketed] {
        let config = StreamlineConfig {
            particle_count: 10_000,
            velocity_factor: 0.02,
            magnitude_max: 1.5,
            color_sampling: sampling,
            ..Default::default()
        };
        let mut engine = StreamlineEngine::seeded(field.clone(), config, 42).unwrap();

        group.bench_function(format!("{:?}", sampling), |b| {
            b.iter(|| {
                black_box(&mut engine).tick();
            });
        });
    }

    group.finish();
}

fn bench_ramp_build(c: &mut Criterion) {
    c.bench_function("ramp_build_100", |b| {
        b.iter(|| ColorRamp::new(black_box(spectrum_stops()), 100).unwrap());
    });
}

criterion_group!(
    benches,
    bench_engine_tick,
    bench_color_sampling,
    bench_ramp_build
);
criterion_main!(benches);
