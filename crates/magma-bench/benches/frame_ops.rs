//! Criterion benchmarks for whole frames through the scheduler.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use magma_bench::reference_profile;
use magma_engine::{FrameScheduler, InputEvent, NullPresenter, Passthrough};
use magma_kernels::RayonBackend;

/// Full frame (input, diffusion, shading, composite, present) on the
/// reference profile with the pen held down.
fn bench_frame_drawing(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");
    group.sample_size(20);

    let mut serial = FrameScheduler::headless(reference_profile(42)).unwrap();
    serial.input().send(InputEvent::PrimaryDown).unwrap();
    group.bench_function("serial_drawing", |b| {
        b.iter(|| black_box(serial.run_frame().unwrap().metrics.max_heat));
    });

    let mut parallel = FrameScheduler::new(
        reference_profile(42),
        Box::new(RayonBackend::new(None).unwrap()),
        Box::new(Passthrough),
        Box::new(NullPresenter),
    )
    .unwrap();
    parallel.input().send(InputEvent::PrimaryDown).unwrap();
    group.bench_function("rayon_drawing", |b| {
        b.iter(|| black_box(parallel.run_frame().unwrap().metrics.max_heat));
    });

    group.finish();
}

/// Frames on an extinct field: the steady-state idle cost.
fn bench_frame_idle(c: &mut Criterion) {
    let mut s = FrameScheduler::headless(reference_profile(42)).unwrap();
    c.bench_function("frame/serial_idle", |b| {
        b.iter(|| black_box(s.run_frame().unwrap().metrics.total_us));
    });
}

criterion_group!(benches, bench_frame_drawing, bench_frame_idle);
criterion_main!(benches);
