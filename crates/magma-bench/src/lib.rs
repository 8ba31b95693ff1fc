//! Benchmark profiles and utilities for the Magma heat-field renderer.
//!
//! Provides pre-built [`MagmaConfig`] profiles and warmed-up state for
//! benchmarks and examples:
//!
//! - [`reference_profile`]: 256² field into a 256x256 viewport
//! - [`stress_profile`]: 1024² field into a 1280x720 viewport
//! - [`warm_field`]: deterministic stroke history via seed

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use magma_arena::{ArenaConfig, HeatBuffers};
use magma_core::{PointerSnapshot, ResourceError, Viewport};
use magma_engine::MagmaConfig;
use magma_kernels::{DiffusionCooling, SerialBackend};

/// Reference profile: the default 256² field at 60 Hz.
pub fn reference_profile(seed: u64) -> MagmaConfig {
    MagmaConfig {
        seed,
        ..MagmaConfig::default()
    }
}

/// Stress profile: 1024² field (~1M cells) into a 720p viewport.
pub fn stress_profile(seed: u64) -> MagmaConfig {
    MagmaConfig {
        field_side: 1024,
        viewport: Viewport::new(1280, 720),
        seed,
        ..MagmaConfig::default()
    }
}

/// Deterministic pointer positions for a stroke of `frames` samples.
///
/// Positions follow a Lissajous curve whose phase comes from `seed`, so
/// different seeds draw different but reproducible strokes.
pub fn stroke_path(frames: usize, seed: u64) -> Vec<PointerSnapshot> {
    let phase = (seed % 360) as f32 * std::f32::consts::PI / 180.0;
    (0..frames)
        .map(|i| {
            let t = i as f32 / frames.max(1) as f32 * std::f32::consts::TAU;
            let u = 0.5 + 0.35 * (t + phase).sin();
            let v = 0.5 + 0.35 * (2.0 * t).sin();
            PointerSnapshot::new(u, v, true)
        })
        .collect()
}

/// Buffers for `config` with `frames` steps of drawing already applied.
pub fn warm_field(
    config: &MagmaConfig,
    frames: usize,
) -> Result<(HeatBuffers, DiffusionCooling), Box<dyn std::error::Error>> {
    let mut buffers = HeatBuffers::new(ArenaConfig::new(config.field_side))?;
    let kernel = config.build_diffusion()?;
    let aspect = config.viewport.aspect();
    for pointer in stroke_path(frames, config.seed) {
        kernel.step(&SerialBackend, buffers.begin_step(), &pointer, aspect)?;
        buffers.swap();
    }
    Ok((buffers, kernel))
}

/// One diffusion step followed by a swap.
pub fn step_once(
    kernel: &DiffusionCooling,
    backend: &dyn magma_kernels::ExecutionBackend,
    buffers: &mut HeatBuffers,
    pointer: &PointerSnapshot,
    aspect: f32,
) -> Result<(), ResourceError> {
    kernel.step(backend, buffers.begin_step(), pointer, aspect)?;
    buffers.swap();
    Ok(())
}
