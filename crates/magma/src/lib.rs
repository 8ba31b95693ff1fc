//! Magma: a realtime molten heat-field renderer.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Magma sub-crates. For most users, adding `magma` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use magma::prelude::*;
//!
//! let config = MagmaConfig {
//!     field_side: 32,
//!     viewport: Viewport::new(32, 32),
//!     ..MagmaConfig::default()
//! };
//! let mut scheduler = FrameScheduler::headless(config).unwrap();
//!
//! // Press at the centre and hold for a few frames.
//! scheduler.input().send(InputEvent::PrimaryDown).unwrap();
//! for _ in 0..5 {
//!     scheduler.run_frame().unwrap();
//! }
//! assert!(scheduler.field().max() > 0.0);
//! assert!(scheduler.image().coverage() > 0.0);
//! assert_eq!(scheduler.frame_id(), FrameId(5));
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `magma-core` | IDs, colours, images, pointer snapshots, errors |
//! | [`arena`] | `magma-arena` | Heat fields and ping-pong buffers |
//! | [`kernels`] | `magma-kernels` | Diffusion, shading, noise, lighting, backends |
//! | [`engine`] | `magma-engine` | Configuration, input, frame scheduler, realtime loop |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`magma-core`).
///
/// Contains [`types::FrameImage`], [`types::PointerSnapshot`], the colour
/// types and the error taxonomy ([`types::ConfigError`],
/// [`types::ResourceError`]).
pub use magma_core as types;

/// Heat-field storage (`magma-arena`).
///
/// [`arena::HeatField`] holds one grid; [`arena::HeatBuffers`] alternates
/// two of them without copying.
pub use magma_arena as arena;

/// Data-parallel kernels (`magma-kernels`).
///
/// [`kernels::DiffusionCooling`] advances the field,
/// [`kernels::DisplayKernel`] shades it. Both run on an
/// [`kernels::ExecutionBackend`].
pub use magma_kernels as kernels;

/// Frame pipeline (`magma-engine`).
///
/// [`engine::FrameScheduler`] for stepping frames by hand,
/// [`engine::RealtimeLoop`] for a paced background thread.
pub use magma_engine as engine;

/// Common imports for typical Magma usage.
///
/// ```rust
/// use magma::prelude::*;
/// ```
///
/// This imports the scheduler and loop, configuration, input events, the
/// collaborator traits and the core value types.
pub mod prelude {
    // Core types
    pub use magma_core::{
        FieldRead, FrameId, FrameImage, PointerSnapshot, Rgb, Rgba, Viewport,
    };

    // Errors
    pub use magma_core::{ConfigError, ResourceError};
    pub use magma_engine::{FrameError, StartupError, SubmitError};

    // Storage
    pub use magma_arena::HeatField;

    // Kernels and backends
    pub use magma_kernels::{
        ColorRamp, ExecutionBackend, LightingModel, NoiseFunction, RampStop, RayonBackend,
        SerialBackend,
    };

    // Engine
    pub use magma_engine::{
        BloomSettings, Compositor, FixedRate, FrameMetrics, FrameReport, FrameScheduler,
        InputEvent, InputSender, MagmaConfig, NullPresenter, Passthrough, Presenter,
        RealtimeLoop, RefreshSignal, ShutdownReport,
    };
}
