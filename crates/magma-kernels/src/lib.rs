//! Diffusion-cooling and shading kernels for Magma.
//!
//! Two data-parallel kernels run back to back each frame:
//!
//! 1. [`DiffusionCooling`]: reads the current heat field and the pointer
//!    snapshot, writes every cell of the next field.
//! 2. [`DisplayKernel`]: reads the (swapped) current field and writes
//!    every pixel of the output image.
//!
//! Both express their work as a pure per-row function handed to an
//! [`ExecutionBackend`]; the serial and rayon backends run the identical
//! rule, so output does not depend on the backend chosen. Noise and
//! lighting are pluggable through [`NoiseFunction`] and
//! [`LightingModel`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod backend;
pub mod diffusion;
pub mod grid_helpers;
pub mod lighting;
pub mod noise;
pub mod ramp;
pub mod shading;

pub use backend::{ExecutionBackend, RayonBackend, SerialBackend};
pub use diffusion::{DiffusionCooling, DiffusionCoolingBuilder};
pub use lighting::{GlossyLighting, LightingModel, LightingParams};
pub use noise::{FbmNoise, FlatNoise, NoiseFunction};
pub use ramp::{ColorRamp, RampStop};
pub use shading::{DisplayKernel, DisplayKernelBuilder, ShadingParams};
