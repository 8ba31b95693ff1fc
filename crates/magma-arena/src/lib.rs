//! Double-buffered heat field storage for Magma.
//!
//! # Architecture
//!
//! ```text
//! HeatBuffers (orchestrator)
//! ├── HeatField × 2 (alternating current/next roles)
//! │   └── Vec<f32>, side × side, row-major
//! └── role flag + generation counter
//! ```
//!
//! Buffers are allocated once at startup and reused every frame. A swap
//! flips the role flag; it never copies or reallocates. Both buffers are
//! zeroed on resize or context loss.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod field;
pub mod pingpong;

pub use config::ArenaConfig;
pub use error::ArenaError;
pub use field::HeatField;
pub use pingpong::{HeatBuffers, StepBuffers};
