//! Core types and traits for the Magma heat-field renderer.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the rest of the workspace: identifiers,
//! the error taxonomy, pointer snapshots, colour and image types, and
//! the [`FieldRead`] trait the kernels sample through.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod color;
pub mod error;
pub mod id;
pub mod image;
pub mod pointer;
pub mod precision;
pub mod traits;

pub use color::{Rgb, Rgba};
pub use error::{ConfigError, ResourceError};
pub use id::{FrameId, Viewport};
pub use image::FrameImage;
pub use pointer::PointerSnapshot;
pub use precision::Precision;
pub use traits::FieldRead;
