//! Arena configuration parameters.

use magma_core::Precision;
use smallvec::{smallvec, SmallVec};

/// Configuration for the heat buffer pair.
///
/// Validated at construction; immutable afterwards.
#[derive(Clone, Debug)]
pub struct ArenaConfig {
    /// Cells along each axis of the square field.
    ///
    /// Must be in `1..=ArenaConfig::MAX_SIDE`.
    pub side: u32,

    /// Storage formats the execution backend can hold buffers in.
    ///
    /// Must contain [`Precision::REQUIRED`].
    pub supported_precisions: SmallVec<[Precision; 4]>,
}

impl ArenaConfig {
    /// Largest supported side (64M cells per buffer).
    pub const MAX_SIDE: u32 = 8192;

    /// Create a config for the given side, assuming a backend that
    /// supports `f32` storage.
    pub fn new(side: u32) -> Self {
        Self {
            side,
            supported_precisions: smallvec![Precision::F32],
        }
    }

    /// Replace the list of backend-supported precisions.
    pub fn with_precisions(mut self, precisions: &[Precision]) -> Self {
        self.supported_precisions = precisions.iter().copied().collect();
        self
    }

    /// Cells in one buffer.
    pub fn cell_count(&self) -> usize {
        self.side as usize * self.side as usize
    }

    /// Bytes held by both buffers together.
    pub fn memory_bytes(&self) -> usize {
        2 * self.cell_count() * Precision::REQUIRED.bytes()
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(256)
    }
}
