//! Double-buffered ping-pong heat storage.
//!
//! [`HeatBuffers`] holds two equally sized [`HeatField`]s that alternate
//! between the "current" (readable source) and "next" (write-only target)
//! roles. The lifecycle per step is:
//!
//! 1. `begin_step()`: split-borrow both buffers as a [`StepBuffers`]
//! 2. The diffusion kernel reads `current` and writes every cell of `next`
//! 3. `swap()`: flip the role flag so `next` becomes readable
//! 4. `current()`: the display kernel samples the new current field

use magma_core::{Precision, ResourceError};

use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::field::HeatField;

/// Split borrow of both buffers for one kernel invocation.
///
/// Created by [`HeatBuffers::begin_step()`]. While it is alive the
/// buffers cannot be swapped, reset, or read through any other path, so
/// nothing else can write to `current` or observe a half-written `next`.
#[must_use]
pub struct StepBuffers<'a> {
    /// Source field for this step (read-only).
    pub current: &'a HeatField,
    /// Target field for this step (every cell is overwritten).
    pub next: &'a mut HeatField,
}

/// Two heat fields with a single role flag.
///
/// # Buffer layout
///
/// ```text
/// buffer_a: HeatField  ←─── current (even generations) / next (odd)
/// buffer_b: HeatField  ←─── next (even generations) / current (odd)
/// ```
#[derive(Debug)]
pub struct HeatBuffers {
    buffer_a: HeatField,
    buffer_b: HeatField,
    /// Which buffer is current (false = A current, true = B current).
    b_is_current: bool,
    /// Number of swaps since construction or the last reallocation.
    generation: u64,
    config: ArenaConfig,
}

impl HeatBuffers {
    /// Allocate both buffers, zero-filled.
    ///
    /// Returns `Err` if the side is out of range, or
    /// [`ResourceError::PrecisionUnavailable`] (wrapped) if the backend
    /// cannot store `f32` buffers.
    pub fn new(config: ArenaConfig) -> Result<Self, ArenaError> {
        Self::check(&config)?;
        Ok(Self {
            buffer_a: HeatField::new(config.side),
            buffer_b: HeatField::new(config.side),
            b_is_current: false,
            generation: 0,
            config,
        })
    }

    fn check(config: &ArenaConfig) -> Result<(), ArenaError> {
        if config.side == 0 || config.side > ArenaConfig::MAX_SIDE {
            return Err(ArenaError::InvalidSide { side: config.side });
        }
        if !config.supported_precisions.contains(&Precision::REQUIRED) {
            return Err(ResourceError::PrecisionUnavailable {
                required: Precision::REQUIRED,
                supported: config.supported_precisions.to_vec(),
            }
            .into());
        }
        Ok(())
    }

    /// The readable-as-source field.
    pub fn current(&self) -> &HeatField {
        if self.b_is_current {
            &self.buffer_b
        } else {
            &self.buffer_a
        }
    }

    /// The write target for the next step.
    pub fn next_mut(&mut self) -> &mut HeatField {
        if self.b_is_current {
            &mut self.buffer_a
        } else {
            &mut self.buffer_b
        }
    }

    /// Mutable access to the current field, for seeding initial state
    /// outside a step.
    pub fn current_mut(&mut self) -> &mut HeatField {
        if self.b_is_current {
            &mut self.buffer_b
        } else {
            &mut self.buffer_a
        }
    }

    /// Borrow both buffers for one kernel invocation.
    pub fn begin_step(&mut self) -> StepBuffers<'_> {
        if self.b_is_current {
            StepBuffers {
                current: &self.buffer_b,
                next: &mut self.buffer_a,
            }
        } else {
            StepBuffers {
                current: &self.buffer_a,
                next: &mut self.buffer_b,
            }
        }
    }

    /// Flip the current/next roles. O(1); no data moves.
    pub fn swap(&mut self) {
        self.b_is_current = !self.b_is_current;
        self.generation += 1;
    }

    /// Zero both buffers in place.
    pub fn reset(&mut self) {
        self.buffer_a.zero();
        self.buffer_b.zero();
    }

    /// Replace both buffers with fresh zero-filled ones.
    ///
    /// Used after context loss. `side` may differ from the current side.
    pub fn reallocate(&mut self, side: u32) -> Result<(), ArenaError> {
        let config = ArenaConfig {
            side,
            supported_precisions: self.config.supported_precisions.clone(),
        };
        Self::check(&config)?;
        self.buffer_a = HeatField::new(side);
        self.buffer_b = HeatField::new(side);
        self.b_is_current = false;
        self.generation = 0;
        self.config = config;
        Ok(())
    }

    /// Number of swaps since construction or the last reallocation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Cells along each axis.
    pub fn side(&self) -> u32 {
        self.config.side
    }

    /// Bytes held by both buffers.
    pub fn memory_bytes(&self) -> usize {
        self.config.memory_bytes()
    }
}
