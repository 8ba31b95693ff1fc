//! Diffusion-cooling kernel with brush injection.
//!
//! The field's only heat source is the brush; everything else spreads
//! and cools. Constructed via the builder pattern:
//! [`DiffusionCooling::builder`].

use magma_arena::StepBuffers;
use magma_core::{ConfigError, FieldRead, PointerSnapshot, ResourceError};

use crate::backend::ExecutionBackend;
use crate::grid_helpers::{neighbours_clamped, smoothstep};

/// Per-cell heat update: spread, cool, inject.
///
/// Each step computes, for every cell with value `center` and clamped
/// 4-neighbour average `avg`:
///
/// ```text
/// diff = center + viscosity * (avg - center)
/// diff = diff * decay_factor - decay_constant
/// if drawing and dist(cell, pointer) < brush_radius:
///     diff += injection_strength * smoothstep(brush_radius, 0, dist)
/// next = max(diff, 0)
/// ```
///
/// The multiplicative decay shapes the long tail; the subtractive decay
/// drives every cell to exactly zero in finitely many steps. Values are
/// unbounded above.
///
/// Distances are measured between cell centres and the pointer in
/// normalised coordinates, with the x-delta scaled by the viewport
/// aspect ratio so the brush stays circular on screen.
///
/// # Construction
///
/// ```
/// use magma_kernels::DiffusionCooling;
///
/// let kernel = DiffusionCooling::builder()
///     .viscosity(0.6)
///     .decay_factor(0.985)
///     .decay_constant(0.002)
///     .build()
///     .unwrap();
/// assert_eq!(kernel.viscosity(), 0.6);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DiffusionCooling {
    viscosity: f32,
    decay_factor: f32,
    decay_constant: f32,
    brush_radius: f32,
    injection_strength: f32,
}

/// Builder for [`DiffusionCooling`].
///
/// Defaults are the canonical molten parameter set: viscosity 0.6,
/// decay factor 0.985, decay constant 0.002, brush radius 0.08,
/// injection strength 0.8.
#[derive(Clone, Debug)]
pub struct DiffusionCoolingBuilder {
    viscosity: f32,
    decay_factor: f32,
    decay_constant: f32,
    brush_radius: f32,
    injection_strength: f32,
}

impl DiffusionCooling {
    /// Create a new builder with the default parameter set.
    pub fn builder() -> DiffusionCoolingBuilder {
        DiffusionCoolingBuilder {
            viscosity: 0.6,
            decay_factor: 0.985,
            decay_constant: 0.002,
            brush_radius: 0.08,
            injection_strength: 0.8,
        }
    }

    /// Blend weight towards the neighbourhood average.
    pub fn viscosity(&self) -> f32 {
        self.viscosity
    }

    /// Multiplicative cooling per step.
    pub fn decay_factor(&self) -> f32 {
        self.decay_factor
    }

    /// Subtractive cooling per step.
    pub fn decay_constant(&self) -> f32 {
        self.decay_constant
    }

    /// Brush radius in normalised units.
    pub fn brush_radius(&self) -> f32 {
        self.brush_radius
    }

    /// Heat added per step at the brush centre.
    pub fn injection_strength(&self) -> f32 {
        self.injection_strength
    }

    /// Aspect-corrected distance from the centre of cell `(x, y)` to the
    /// pointer.
    pub fn brush_distance(
        &self,
        side: u32,
        x: u32,
        y: u32,
        pointer: &PointerSnapshot,
        aspect: f32,
    ) -> f32 {
        let inv = 1.0 / side as f32;
        let u = (x as f32 + 0.5) * inv;
        let v = (y as f32 + 0.5) * inv;
        let dx = (u - pointer.u) * aspect;
        let dy = v - pointer.v;
        (dx * dx + dy * dy).sqrt()
    }

    /// Heat the brush adds to cell `(x, y)` this step.
    pub fn injection_at(
        &self,
        side: u32,
        x: u32,
        y: u32,
        pointer: &PointerSnapshot,
        aspect: f32,
    ) -> f32 {
        if !pointer.drawing {
            return 0.0;
        }
        let d = self.brush_distance(side, x, y, pointer, aspect);
        if d < self.brush_radius {
            self.injection_strength * smoothstep(self.brush_radius, 0.0, d)
        } else {
            0.0
        }
    }

    #[inline]
    fn update(&self, center: f32, avg: f32, injection: f32) -> f32 {
        let mut diff = center + self.viscosity * (avg - center);
        diff = diff * self.decay_factor - self.decay_constant;
        diff += injection;
        diff.max(0.0)
    }

    /// The pure per-cell rule: the value cell `(x, y)` takes in the next
    /// field.
    pub fn cell<F: FieldRead + ?Sized>(
        &self,
        field: &F,
        x: u32,
        y: u32,
        pointer: &PointerSnapshot,
        aspect: f32,
    ) -> f32 {
        let (xi, yi) = (i64::from(x), i64::from(y));
        let center = field.get(x, y);
        let avg = 0.25
            * (field.sample_clamped(xi - 1, yi)
                + field.sample_clamped(xi + 1, yi)
                + field.sample_clamped(xi, yi - 1)
                + field.sample_clamped(xi, yi + 1));
        let injection = self.injection_at(field.side(), x, y, pointer, aspect);
        self.update(center, avg, injection)
    }

    /// Fill one row of the next field from the current field.
    fn fill_row(
        &self,
        prev: &[f32],
        side: u32,
        y: u32,
        pointer: &PointerSnapshot,
        aspect: f32,
        out: &mut [f32],
    ) {
        let row = y as usize * side as usize;
        for (x, slot) in out.iter_mut().enumerate() {
            let x = x as u32;
            let [w, e, n, s] = neighbours_clamped(x, y, side);
            let center = prev[row + x as usize];
            let avg = 0.25 * (prev[w] + prev[e] + prev[n] + prev[s]);
            let injection = self.injection_at(side, x, y, pointer, aspect);
            *slot = self.update(center, avg, injection);
        }
    }

    /// Run one step: read `current`, overwrite every cell of `next`.
    ///
    /// `aspect` is the viewport width over height. The pointer snapshot
    /// is read-only for the whole step.
    pub fn step(
        &self,
        backend: &dyn ExecutionBackend,
        buffers: StepBuffers<'_>,
        pointer: &PointerSnapshot,
        aspect: f32,
    ) -> Result<(), ResourceError> {
        let StepBuffers { current, next } = buffers;
        let side = current.side();
        debug_assert_eq!(side, next.side(), "ping-pong buffers differ in size");
        let prev = current.as_slice();

        backend.fill_rows_f32(next.as_mut_slice(), side as usize, &|y, out| {
            self.fill_row(prev, side, y as u32, pointer, aspect, out);
        })
    }
}

impl DiffusionCoolingBuilder {
    /// Set the viscosity (mix factor), in `[0, 1]`. Lower is thicker.
    pub fn viscosity(mut self, v: f32) -> Self {
        self.viscosity = v;
        self
    }

    /// Set the multiplicative decay, in `(0, 1]`.
    pub fn decay_factor(mut self, f: f32) -> Self {
        self.decay_factor = f;
        self
    }

    /// Set the subtractive decay, `>= 0`.
    pub fn decay_constant(mut self, c: f32) -> Self {
        self.decay_constant = c;
        self
    }

    /// Set the brush radius in normalised units, `> 0`.
    pub fn brush_radius(mut self, r: f32) -> Self {
        self.brush_radius = r;
        self
    }

    /// Set the injection strength, `>= 0`.
    pub fn injection_strength(mut self, s: f32) -> Self {
        self.injection_strength = s;
        self
    }

    /// Build the kernel, validating all parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutOfRange`] if:
    /// - `viscosity` is outside `[0, 1]`
    /// - `decay_factor` is `<= 0` or `> 1`
    /// - `decay_constant` is negative
    /// - `brush_radius` is `<= 0`
    /// - `injection_strength` is negative
    /// - any value is NaN or infinite
    pub fn build(self) -> Result<DiffusionCooling, ConfigError> {
        if !(0.0..=1.0).contains(&self.viscosity) {
            return Err(ConfigError::out_of_range(
                "viscosity",
                self.viscosity.into(),
                "within [0, 1]",
            ));
        }
        if !(self.decay_factor > 0.0 && self.decay_factor <= 1.0) {
            return Err(ConfigError::out_of_range(
                "decay_factor",
                self.decay_factor.into(),
                "within (0, 1]",
            ));
        }
        if !(self.decay_constant >= 0.0) || !self.decay_constant.is_finite() {
            return Err(ConfigError::out_of_range(
                "decay_constant",
                self.decay_constant.into(),
                "finite and >= 0",
            ));
        }
        if !(self.brush_radius > 0.0) || !self.brush_radius.is_finite() {
            return Err(ConfigError::out_of_range(
                "brush_radius",
                self.brush_radius.into(),
                "finite and > 0",
            ));
        }
        if !(self.injection_strength >= 0.0) || !self.injection_strength.is_finite() {
            return Err(ConfigError::out_of_range(
                "injection_strength",
                self.injection_strength.into(),
                "finite and >= 0",
            ));
        }

        Ok(DiffusionCooling {
            viscosity: self.viscosity,
            decay_factor: self.decay_factor,
            decay_constant: self.decay_constant,
            brush_radius: self.brush_radius,
            injection_strength: self.injection_strength,
        })
    }
}
