//! Per-step pointer snapshot handed to the diffusion kernel.

/// Immutable copy of the brush state, taken once per frame.
///
/// Coordinates are normalised to `[0,1]²` with `v = 0` on the top row of
/// the field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSnapshot {
    /// Horizontal position.
    pub u: f32,
    /// Vertical position.
    pub v: f32,
    /// Whether the brush injects heat this step.
    pub drawing: bool,
}

impl PointerSnapshot {
    /// A snapshot at `(u, v)`.
    pub fn new(u: f32, v: f32, drawing: bool) -> Self {
        Self { u, v, drawing }
    }

    /// Centred pointer that is not drawing.
    pub fn idle() -> Self {
        Self::new(0.5, 0.5, false)
    }
}

impl Default for PointerSnapshot {
    fn default() -> Self {
        Self::idle()
    }
}
