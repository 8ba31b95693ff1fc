//! Strongly-typed identifiers and the output [`Viewport`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonically increasing frame counter.
///
/// Incremented each time the scheduler completes (or abandons) a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub u64);

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for FrameId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Output surface size in pixels.
///
/// Supplied by the window collaborator at startup and on every resize.
/// The field resolution is independent of the viewport; the viewport
/// only drives the brush aspect correction and the display kernel's
/// output size and neighbour step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Viewport {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Viewport {
    /// Create a viewport of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `true` if either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width divided by height. Returns 1.0 for an empty viewport.
    pub fn aspect(&self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Size of one output pixel in normalised coordinates.
    pub fn texel(&self) -> (f32, f32) {
        (
            1.0 / self.width.max(1) as f32,
            1.0 / self.height.max(1) as f32,
        )
    }

    /// Number of pixels covered by the viewport.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Map a pixel position to `[0,1]²`, clamping positions outside the
    /// surface onto its border.
    pub fn normalize(&self, px: f32, py: f32) -> (f32, f32) {
        let w = self.width.max(1) as f32;
        let h = self.height.max(1) as f32;
        ((px / w).clamp(0.0, 1.0), (py / h).clamp(0.0, 1.0))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(256, 256)
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
