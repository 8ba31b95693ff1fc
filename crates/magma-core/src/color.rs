//! Linear RGB and RGBA colour values.

use serde::{Deserialize, Serialize};

/// Rec. 709 luma weights.
const LUMA_R: f32 = 0.2126;
const LUMA_G: f32 = 0.7152;
const LUMA_B: f32 = 0.0722;

/// Linear RGB colour. Components are nominally in `[0,1]` but are not
/// clamped until conversion to 8-bit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rgb {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
}

impl Rgb {
    /// Black.
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);

    /// Construct from components.
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Relative luminance. Linear in the components, so interpolating
    /// between two colours interpolates their luminance.
    pub fn luminance(&self) -> f32 {
        self.r * LUMA_R + self.g * LUMA_G + self.b * LUMA_B
    }

    /// Linear interpolation towards `other`; `t` is not clamped.
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        Rgb::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    /// `true` if every component is finite.
    pub fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }

    /// Attach an alpha channel.
    pub fn with_alpha(self, a: f32) -> Rgba {
        Rgba::new(self.r, self.g, self.b, a)
    }
}

/// Linear RGB colour with coverage.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rgba {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Coverage; 0 means the pixel contributes nothing.
    pub a: f32,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

    /// Construct from components.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// The colour channels without alpha.
    pub fn rgb(&self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }

    /// Luminance of the colour channels.
    pub fn luminance(&self) -> f32 {
        self.rgb().luminance()
    }

    /// Quantise to 8 bits per channel, clamping to `[0,1]` first.
    pub fn to_rgba8(&self) -> [u8; 4] {
        fn q(v: f32) -> u8 {
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}
