//! Row-major RGBA frame buffer produced by the display kernel.

use crate::color::Rgba;
use crate::id::Viewport;

/// One rendered frame.
///
/// Allocated once per viewport size and reused every frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameImage {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl FrameImage {
    /// A transparent image of the given viewport size.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            width: viewport.width,
            height: viewport.height,
            pixels: vec![Rgba::TRANSPARENT; viewport.pixel_count()],
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The viewport this image covers.
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    /// Pixel at `(x, y)`, or `None` outside the image.
    pub fn get(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// All pixels, row-major.
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// All pixels, row-major, mutably.
    pub fn pixels_mut(&mut self) -> &mut [Rgba] {
        &mut self.pixels
    }

    /// Resize to a new viewport. Contents become transparent.
    /// A no-op if the size is unchanged.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport.width == self.width && viewport.height == self.height {
            return;
        }
        self.width = viewport.width;
        self.height = viewport.height;
        self.pixels.clear();
        self.pixels.resize(viewport.pixel_count(), Rgba::TRANSPARENT);
    }

    /// Mean alpha over all pixels, in `[0, 1]`. Soft edges count in
    /// proportion to their alpha.
    pub fn coverage(&self) -> f32 {
        if self.pixels.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .pixels
            .iter()
            .map(|p| f64::from(p.a.clamp(0.0, 1.0)))
            .sum();
        (total / self.pixels.len() as f64) as f32
    }

    /// Quantised 8-bit RGBA bytes, row-major, for handing to image or
    /// window libraries.
    pub fn to_rgba8_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for p in &self.pixels {
            out.extend_from_slice(&p.to_rgba8());
        }
        out
    }
}
