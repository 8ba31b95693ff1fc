//! Time-varying 2D noise for flow distortion and crust texture.

use ::noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use magma_core::ConfigError;
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Continuous noise sampled in 2D space plus time.
///
/// Output lies roughly in `[-1, 1]`. Implementations must be
/// deterministic: the same inputs always give the same value, so the
/// display kernel produces identical images on every backend.
pub trait NoiseFunction: Send + Sync {
    /// Sample at `(x, y)` and time `t` (seconds).
    fn sample(&self, x: f32, y: f32, t: f32) -> f32;
}

/// Fractal Brownian motion over Perlin noise.
///
/// Time is treated as a third spatial axis scaled by `time_scale`, so the
/// pattern drifts smoothly instead of jumping between frames.
pub struct FbmNoise {
    fbm: Fbm<Perlin>,
    octaves: usize,
    time_scale: f64,
}

impl FbmNoise {
    /// Upper bound on octaves.
    pub const MAX_OCTAVES: usize = 8;

    /// Create an fBm source with `octaves` layers (1..=8), seeded by `seed`.
    pub fn new(seed: u32, octaves: usize, time_scale: f32) -> Result<Self, ConfigError> {
        if !(1..=Self::MAX_OCTAVES).contains(&octaves) {
            return Err(ConfigError::out_of_range(
                "octaves",
                octaves as f64,
                "within [1, 8]",
            ));
        }
        if !time_scale.is_finite() {
            return Err(ConfigError::out_of_range(
                "time_scale",
                time_scale.into(),
                "finite",
            ));
        }
        let fbm = Fbm::<Perlin>::new(seed).set_octaves(octaves);
        Ok(Self {
            fbm,
            octaves,
            time_scale: f64::from(time_scale),
        })
    }

    /// Number of octaves summed per sample.
    pub fn octaves(&self) -> usize {
        self.octaves
    }
}

impl std::fmt::Debug for FbmNoise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FbmNoise")
            .field("octaves", &self.octaves)
            .field("time_scale", &self.time_scale)
            .finish()
    }
}

impl NoiseFunction for FbmNoise {
    fn sample(&self, x: f32, y: f32, t: f32) -> f32 {
        let v = self
            .fbm
            .get([f64::from(x), f64::from(y), f64::from(t) * self.time_scale]);
        v.clamp(-1.0, 1.0) as f32
    }
}

/// Constant noise. `FlatNoise(0.0)` disables a layer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlatNoise(pub f32);

impl NoiseFunction for FlatNoise {
    fn sample(&self, _x: f32, _y: f32, _t: f32) -> f32 {
        self.0
    }
}

/// Derive independent `(flow, crust)` seeds from one configuration seed.
pub fn derive_seeds(seed: u64) -> (u32, u32) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (rng.next_u32(), rng.next_u32())
}
