//! Display kernel: heat field to lit, textured RGBA.
//!
//! Runs once per frame after the buffer swap and reads only the new
//! current field. Every pixel is independent:
//!
//! 1. Distort the sample position with flow noise.
//! 2. Sample heat; below the presence threshold the pixel is empty.
//! 3. Estimate a surface normal from central differences of heat.
//! 4. Subtract crust noise from the heat used for colour.
//! 5. Look the reduced heat up in the colour ramp.
//! 6. Light the base colour (highlights gated by the raw heat).
//! 7. Fade alpha in over `edge_softness` above the threshold.

use glam::Vec3;
use magma_core::{ConfigError, FieldRead, FrameImage, ResourceError, Rgba, Viewport};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::ExecutionBackend;
use crate::grid_helpers::smoothstep;
use crate::lighting::{GlossyLighting, LightingModel, LightingParams};
use crate::noise::{derive_seeds, FbmNoise, NoiseFunction};
use crate::ramp::ColorRamp;

/// Offset between the two flow-noise lookups so the x and y
/// displacements are uncorrelated.
const FLOW_AXIS_OFFSET: (f32, f32) = (5.2, 1.3);

/// Numeric parameters of the display kernel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShadingParams {
    /// Heat below which a pixel is empty.
    pub presence_threshold: f32,
    /// Heat range above the threshold over which alpha fades in.
    pub edge_softness: f32,
    /// Gain on heat differences when building normals.
    pub normal_scale: f32,
    /// z component of the unnormalised normal; larger is flatter.
    pub normal_z: f32,
    /// Spatial frequency of the flow noise.
    pub flow_frequency: f32,
    /// Time scale of the flow noise.
    pub flow_speed: f32,
    /// Displacement of sample positions, in normalised units.
    pub flow_amplitude: f32,
    /// Octaves of the flow noise.
    pub flow_octaves: usize,
    /// Spatial frequency of the crust noise.
    pub crust_frequency: f32,
    /// Time scale of the crust noise.
    pub crust_speed: f32,
    /// Heat removed (at most) by the crust before colour lookup.
    pub crust_strength: f32,
    /// Octaves of the crust noise.
    pub crust_octaves: usize,
    /// Lighting parameters.
    pub lighting: LightingParams,
}

impl Default for ShadingParams {
    fn default() -> Self {
        Self {
            presence_threshold: 0.02,
            edge_softness: 0.1,
            normal_scale: 6.0,
            normal_z: 1.0,
            flow_frequency: 3.0,
            flow_speed: 0.3,
            flow_amplitude: 0.01,
            flow_octaves: 3,
            crust_frequency: 6.0,
            crust_speed: 0.05,
            crust_strength: 0.15,
            crust_octaves: 4,
            lighting: LightingParams::default(),
        }
    }
}

/// Range classes for scalar shading parameters.
#[derive(Clone, Copy)]
enum Range {
    Finite,
    NonNegative,
    Positive,
}

impl Range {
    fn admits(self, v: f32) -> bool {
        v.is_finite()
            && match self {
                Range::Finite => true,
                Range::NonNegative => v >= 0.0,
                Range::Positive => v > 0.0,
            }
    }

    fn expected(self) -> &'static str {
        match self {
            Range::Finite => "finite",
            Range::NonNegative => "finite and >= 0",
            Range::Positive => "finite and > 0",
        }
    }
}

impl ShadingParams {
    /// Check every scalar parameter.
    ///
    /// Lighting parameters are validated by [`GlossyLighting::new`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scalars = [
            ("presence_threshold", self.presence_threshold, Range::NonNegative),
            ("edge_softness", self.edge_softness, Range::Positive),
            ("normal_scale", self.normal_scale, Range::NonNegative),
            ("normal_z", self.normal_z, Range::Positive),
            ("flow_frequency", self.flow_frequency, Range::NonNegative),
            ("flow_speed", self.flow_speed, Range::Finite),
            ("flow_amplitude", self.flow_amplitude, Range::NonNegative),
            ("crust_frequency", self.crust_frequency, Range::NonNegative),
            ("crust_speed", self.crust_speed, Range::Finite),
            ("crust_strength", self.crust_strength, Range::NonNegative),
        ];
        for (name, value, range) in scalars {
            if !range.admits(value) {
                return Err(ConfigError::out_of_range(name, value.into(), range.expected()));
            }
        }
        let octaves = [
            ("flow_octaves", self.flow_octaves),
            ("crust_octaves", self.crust_octaves),
        ];
        for (name, n) in octaves {
            if !(1..=FbmNoise::MAX_OCTAVES).contains(&n) {
                return Err(ConfigError::out_of_range(name, n as f64, "within [1, 8]"));
            }
        }
        Ok(())
    }
}

/// The per-pixel shading pipeline.
///
/// Constructed via [`DisplayKernel::builder`]. Noise and lighting
/// default to [`FbmNoise`] and [`GlossyLighting`] and can be replaced
/// with any [`NoiseFunction`] / [`LightingModel`].
pub struct DisplayKernel {
    params: ShadingParams,
    ramp: ColorRamp,
    flow: Box<dyn NoiseFunction>,
    crust: Box<dyn NoiseFunction>,
    lighting: Box<dyn LightingModel>,
}

/// Builder for [`DisplayKernel`].
pub struct DisplayKernelBuilder {
    params: ShadingParams,
    ramp: ColorRamp,
    flow: Option<Box<dyn NoiseFunction>>,
    crust: Option<Box<dyn NoiseFunction>>,
    lighting: Option<Box<dyn LightingModel>>,
    seed: u64,
}

impl DisplayKernel {
    /// Create a builder with default parameters and the molten ramp.
    pub fn builder() -> DisplayKernelBuilder {
        DisplayKernelBuilder {
            params: ShadingParams::default(),
            ramp: ColorRamp::molten(),
            flow: None,
            crust: None,
            lighting: None,
            seed: 0,
        }
    }

    /// The validated parameters.
    pub fn params(&self) -> &ShadingParams {
        &self.params
    }

    /// The colour ramp.
    pub fn ramp(&self) -> &ColorRamp {
        &self.ramp
    }

    /// Flow-distorted sample position for normalised `(u, v)` at time `t`.
    pub fn distort(&self, u: f32, v: f32, t: f32) -> (f32, f32) {
        let p = &self.params;
        let (fu, fv) = (u * p.flow_frequency, v * p.flow_frequency);
        let dx = self.flow.sample(fu, fv, t);
        let dy = self
            .flow
            .sample(fu + FLOW_AXIS_OFFSET.0, fv + FLOW_AXIS_OFFSET.1, t);
        (u + p.flow_amplitude * dx, v + p.flow_amplitude * dy)
    }

    /// Unit surface normal at `(u, v)` from central differences one
    /// `texel` away along each axis.
    ///
    /// The normal uses a y-up frame while `v` grows downwards, so the
    /// sample at `v + ty` is the one below the pixel.
    pub fn normal_at<F: FieldRead + ?Sized>(
        &self,
        field: &F,
        u: f32,
        v: f32,
        texel: (f32, f32),
    ) -> Vec3 {
        let (tx, ty) = texel;
        let left = field.sample_uv(u - tx, v);
        let right = field.sample_uv(u + tx, v);
        let above = field.sample_uv(u, v - ty);
        let below = field.sample_uv(u, v + ty);
        let s = self.params.normal_scale;
        Vec3::new(s * (left - right), s * (below - above), self.params.normal_z).normalize()
    }

    /// Shade pixel `(px, py)` of an image of size `viewport`.
    pub fn shade_pixel<F: FieldRead + ?Sized>(
        &self,
        field: &F,
        px: u32,
        py: u32,
        viewport: Viewport,
        t: f32,
    ) -> Rgba {
        let p = &self.params;
        let (tx, ty) = viewport.texel();
        let u = (px as f32 + 0.5) * tx;
        let v = (py as f32 + 0.5) * ty;
        let (u, v) = self.distort(u, v, t);

        let h = field.sample_uv(u, v);
        if h < p.presence_threshold {
            return Rgba::TRANSPARENT;
        }

        let normal = self.normal_at(field, u, v, (tx, ty));

        let crust_noise = self
            .crust
            .sample(u * p.crust_frequency, v * p.crust_frequency, t);
        let crust = (crust_noise * 0.5 + 0.5) * p.crust_strength;
        let h_color = (h - crust).max(0.0);

        let base = self.ramp.color_at(h_color);
        let lit = self.lighting.shade(normal, base, h);
        let alpha = smoothstep(
            p.presence_threshold,
            p.presence_threshold + p.edge_softness,
            h,
        );
        lit.with_alpha(alpha)
    }

    /// Shade every pixel of `image` from `field` at time `t`.
    pub fn render<F: FieldRead + Sync + ?Sized>(
        &self,
        backend: &dyn ExecutionBackend,
        field: &F,
        t: f32,
        image: &mut FrameImage,
    ) -> Result<(), ResourceError> {
        let viewport = image.viewport();
        if viewport.is_empty() {
            return Ok(());
        }
        backend.fill_rows_rgba(image.pixels_mut(), viewport.width as usize, &|y, row| {
            for (x, px) in row.iter_mut().enumerate() {
                *px = self.shade_pixel(field, x as u32, y as u32, viewport, t);
            }
        })
    }
}

impl DisplayKernelBuilder {
    /// Set the numeric parameters.
    pub fn params(mut self, params: ShadingParams) -> Self {
        self.params = params;
        self
    }

    /// Set the colour ramp.
    pub fn ramp(mut self, ramp: ColorRamp) -> Self {
        self.ramp = ramp;
        self
    }

    /// Replace the flow noise.
    pub fn flow_noise(mut self, noise: impl NoiseFunction + 'static) -> Self {
        self.flow = Some(Box::new(noise));
        self
    }

    /// Replace the crust noise.
    pub fn crust_noise(mut self, noise: impl NoiseFunction + 'static) -> Self {
        self.crust = Some(Box::new(noise));
        self
    }

    /// Replace the lighting model.
    pub fn lighting(mut self, lighting: impl LightingModel + 'static) -> Self {
        self.lighting = Some(Box::new(lighting));
        self
    }

    /// Seed for the default noise sources.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validate parameters and build the kernel.
    pub fn build(self) -> Result<DisplayKernel, ConfigError> {
        self.params.validate()?;
        let (flow_seed, crust_seed) = derive_seeds(self.seed);
        let p = &self.params;

        let flow: Box<dyn NoiseFunction> = match self.flow {
            Some(n) => n,
            None => Box::new(FbmNoise::new(flow_seed, p.flow_octaves, p.flow_speed)?),
        };
        let crust: Box<dyn NoiseFunction> = match self.crust {
            Some(n) => n,
            None => Box::new(FbmNoise::new(crust_seed, p.crust_octaves, p.crust_speed)?),
        };
        let lighting: Box<dyn LightingModel> = match self.lighting {
            Some(l) => l,
            None => Box::new(GlossyLighting::new(&p.lighting)?),
        };
        debug!(seed = self.seed, stops = self.ramp.stops().len(), "display kernel built");

        Ok(DisplayKernel {
            params: self.params,
            ramp: self.ramp,
            flow,
            crust,
            lighting,
        })
    }
}
