//! Surface lighting for the molten look.
//!
//! [`GlossyLighting`] combines Lambert diffuse, a Phong highlight and a
//! Fresnel rim. Highlight and rim are gated by heat so only hot regions
//! look glossy; cooled regions stay matte.

use glam::Vec3;
use magma_core::{ConfigError, Rgb};
use serde::{Deserialize, Serialize};

use crate::grid_helpers::smoothstep;

/// Parameters for [`GlossyLighting`].
///
/// Directions are given as `[x, y, z]` in a frame where `+x` is right,
/// `+y` is up on screen and `+z` points out of the screen towards the
/// viewer. They are normalised on construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LightingParams {
    /// Direction from the surface towards the light.
    pub light_dir: [f32; 3],
    /// Direction from the surface towards the viewer.
    pub view_dir: [f32; 3],
    /// Ambient term applied to the base colour.
    pub ambient: f32,
    /// Weight of the Lambert term.
    pub diffuse: f32,
    /// Phong exponent, `> 0`.
    pub shininess: f32,
    /// Weight of the specular highlight.
    pub specular_strength: f32,
    /// Heat at which highlights reach full strength.
    pub specular_heat: f32,
    /// Tint of highlights and rim.
    pub specular_color: Rgb,
    /// Weight of the Fresnel rim.
    pub fresnel_strength: f32,
    /// Exponent of the Fresnel rim.
    pub fresnel_power: f32,
}

impl Default for LightingParams {
    fn default() -> Self {
        Self {
            light_dir: [-0.5, 0.6, 0.8],
            view_dir: [0.0, 0.0, 1.0],
            ambient: 0.35,
            diffuse: 0.75,
            shininess: 32.0,
            specular_strength: 0.6,
            specular_heat: 1.0,
            specular_color: Rgb::new(1.0, 0.9, 0.7),
            fresnel_strength: 0.25,
            fresnel_power: 3.0,
        }
    }
}

/// Turns a surface normal, base colour and heat into a lit colour.
pub trait LightingModel: Send + Sync {
    /// Lit colour for a unit `normal`. `heat` is the raw field value.
    fn shade(&self, normal: Vec3, base: Rgb, heat: f32) -> Rgb;
}

/// Lambert + Phong + Fresnel, heat-gated.
#[derive(Clone, Debug, PartialEq)]
pub struct GlossyLighting {
    light: Vec3,
    view: Vec3,
    ambient: f32,
    diffuse: f32,
    shininess: f32,
    specular_strength: f32,
    specular_heat: f32,
    specular_color: Rgb,
    fresnel_strength: f32,
    fresnel_power: f32,
}

fn unit(v: [f32; 3], which: &'static str) -> Result<Vec3, ConfigError> {
    let v = Vec3::from_array(v);
    let len = v.length();
    if !len.is_finite() || len == 0.0 {
        return Err(ConfigError::InvalidLightDirection { which });
    }
    Ok(v / len)
}

fn non_negative(parameter: &'static str, v: f32) -> Result<f32, ConfigError> {
    if v >= 0.0 && v.is_finite() {
        Ok(v)
    } else {
        Err(ConfigError::out_of_range(
            parameter,
            v.into(),
            "finite and >= 0",
        ))
    }
}

impl GlossyLighting {
    /// Validate `params` and build the model.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidLightDirection`] for a zero or non-finite
    /// direction; [`ConfigError::OutOfRange`] for non-positive shininess
    /// or any negative weight.
    pub fn new(params: &LightingParams) -> Result<Self, ConfigError> {
        let light = unit(params.light_dir, "light")?;
        let view = unit(params.view_dir, "view")?;
        if !(params.shininess > 0.0) || !params.shininess.is_finite() {
            return Err(ConfigError::out_of_range(
                "shininess",
                params.shininess.into(),
                "finite and > 0",
            ));
        }
        if !params.specular_color.is_finite() {
            return Err(ConfigError::out_of_range(
                "specular_color",
                f64::NAN,
                "finite components",
            ));
        }
        Ok(Self {
            light,
            view,
            ambient: non_negative("ambient", params.ambient)?,
            diffuse: non_negative("diffuse", params.diffuse)?,
            shininess: params.shininess,
            specular_strength: non_negative("specular_strength", params.specular_strength)?,
            specular_heat: non_negative("specular_heat", params.specular_heat)?,
            specular_color: params.specular_color,
            fresnel_strength: non_negative("fresnel_strength", params.fresnel_strength)?,
            fresnel_power: non_negative("fresnel_power", params.fresnel_power)?,
        })
    }

    /// Normalised light direction.
    pub fn light(&self) -> Vec3 {
        self.light
    }

    /// How glossy a surface at `heat` is, in `[0, 1]`.
    pub fn heat_gate(&self, heat: f32) -> f32 {
        smoothstep(0.0, self.specular_heat, heat)
    }
}

impl LightingModel for GlossyLighting {
    fn shade(&self, normal: Vec3, base: Rgb, heat: f32) -> Rgb {
        let n_dot_l = normal.dot(self.light);
        let lambert = n_dot_l.max(0.0);

        // reflect(-l, n)
        let incident = -self.light;
        let reflected = incident - 2.0 * normal.dot(incident) * normal;
        let specular = reflected.dot(self.view).max(0.0).powf(self.shininess);

        let rim = (1.0 - normal.dot(self.view).max(0.0)).powf(self.fresnel_power);

        let gate = self.heat_gate(heat);
        let shine = (specular * self.specular_strength + rim * self.fresnel_strength) * gate;
        let k = self.ambient + self.diffuse * lambert;

        Rgb::new(
            base.r * k + self.specular_color.r * shine,
            base.g * k + self.specular_color.g * shine,
            base.b * k + self.specular_color.b * shine,
        )
    }
}
