//! Renderer configuration, validation, and kernel construction.
//!
//! [`MagmaConfig`] is the single configuration surface. Every field has
//! a default (the canonical molten parameter set), so a JSON settings
//! file only needs the keys it changes. [`validate()`](MagmaConfig::validate)
//! checks every invariant once at startup; nothing is re-checked while
//! frames are running.

use magma_arena::ArenaConfig;
use magma_core::{ConfigError, Viewport};
use magma_kernels::{ColorRamp, DiffusionCooling, DisplayKernel, RampStop, ShadingParams};
use serde::{Deserialize, Serialize};
use tracing::warn;

// ── SimulationParams ───────────────────────────────────────────────

/// Parameters of the diffusion-cooling kernel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationParams {
    /// Blend weight towards the neighbourhood average, `[0, 1]`. Default: 0.6.
    pub viscosity: f32,
    /// Multiplicative cooling per step, `(0, 1]`. Default: 0.985.
    pub decay_factor: f32,
    /// Subtractive cooling per step, `>= 0`. Default: 0.002.
    pub decay_constant: f32,
    /// Brush radius in normalised units, `> 0`. Default: 0.08.
    pub brush_radius: f32,
    /// Heat added per step at the brush centre, `>= 0`. Default: 0.8.
    pub injection_strength: f32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            viscosity: 0.6,
            decay_factor: 0.985,
            decay_constant: 0.002,
            brush_radius: 0.08,
            injection_strength: 0.8,
        }
    }
}

// ── BloomSettings ──────────────────────────────────────────────────

/// Settings handed to the bloom [`Compositor`](crate::compositor::Compositor).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BloomSettings {
    /// Strength of the glow, `>= 0`. Default: 1.2.
    pub intensity: f32,
    /// Luminance above which pixels bloom, `[0, 1]`. Default: 0.6.
    pub luminance_threshold: f32,
    /// Spread of the glow, `[0, 1]`. Default: 0.4.
    pub radius: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            intensity: 1.2,
            luminance_threshold: 0.6,
            radius: 0.4,
        }
    }
}

impl BloomSettings {
    /// Check all three settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.intensity >= 0.0) || !self.intensity.is_finite() {
            return Err(ConfigError::out_of_range(
                "bloom.intensity",
                self.intensity.into(),
                "finite and >= 0",
            ));
        }
        if !(0.0..=1.0).contains(&self.luminance_threshold) {
            return Err(ConfigError::out_of_range(
                "bloom.luminance_threshold",
                self.luminance_threshold.into(),
                "within [0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&self.radius) {
            return Err(ConfigError::out_of_range(
                "bloom.radius",
                self.radius.into(),
                "within [0, 1]",
            ));
        }
        Ok(())
    }
}

// ── MagmaConfig ────────────────────────────────────────────────────

/// Complete renderer configuration.
///
/// # Example
///
/// ```
/// use magma_engine::config::MagmaConfig;
///
/// let config = MagmaConfig::from_json_str(
///     r#"{ "field_side": 128, "simulation": { "viscosity": 0.4 } }"#,
/// )
/// .unwrap();
/// assert_eq!(config.field_side, 128);
/// assert_eq!(config.simulation.viscosity, 0.4);
/// assert_eq!(config.simulation.decay_factor, 0.985);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MagmaConfig {
    /// Cells along each side of the square heat field. Default: 256.
    pub field_side: u32,
    /// Initial output size in pixels. Default: 256x256.
    pub viewport: Viewport,
    /// Frame rate; simulated time advances `1 / refresh_hz` per frame.
    /// Default: 60.
    pub refresh_hz: f64,
    /// Seed for the flow and crust noise. Default: 0.
    pub seed: u64,
    /// Whether the brush starts pressed. Default: false.
    pub initial_drawing: bool,
    /// Capacity of the bounded input channel. Default: 256.
    pub input_queue_capacity: usize,
    /// Diffusion-cooling parameters.
    pub simulation: SimulationParams,
    /// Display kernel parameters.
    pub shading: ShadingParams,
    /// Colour ramp stops. Default: the molten table.
    pub ramp: Vec<RampStop>,
    /// Bloom compositor settings.
    pub bloom: BloomSettings,
}

impl Default for MagmaConfig {
    fn default() -> Self {
        Self {
            field_side: 256,
            viewport: Viewport::default(),
            refresh_hz: 60.0,
            seed: 0,
            initial_drawing: false,
            input_queue_capacity: 256,
            simulation: SimulationParams::default(),
            shading: ShadingParams::default(),
            ramp: ColorRamp::MOLTEN.to_vec(),
            bloom: BloomSettings::default(),
        }
    }
}

impl MagmaConfig {
    /// Parse a JSON document and validate the result.
    ///
    /// Missing keys take their defaults; unknown keys are rejected.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialise every setting, defaults included, as pretty-printed JSON.
    ///
    /// The configuration is validated first: JSON has no encoding for
    /// non-finite numbers, so an invalid value would not load back.
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        self.validate()?;
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            reason: e.to_string(),
        })
    }

    /// Check every invariant, returning the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let result = self.check();
        if let Err(e) = &result {
            warn!(error = %e, "configuration rejected");
        }
        result
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.field_side == 0 || self.field_side > ArenaConfig::MAX_SIDE {
            return Err(ConfigError::InvalidResolution {
                side: self.field_side,
            });
        }
        if self.viewport.is_empty() {
            return Err(ConfigError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        if !self.refresh_hz.is_finite() || self.refresh_hz <= 0.0 {
            return Err(ConfigError::out_of_range(
                "refresh_hz",
                self.refresh_hz,
                "finite and > 0",
            ));
        }
        if self.input_queue_capacity == 0 {
            return Err(ConfigError::out_of_range(
                "input_queue_capacity",
                0.0,
                ">= 1",
            ));
        }
        self.build_diffusion()?;
        self.build_ramp()?;
        self.build_display()?;
        self.bloom.validate()?;
        Ok(())
    }

    /// Build the diffusion-cooling kernel from [`simulation`](Self::simulation).
    pub fn build_diffusion(&self) -> Result<DiffusionCooling, ConfigError> {
        let s = &self.simulation;
        DiffusionCooling::builder()
            .viscosity(s.viscosity)
            .decay_factor(s.decay_factor)
            .decay_constant(s.decay_constant)
            .brush_radius(s.brush_radius)
            .injection_strength(s.injection_strength)
            .build()
    }

    /// Build the colour ramp from [`ramp`](Self::ramp).
    pub fn build_ramp(&self) -> Result<ColorRamp, ConfigError> {
        ColorRamp::new(&self.ramp)
    }

    /// Build the display kernel with the default noise and lighting.
    pub fn build_display(&self) -> Result<DisplayKernel, ConfigError> {
        DisplayKernel::builder()
            .params(self.shading.clone())
            .ramp(self.build_ramp()?)
            .seed(self.seed)
            .build()
    }

    /// Seconds of simulated time per frame.
    pub fn frame_dt(&self) -> f64 {
        1.0 / self.refresh_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use magma_core::Rgb;

    #[test]
    fn defaults_are_valid() {
        MagmaConfig::default().validate().unwrap();
    }

    #[test]
    fn defaults_match_canonical_scenario() {
        let c = MagmaConfig::default();
        assert_eq!(c.field_side, 256);
        assert_eq!(c.simulation.viscosity, 0.6);
        assert_eq!(c.simulation.decay_factor, 0.985);
        assert_eq!(c.simulation.decay_constant, 0.002);
        assert_eq!(c.simulation.brush_radius, 0.08);
        assert_eq!(c.simulation.injection_strength, 0.8);
        assert!((c.frame_dt() - 1.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn empty_object_gives_defaults() {
        assert_eq!(MagmaConfig::from_json_str("{}").unwrap(), MagmaConfig::default());
    }

    #[test]
    fn explicit_default_document_parses_to_defaults() {
        let text = r#"{
            "field_side": 256,
            "refresh_hz": 60.0,
            "seed": 0,
            "initial_drawing": false,
            "input_queue_capacity": 256,
            "viewport": { "width": 256, "height": 256 },
            "simulation": {
                "viscosity": 0.6,
                "decay_factor": 0.985,
                "decay_constant": 0.002,
                "brush_radius": 0.08,
                "injection_strength": 0.8
            },
            "bloom": {
                "intensity": 1.2,
                "luminance_threshold": 0.6,
                "radius": 0.4
            }
        }"#;
        assert_eq!(MagmaConfig::from_json_str(text).unwrap(), MagmaConfig::default());
    }

    #[test]
    fn written_settings_load_back() {
        let mut c = MagmaConfig::default();
        c.field_side = 96;
        c.seed = 12;
        c.shading.lighting.shininess = 16.0;
        let text = c.to_json_pretty().unwrap();
        assert!(text.contains("\"field_side\": 96"));
        assert_eq!(MagmaConfig::from_json_str(&text).unwrap(), c);
    }

    #[test]
    fn invalid_settings_are_not_written() {
        let mut c = MagmaConfig::default();
        c.simulation.viscosity = f32::NAN;
        let err = c.to_json_pretty().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                parameter: "viscosity",
                ..
            }
        ));
    }

    #[test]
    fn unknown_nested_keys_are_parse_errors() {
        for text in [
            r#"{ "shading": { "flow_amplitud": 0.0 } }"#,
            r#"{ "shading": { "lighting": { "shinyness": 8.0 } } }"#,
            r#"{ "ramp": [ { "threshold": 0.0, "colour": { "r": 0.0, "g": 0.0, "b": 0.0 } } ] }"#,
            r#"{ "viewport": { "width": 8, "height": 8, "depth": 1 } }"#,
        ] {
            let err = MagmaConfig::from_json_str(text).unwrap_err();
            assert!(matches!(err, ConfigError::Parse { .. }), "{text} gave {err:?}");
        }
    }

    #[test]
    fn nested_shading_keys_parse() {
        let text = r#"{
            "shading": {
                "flow_amplitude": 0.0,
                "lighting": { "shininess": 8.0 }
            }
        }"#;
        let c = MagmaConfig::from_json_str(text).unwrap();
        assert_eq!(c.shading.flow_amplitude, 0.0);
        assert_eq!(c.shading.lighting.shininess, 8.0);
        assert_eq!(c.shading.presence_threshold, 0.02);
    }

    #[test]
    fn custom_ramp_parses() {
        let text = r#"{
            "ramp": [
                { "threshold": 0.0, "color": { "r": 0.0, "g": 0.0, "b": 0.0 } },
                { "threshold": 1.0, "color": { "r": 1.0, "g": 1.0, "b": 1.0 } }
            ]
        }"#;
        let c = MagmaConfig::from_json_str(text).unwrap();
        assert_eq!(c.ramp.len(), 2);
        assert_eq!(c.ramp[1].color, Rgb::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = MagmaConfig::from_json_str(r#"{ "field_side": ["#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn unknown_key_is_a_parse_error() {
        let err = MagmaConfig::from_json_str(r#"{ "viscosity": 0.5 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn zero_resolution_rejected() {
        let c = MagmaConfig {
            field_side: 0,
            ..MagmaConfig::default()
        };
        assert_eq!(c.validate().unwrap_err(), ConfigError::InvalidResolution { side: 0 });
    }

    #[test]
    fn empty_viewport_rejected() {
        let c = MagmaConfig {
            viewport: Viewport::new(0, 100),
            ..MagmaConfig::default()
        };
        assert_eq!(
            c.validate().unwrap_err(),
            ConfigError::InvalidViewport {
                width: 0,
                height: 100
            }
        );
    }

    #[test]
    fn viscosity_above_one_rejected_from_json() {
        let err =
            MagmaConfig::from_json_str(r#"{ "simulation": { "viscosity": 1.5 } }"#).unwrap_err();
        assert!(err.to_string().contains("viscosity"));
    }

    #[test]
    fn zero_decay_factor_rejected() {
        let mut c = MagmaConfig::default();
        c.simulation.decay_factor = 0.0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn non_increasing_ramp_rejected() {
        let mut c = MagmaConfig::default();
        c.ramp.swap(1, 2);
        assert!(matches!(
            c.validate().unwrap_err(),
            ConfigError::RampNotIncreasing { index: 2, .. }
        ));
    }

    #[test]
    fn empty_ramp_rejected() {
        let c = MagmaConfig {
            ramp: Vec::new(),
            ..MagmaConfig::default()
        };
        assert_eq!(c.validate().unwrap_err(), ConfigError::EmptyRamp);
    }

    #[test]
    fn zero_light_direction_rejected() {
        let mut c = MagmaConfig::default();
        c.shading.lighting.light_dir = [0.0, 0.0, 0.0];
        assert!(matches!(
            c.validate().unwrap_err(),
            ConfigError::InvalidLightDirection { .. }
        ));
    }

    #[test]
    fn bad_refresh_rate_rejected() {
        for hz in [0.0, -30.0, f64::NAN, f64::INFINITY] {
            let c = MagmaConfig {
                refresh_hz: hz,
                ..MagmaConfig::default()
            };
            assert!(c.validate().is_err(), "refresh_hz = {hz} accepted");
        }
    }

    #[test]
    fn bad_bloom_rejected() {
        let mut c = MagmaConfig::default();
        c.bloom.radius = 2.0;
        assert!(c.validate().unwrap_err().to_string().contains("bloom.radius"));
    }
}
