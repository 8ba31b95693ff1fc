//! Reusable configuration and field fixtures.
//!
//! - [`scenario_config`]: the canonical 256² molten scenario.
//! - [`quiet_config`]: small field with flow and crust noise switched
//!   off, so images depend only on the heat field.
//! - [`hot_spot`] / [`uniform`]: hand-built fields for kernel tests.

use magma_arena::HeatField;
use magma_core::Viewport;
use magma_engine::MagmaConfig;

/// The default configuration: 256² field, viewport 256x256, pointer
/// parameters radius 0.08 / strength 0.8, viscosity 0.6, decay
/// 0.985 / 0.002.
pub fn scenario_config() -> MagmaConfig {
    MagmaConfig::default()
}

/// A `side`² field rendered to a `width`x`height` viewport with noise
/// disabled.
pub fn quiet_config(side: u32, width: u32, height: u32) -> MagmaConfig {
    let mut config = MagmaConfig {
        field_side: side,
        viewport: Viewport::new(width, height),
        ..MagmaConfig::default()
    };
    config.shading.flow_amplitude = 0.0;
    config.shading.crust_strength = 0.0;
    config
}

/// Zero field with a single hot cell.
pub fn hot_spot(side: u32, x: u32, y: u32, value: f32) -> HeatField {
    let mut field = HeatField::new(side);
    field.set(x, y, value);
    field
}

/// Field with every cell set to `value`.
pub fn uniform(side: u32, value: f32) -> HeatField {
    let mut field = HeatField::new(side);
    field.as_mut_slice().fill(value);
    field
}
