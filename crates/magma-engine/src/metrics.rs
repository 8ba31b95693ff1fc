//! Per-frame performance metrics for the renderer.
//!
//! [`FrameMetrics`] captures timing and field statistics for a single
//! frame, for telemetry and profiling.

/// Timing and state metrics collected during a single frame.
///
/// All durations are in microseconds. The scheduler fills these in after
/// every presented frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameMetrics {
    /// Wall-clock time for the entire frame, in microseconds.
    pub total_us: u64,
    /// Time spent draining input and snapshotting the brush, in microseconds.
    pub input_us: u64,
    /// Time spent in the diffusion-cooling kernel, in microseconds.
    pub diffusion_us: u64,
    /// Time spent in the display kernel, in microseconds.
    pub shading_us: u64,
    /// Time spent in the compositor, in microseconds.
    pub composite_us: u64,
    /// Time spent in the presenter, in microseconds.
    pub present_us: u64,
    /// Input events applied at the start of this frame.
    pub events_applied: u32,
    /// Largest heat value after the diffusion step.
    pub max_heat: f32,
    /// Fraction of output pixels with non-zero alpha.
    pub coverage: f32,
    /// Cumulative number of context-loss recoveries.
    pub resets: u64,
}
