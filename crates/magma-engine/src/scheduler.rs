//! The per-frame pipeline.
//!
//! [`FrameScheduler`] owns the heat buffers, both kernels, the brush and
//! the injected collaborators, and runs one frame per
//! [`run_frame()`](FrameScheduler::run_frame) in strict order:
//!
//! ```text
//! (a) drain input channel, snapshot brush
//! (b) diffusion-cooling: current -> next
//! (c) swap
//! (d) display kernel: current -> image
//! (e) compositor
//! (f) presenter
//! ```
//!
//! Every backend call returns only after all rows are written, so each
//! phase sees the complete output of the one before it.

use std::error::Error;
use std::fmt;
use std::time::Instant;

use magma_arena::{ArenaConfig, ArenaError, HeatBuffers, HeatField};
use magma_core::{ConfigError, FrameId, FrameImage, PointerSnapshot, ResourceError, Viewport};
use magma_kernels::{DiffusionCooling, DisplayKernel, ExecutionBackend, SerialBackend};
use tracing::{debug, error, info, trace, warn};

use crate::brush::Brush;
use crate::compositor::{Compositor, NullPresenter, Passthrough, Presenter};
use crate::config::MagmaConfig;
use crate::input::{input_channel, InputEvent, InputReceiver, InputSender};
use crate::metrics::FrameMetrics;

// ── Error types ──────────────────────────────────────────────────

/// Errors that prevent a scheduler from being built.
#[derive(Debug, PartialEq)]
pub enum StartupError {
    /// The configuration failed validation.
    Config(ConfigError),
    /// The backend cannot host the field buffers.
    Resource(ResourceError),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid configuration: {e}"),
            Self::Resource(e) => write!(f, "backend unusable: {e}"),
        }
    }
}

impl Error for StartupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Resource(e) => Some(e),
        }
    }
}

impl From<ConfigError> for StartupError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ResourceError> for StartupError {
    fn from(e: ResourceError) -> Self {
        Self::Resource(e)
    }
}

impl From<ArenaError> for StartupError {
    fn from(e: ArenaError) -> Self {
        match e {
            ArenaError::InvalidSide { side } => Self::Config(ConfigError::InvalidResolution { side }),
            ArenaError::Resource(r) => Self::Resource(r),
        }
    }
}

/// A frame that was not presented.
#[derive(Debug, PartialEq)]
pub enum FrameError {
    /// The context was lost. Buffers have been reallocated and zeroed;
    /// the next call to `run_frame` resumes normally.
    ResourceLost(ResourceError),
    /// A resource failure the scheduler cannot recover from.
    Fatal(ResourceError),
}

impl FrameError {
    /// The underlying resource error.
    pub fn resource(&self) -> &ResourceError {
        match self {
            Self::ResourceLost(e) | Self::Fatal(e) => e,
        }
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResourceLost(e) => write!(f, "frame abandoned, buffers reset: {e}"),
            Self::Fatal(e) => write!(f, "unrecoverable: {e}"),
        }
    }
}

impl Error for FrameError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.resource())
    }
}

// ── FrameReport ──────────────────────────────────────────────────

/// Outcome of one presented frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    /// Id the frame was presented with.
    pub frame: FrameId,
    /// Timings and statistics for this frame.
    pub metrics: FrameMetrics,
}

// ── FrameScheduler ───────────────────────────────────────────────

/// Single-threaded owner of all renderer state.
///
/// Collaborators are injected at construction; the scheduler never
/// creates windows or contexts itself. Use [`input()`](Self::input) to
/// obtain a sender for pointer, resize and context-loss events.
pub struct FrameScheduler {
    config: MagmaConfig,
    backend: Box<dyn ExecutionBackend>,
    compositor: Box<dyn Compositor>,
    presenter: Box<dyn Presenter>,
    buffers: HeatBuffers,
    diffusion: DiffusionCooling,
    display: DisplayKernel,
    brush: Brush,
    viewport: Viewport,
    image: FrameImage,
    input_tx: InputSender,
    input_rx: InputReceiver,
    frame: FrameId,
    time: f64,
    dt: f64,
    resets: u64,
    last_metrics: FrameMetrics,
}

impl FrameScheduler {
    /// Validate `config`, allocate buffers on `backend` and build both
    /// kernels.
    ///
    /// # Errors
    ///
    /// [`StartupError::Config`] for any invalid parameter;
    /// [`StartupError::Resource`] with
    /// [`ResourceError::PrecisionUnavailable`] if the backend cannot
    /// store `f32` field buffers.
    pub fn new(
        config: MagmaConfig,
        backend: Box<dyn ExecutionBackend>,
        compositor: Box<dyn Compositor>,
        presenter: Box<dyn Presenter>,
    ) -> Result<Self, StartupError> {
        config.validate()?;

        let arena =
            ArenaConfig::new(config.field_side).with_precisions(backend.supported_precisions());
        let buffers = HeatBuffers::new(arena).map_err(|e| {
            error!(backend = backend.name(), error = %e, "cannot allocate heat buffers");
            StartupError::from(e)
        })?;

        let diffusion = config.build_diffusion()?;
        let display = config.build_display()?;
        let (input_tx, input_rx) = input_channel(config.input_queue_capacity);
        let viewport = config.viewport;

        info!(
            side = config.field_side,
            viewport = %viewport,
            backend = backend.name(),
            compositor = compositor.name(),
            buffer_bytes = buffers.memory_bytes(),
            "frame scheduler ready"
        );

        Ok(Self {
            brush: Brush::new(config.initial_drawing),
            dt: config.frame_dt(),
            image: FrameImage::new(viewport),
            config,
            backend,
            compositor,
            presenter,
            buffers,
            diffusion,
            display,
            viewport,
            input_tx,
            input_rx,
            frame: FrameId(0),
            time: 0.0,
            resets: 0,
            last_metrics: FrameMetrics::default(),
        })
    }

    /// Scheduler on the serial backend with no compositing and no
    /// presentation. Frames are still rendered into [`image()`](Self::image).
    pub fn headless(config: MagmaConfig) -> Result<Self, StartupError> {
        Self::new(
            config,
            Box::new(SerialBackend),
            Box::new(Passthrough),
            Box::new(NullPresenter),
        )
    }

    /// Run one frame.
    ///
    /// On success the frame was presented and the frame id and simulated
    /// time have advanced. On [`FrameError::ResourceLost`] nothing was
    /// presented, the field is zero, the brush state is kept, and neither
    /// the frame id nor the time advanced.
    pub fn run_frame(&mut self) -> Result<FrameReport, FrameError> {
        let frame_start = Instant::now();

        // (a) Input.
        let (events_applied, lost) = self.drain_input();
        if lost {
            return Err(self.recover(ResourceError::ContextLost {
                reason: "context loss reported by window".into(),
            }));
        }
        let pointer = self.brush.snapshot();
        let input_us = frame_start.elapsed().as_micros() as u64;

        // (b) Diffusion, (c) swap.
        let phase = Instant::now();
        let aspect = self.viewport.aspect();
        let stepped = self.diffusion.step(
            self.backend.as_ref(),
            self.buffers.begin_step(),
            &pointer,
            aspect,
        );
        if let Err(e) = stepped {
            return Err(self.recover(e));
        }
        self.buffers.swap();
        let diffusion_us = phase.elapsed().as_micros() as u64;

        // (d) Display.
        let phase = Instant::now();
        let rendered = self.display.render(
            self.backend.as_ref(),
            self.buffers.current(),
            self.time as f32,
            &mut self.image,
        );
        if let Err(e) = rendered {
            return Err(self.recover(e));
        }
        let shading_us = phase.elapsed().as_micros() as u64;

        // (e) Composite.
        let phase = Instant::now();
        if let Err(e) = self.compositor.composite(&mut self.image, &self.config.bloom) {
            return Err(self.recover(e));
        }
        let composite_us = phase.elapsed().as_micros() as u64;

        // (f) Present.
        let phase = Instant::now();
        if let Err(e) = self.presenter.present(&self.image, self.frame) {
            return Err(self.recover(e));
        }
        let present_us = phase.elapsed().as_micros() as u64;

        let metrics = FrameMetrics {
            total_us: frame_start.elapsed().as_micros() as u64,
            input_us,
            diffusion_us,
            shading_us,
            composite_us,
            present_us,
            events_applied,
            max_heat: self.buffers.current().max(),
            coverage: self.image.coverage(),
            resets: self.resets,
        };
        trace!(
            frame = %self.frame,
            drawing = pointer.drawing,
            max_heat = metrics.max_heat,
            total_us = metrics.total_us,
            "frame presented"
        );
        let report = FrameReport {
            frame: self.frame,
            metrics: metrics.clone(),
        };
        self.last_metrics = metrics;
        self.frame = FrameId(self.frame.0 + 1);
        self.time += self.dt;
        Ok(report)
    }

    /// Apply every queued event in order. Returns the number applied and
    /// whether a context loss was reported.
    fn drain_input(&mut self) -> (u32, bool) {
        let mut applied = 0;
        let mut lost = false;
        for event in self.input_rx.drain() {
            applied += 1;
            match event {
                InputEvent::Resize { width, height } => self.resize(Viewport::new(width, height)),
                InputEvent::ContextLost => lost = true,
                pointer => {
                    self.brush.apply(&pointer);
                }
            }
        }
        (applied, lost)
    }

    /// Handle a failed phase: reallocate on context loss, give up on
    /// anything else.
    fn recover(&mut self, err: ResourceError) -> FrameError {
        if !err.is_recoverable() {
            error!(frame = %self.frame, error = %err, "unrecoverable resource error");
            return FrameError::Fatal(err);
        }
        warn!(frame = %self.frame, error = %err, "resource lost, abandoning frame");

        if let Err(e) = self.buffers.reallocate(self.config.field_side) {
            error!(error = %e, "buffer reallocation failed");
            return FrameError::Fatal(match e {
                ArenaError::Resource(r) => r,
                other => ResourceError::ContextLost {
                    reason: other.to_string(),
                },
            });
        }
        self.image = FrameImage::new(self.viewport);
        self.resets += 1;
        self.last_metrics.resets = self.resets;
        info!(resets = self.resets, side = self.buffers.side(), "heat buffers reallocated");
        FrameError::ResourceLost(err)
    }

    /// Change the output size. The field resolution is unchanged; only
    /// the brush aspect correction and the image size follow the
    /// viewport. Empty viewports are ignored.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            warn!(%viewport, "ignoring resize to an empty viewport");
            return;
        }
        if viewport == self.viewport {
            return;
        }
        debug!(from = %self.viewport, to = %viewport, "viewport resized");
        self.viewport = viewport;
        self.image.resize(viewport);
    }

    /// Zero both heat buffers.
    pub fn clear_field(&mut self) {
        self.buffers.reset();
        debug!("heat field cleared");
    }

    /// Sender for input events; clone freely.
    pub fn input(&self) -> InputSender {
        self.input_tx.clone()
    }

    /// The current (most recently written) heat field.
    pub fn field(&self) -> &HeatField {
        self.buffers.current()
    }

    /// Mutable access to the current field, for seeding heat directly.
    pub fn field_mut(&mut self) -> &mut HeatField {
        self.buffers.current_mut()
    }

    /// The brush as the next frame would see it, ignoring queued events.
    pub fn pointer(&self) -> PointerSnapshot {
        self.brush.snapshot()
    }

    /// Current output size.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The most recently rendered image.
    pub fn image(&self) -> &FrameImage {
        &self.image
    }

    /// Id the next presented frame will carry.
    pub fn frame_id(&self) -> FrameId {
        self.frame
    }

    /// Simulated time in seconds, advanced by `1 / refresh_hz` per frame.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Metrics of the last presented frame.
    pub fn last_metrics(&self) -> &FrameMetrics {
        &self.last_metrics
    }

    /// Number of context-loss recoveries so far.
    pub fn resets(&self) -> u64 {
        self.resets
    }

    /// Name of the execution backend.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// The validated configuration.
    pub fn config(&self) -> &MagmaConfig {
        &self.config
    }
}
