//! Frame scheduling for the Magma heat-field renderer.
//!
//! Ties the buffers and kernels together into a frame pipeline:
//!
//! - [`FrameScheduler`]: single-threaded owner of all renderer state,
//!   one frame per [`run_frame()`](FrameScheduler::run_frame).
//! - [`RealtimeLoop`]: runs a scheduler on a dedicated thread, paced by
//!   a [`RefreshSignal`].
//!
//! Input reaches the frame thread only through the bounded channel
//! behind [`InputSender`]; window, bloom and presentation collaborators
//! are injected as [`Compositor`] and [`Presenter`] trait objects.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod brush;
pub mod compositor;
pub mod config;
pub mod input;
pub mod metrics;
pub mod realtime;
pub mod refresh;
pub mod scheduler;

pub use brush::{Brush, BrushState};
pub use compositor::{Compositor, NullPresenter, Passthrough, Presenter};
pub use config::{BloomSettings, MagmaConfig, SimulationParams};
pub use input::{input_channel, InputEvent, InputReceiver, InputSender, SubmitError};
pub use metrics::FrameMetrics;
pub use realtime::{RealtimeLoop, ShutdownReport};
pub use refresh::{FixedRate, RefreshSignal};
pub use scheduler::{FrameError, FrameReport, FrameScheduler, StartupError};
