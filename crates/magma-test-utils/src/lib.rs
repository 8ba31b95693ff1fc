//! Test utilities and mock collaborators for Magma development.
//!
//! Provides mock implementations of the engine's collaborator traits
//! ([`Presenter`], [`ExecutionBackend`]) plus configuration and field
//! fixtures in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use magma_core::{FrameId, FrameImage, Precision, ResourceError, Rgba};
use magma_engine::Presenter;
use magma_kernels::backend::RowFn;
use magma_kernels::{ExecutionBackend, SerialBackend};

/// One frame seen by a [`RecordingPresenter`].
#[derive(Clone, Debug)]
pub struct PresentedFrame {
    pub frame: FrameId,
    pub coverage: f32,
    pub image: FrameImage,
}

/// Shared view of everything a [`RecordingPresenter`] received.
///
/// Cloneable so a test can keep one handle after moving the presenter
/// into a scheduler.
#[derive(Clone, Debug, Default)]
pub struct PresentLog {
    frames: Arc<Mutex<Vec<PresentedFrame>>>,
}

impl PresentLog {
    fn lock(&self) -> MutexGuard<'_, Vec<PresentedFrame>> {
        self.frames.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Ids of every presented frame, in order.
    pub fn frame_ids(&self) -> Vec<FrameId> {
        self.lock().iter().map(|f| f.frame).collect()
    }

    /// Number of presented frames.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// The most recent frame, if any.
    pub fn last(&self) -> Option<PresentedFrame> {
        self.lock().last().cloned()
    }
}

/// Presenter that records a copy of every frame.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    log: PresentLog,
}

impl RecordingPresenter {
    /// A presenter and a handle onto what it records.
    pub fn new() -> (Self, PresentLog) {
        let log = PresentLog::default();
        (Self { log: log.clone() }, log)
    }
}

impl Presenter for RecordingPresenter {
    fn present(&mut self, image: &FrameImage, frame: FrameId) -> Result<(), ResourceError> {
        self.log.lock().push(PresentedFrame {
            frame,
            coverage: image.coverage(),
            image: image.clone(),
        });
        Ok(())
    }
}

/// Serial backend that reports a context loss on chosen scalar-fill
/// calls.
///
/// Calls are counted from zero across the backend's lifetime. Each
/// listed call fails once with [`ResourceError::ContextLost`] and leaves
/// the output untouched.
#[derive(Debug)]
pub struct FlakyBackend {
    fail_on: Vec<usize>,
    calls: AtomicUsize,
}

impl FlakyBackend {
    /// Fail scalar fills number `fail_on` (0-based).
    pub fn new(fail_on: &[usize]) -> Self {
        Self {
            fail_on: fail_on.to_vec(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Scalar fills attempted so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl ExecutionBackend for FlakyBackend {
    fn name(&self) -> &str {
        "flaky"
    }

    fn fill_rows_f32(
        &self,
        out: &mut [f32],
        row_len: usize,
        row: &RowFn<'_, f32>,
    ) -> Result<(), ResourceError> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_on.contains(&call) {
            return Err(ResourceError::ContextLost {
                reason: format!("injected failure on call {call}"),
            });
        }
        SerialBackend.fill_rows_f32(out, row_len, row)
    }

    fn fill_rows_rgba(
        &self,
        out: &mut [Rgba],
        row_len: usize,
        row: &RowFn<'_, Rgba>,
    ) -> Result<(), ResourceError> {
        SerialBackend.fill_rows_rgba(out, row_len, row)
    }
}

/// Backend that only offers half-precision buffers.
#[derive(Clone, Copy, Debug, Default)]
pub struct HalfPrecisionBackend;

impl ExecutionBackend for HalfPrecisionBackend {
    fn name(&self) -> &str {
        "half-precision"
    }

    fn supported_precisions(&self) -> &[Precision] {
        &[Precision::F16]
    }

    fn fill_rows_f32(
        &self,
        out: &mut [f32],
        row_len: usize,
        row: &RowFn<'_, f32>,
    ) -> Result<(), ResourceError> {
        SerialBackend.fill_rows_f32(out, row_len, row)
    }

    fn fill_rows_rgba(
        &self,
        out: &mut [Rgba],
        row_len: usize,
        row: &RowFn<'_, Rgba>,
    ) -> Result<(), ResourceError> {
        SerialBackend.fill_rows_rgba(out, row_len, row)
    }
}
