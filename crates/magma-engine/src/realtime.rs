//! Realtime frame loop on a dedicated thread.
//!
//! # Architecture
//!
//! ```text
//! Window / input thread(s)          Frame thread ("magma-frame")
//!     |                                  |
//!     |--InputSender::send()------------>| refresh.wait()
//!     |   [bounded channel]              | scheduler.run_frame()
//!     |                                  |   drain input, snapshot
//!     |                                  |   diffuse, swap, shade
//!     |                                  |   composite, present
//!     |                                  | check shutdown flag
//!     |                                  |
//!     |--shutdown()--------------------->| finish current frame, exit
//!     |<--FrameScheduler (join)----------|
//! ```
//!
//! The frame thread owns the [`FrameScheduler`] exclusively. Nothing is
//! shared with other threads apart from the input channel, the shutdown
//! flag and two counters.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tracing::{error, info};

use crate::input::InputSender;
use crate::refresh::RefreshSignal;
use crate::scheduler::{FrameError, FrameScheduler};

// ── ShutdownReport ───────────────────────────────────────────────

/// Report from [`RealtimeLoop::shutdown`].
#[derive(Debug)]
pub struct ShutdownReport {
    /// Frames presented over the loop's lifetime.
    pub frames_rendered: u64,
    /// Frames abandoned because of a context loss.
    pub resource_losses: u64,
    /// Whether the frame thread was joined successfully.
    pub joined: bool,
    /// Time spent stopping and joining the frame thread.
    pub total_ms: u64,
}

// ── Frame thread ─────────────────────────────────────────────────

struct FrameThreadState {
    scheduler: FrameScheduler,
    refresh: Box<dyn RefreshSignal>,
    shutdown_flag: Arc<AtomicBool>,
    stopped: Arc<AtomicBool>,
    frames: Arc<AtomicU64>,
    losses: Arc<AtomicU64>,
}

impl FrameThreadState {
    /// Run frames until shutdown, the refresh signal ends, or a fatal
    /// error. Returns the scheduler to the joining thread.
    fn run(mut self) -> FrameScheduler {
        loop {
            if self.shutdown_flag.load(Ordering::Acquire) {
                break;
            }
            if !self.refresh.wait() {
                info!("refresh signal ended");
                break;
            }
            // Shutdown may have arrived during the wait; never start a
            // frame after it.
            if self.shutdown_flag.load(Ordering::Acquire) {
                break;
            }
            match self.scheduler.run_frame() {
                Ok(_) => {
                    self.frames.fetch_add(1, Ordering::Relaxed);
                }
                Err(FrameError::ResourceLost(_)) => {
                    self.losses.fetch_add(1, Ordering::Relaxed);
                }
                Err(e @ FrameError::Fatal(_)) => {
                    error!(error = %e, "frame loop stopping");
                    break;
                }
            }
        }
        self.stopped.store(true, Ordering::Release);
        self.scheduler
    }
}

// ── RealtimeLoop ─────────────────────────────────────────────────

/// Runs a [`FrameScheduler`] continuously on a background thread.
pub struct RealtimeLoop {
    input: InputSender,
    shutdown_flag: Arc<AtomicBool>,
    stopped: Arc<AtomicBool>,
    frames: Arc<AtomicU64>,
    losses: Arc<AtomicU64>,
    handle: Option<JoinHandle<FrameScheduler>>,
}

impl RealtimeLoop {
    /// Move `scheduler` onto a new `magma-frame` thread paced by `refresh`.
    ///
    /// Returns an error only if the OS refuses to spawn the thread.
    pub fn start(
        scheduler: FrameScheduler,
        refresh: impl RefreshSignal + 'static,
    ) -> std::io::Result<Self> {
        let input = scheduler.input();
        let shutdown_flag = Arc::new(AtomicBool::new(false));
        let stopped = Arc::new(AtomicBool::new(false));
        let frames = Arc::new(AtomicU64::new(0));
        let losses = Arc::new(AtomicU64::new(0));

        let state = FrameThreadState {
            scheduler,
            refresh: Box::new(refresh),
            shutdown_flag: Arc::clone(&shutdown_flag),
            stopped: Arc::clone(&stopped),
            frames: Arc::clone(&frames),
            losses: Arc::clone(&losses),
        };
        let handle = thread::Builder::new()
            .name("magma-frame".into())
            .spawn(move || state.run())?;
        info!("realtime loop started");

        Ok(Self {
            input,
            shutdown_flag,
            stopped,
            frames,
            losses,
            handle: Some(handle),
        })
    }

    /// Sender for input events.
    pub fn input(&self) -> InputSender {
        self.input.clone()
    }

    /// Frames presented so far.
    pub fn frames_rendered(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    /// `true` until the frame thread has exited.
    pub fn is_running(&self) -> bool {
        !self.stopped.load(Ordering::Acquire)
    }

    /// Stop the loop and recover the scheduler.
    ///
    /// The frame in flight (if any) completes and is presented; no new
    /// frame starts. Dropping the returned scheduler releases the heat
    /// buffers. The scheduler is `None` only if the frame thread
    /// panicked.
    pub fn shutdown(mut self) -> (ShutdownReport, Option<FrameScheduler>) {
        let start = Instant::now();
        self.shutdown_flag.store(true, Ordering::Release);

        let scheduler = match self.handle.take() {
            Some(handle) => {
                // Cut short a pacing sleep.
                handle.thread().unpark();
                match handle.join() {
                    Ok(s) => Some(s),
                    Err(_) => {
                        error!("frame thread panicked");
                        None
                    }
                }
            }
            None => None,
        };

        let report = ShutdownReport {
            frames_rendered: self.frames.load(Ordering::Relaxed),
            resource_losses: self.losses.load(Ordering::Relaxed),
            joined: scheduler.is_some(),
            total_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            frames = report.frames_rendered,
            losses = report.resource_losses,
            "realtime loop stopped"
        );
        (report, scheduler)
    }
}

impl Drop for RealtimeLoop {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.shutdown_flag.store(true, Ordering::Release);
            handle.thread().unpark();
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MagmaConfig;
    use crate::input::InputEvent;
    use crate::refresh::FixedRate;
    use magma_core::Viewport;

    fn scheduler() -> FrameScheduler {
        FrameScheduler::headless(MagmaConfig {
            field_side: 16,
            viewport: Viewport::new(16, 16),
            ..MagmaConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn limited_signal_ends_the_loop() {
        let rt = RealtimeLoop::start(scheduler(), FixedRate::new(1000.0).with_limit(5)).unwrap();
        let deadline = Instant::now() + std::time::Duration::from_secs(10);
        while rt.is_running() && Instant::now() < deadline {
            thread::yield_now();
        }
        let (report, scheduler) = rt.shutdown();
        assert!(report.joined);
        assert_eq!(report.frames_rendered, 5);
        assert_eq!(scheduler.unwrap().frame_id().0, 5);
    }

    #[test]
    fn shutdown_returns_scheduler_with_field() {
        let rt = RealtimeLoop::start(scheduler(), FixedRate::new(500.0)).unwrap();
        rt.input().send(InputEvent::PrimaryDown).unwrap();
        let deadline = Instant::now() + std::time::Duration::from_secs(10);
        while rt.frames_rendered() < 3 && Instant::now() < deadline {
            thread::yield_now();
        }
        let (report, scheduler) = rt.shutdown();
        let scheduler = scheduler.unwrap();
        assert!(report.frames_rendered >= 3);
        assert_eq!(scheduler.frame_id().0, report.frames_rendered);
        assert!(scheduler.pointer().drawing);
        assert!(scheduler.field().max() > 0.0);
    }

    #[test]
    fn drop_stops_the_thread() {
        let rt = RealtimeLoop::start(scheduler(), FixedRate::new(200.0)).unwrap();
        let input = rt.input();
        drop(rt);
        // The scheduler (and its receiver) are gone once the thread is joined.
        assert!(input.send(InputEvent::Release).is_err());
    }
}
