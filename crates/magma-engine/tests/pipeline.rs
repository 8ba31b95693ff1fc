//! Integration test: frame ordering, pointer handling and recovery.
//!
//! Drives a scheduler with mock collaborators from `magma-test-utils`
//! and checks what the presenter actually receives.

use std::sync::{Arc, Mutex};

use magma_core::{FrameId, FrameImage, ResourceError, Viewport};
use magma_engine::{
    BloomSettings, Compositor, FrameError, FrameScheduler, InputEvent, NullPresenter, Passthrough,
    StartupError,
};
use magma_kernels::{RayonBackend, SerialBackend};
use magma_test_utils::fixtures::quiet_config;
use magma_test_utils::{FlakyBackend, HalfPrecisionBackend, RecordingPresenter};

/// Compositor that remembers the coverage it was handed and the
/// settings it was called with.
#[derive(Clone, Default)]
struct SpyCompositor {
    seen: Arc<Mutex<Vec<(f32, BloomSettings)>>>,
}

impl Compositor for SpyCompositor {
    fn name(&self) -> &str {
        "spy"
    }

    fn composite(
        &mut self,
        image: &mut FrameImage,
        settings: &BloomSettings,
    ) -> Result<(), ResourceError> {
        self.seen
            .lock()
            .unwrap()
            .push((image.coverage(), settings.clone()));
        Ok(())
    }
}

fn recording_scheduler() -> (FrameScheduler, magma_test_utils::PresentLog) {
    let (presenter, log) = RecordingPresenter::new();
    let s = FrameScheduler::new(
        quiet_config(32, 32, 32),
        Box::new(SerialBackend),
        Box::new(Passthrough),
        Box::new(presenter),
    )
    .unwrap();
    (s, log)
}

#[test]
fn first_drawing_frame_is_visible() {
    // The display kernel reads the field written in the same frame.
    let (mut s, log) = recording_scheduler();
    s.input().send(InputEvent::PrimaryDown).unwrap();
    s.run_frame().unwrap();
    let frame = log.last().unwrap();
    assert_eq!(frame.frame, FrameId(0));
    assert!(frame.coverage > 0.0);
}

#[test]
fn compositor_runs_before_presenter_with_configured_settings() {
    let spy = SpyCompositor::default();
    let (presenter, log) = RecordingPresenter::new();
    let mut config = quiet_config(32, 32, 32);
    config.bloom.intensity = 2.5;
    let mut s = FrameScheduler::new(
        config,
        Box::new(SerialBackend),
        Box::new(spy.clone()),
        Box::new(presenter),
    )
    .unwrap();
    s.input().send(InputEvent::PrimaryDown).unwrap();
    s.run_frame().unwrap();
    s.run_frame().unwrap();

    let seen = spy.seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].1.intensity, 2.5);
    assert_eq!(log.len(), 2);
    assert_eq!(seen[1].0, log.last().unwrap().coverage);
}

#[test]
fn press_move_move_release_in_one_frame_injects_nothing() {
    let (mut s, log) = recording_scheduler();
    let input = s.input();
    input.send(InputEvent::PrimaryDown).unwrap();
    input.send(InputEvent::Move { x: 0.2, y: 0.2 }).unwrap();
    input.send(InputEvent::Move { x: 0.8, y: 0.3 }).unwrap();
    input.send(InputEvent::Release).unwrap();

    for _ in 0..5 {
        let report = s.run_frame().unwrap();
        assert_eq!(report.metrics.max_heat, 0.0);
    }
    assert!(s.field().is_extinct());
    assert_eq!(log.len(), 5);
    assert!(log.last().unwrap().coverage == 0.0);
    let p = s.pointer();
    assert_eq!((p.u, p.v, p.drawing), (0.8, 0.3, false));
}

#[test]
fn release_is_not_lost_behind_pointer_motion() {
    let mut config = quiet_config(32, 32, 32);
    config.input_queue_capacity = 4;
    let mut s = FrameScheduler::headless(config).unwrap();
    let input = s.input();

    input.send(InputEvent::PrimaryDown).unwrap();
    for i in 0..200 {
        let x = 0.3 + i as f32 / 1000.0;
        input.send(InputEvent::Move { x, y: 0.5 }).unwrap();
    }
    input.send(InputEvent::Release).unwrap();
    s.run_frame().unwrap();
    assert!(!s.pointer().drawing);

    s.clear_field();
    for _ in 0..5 {
        let report = s.run_frame().unwrap();
        assert_eq!(report.metrics.max_heat, 0.0);
    }
}

#[test]
fn heat_follows_the_pointer() {
    let (mut s, _log) = recording_scheduler();
    let input = s.input();
    input.send(InputEvent::TouchStart { x: 0.2, y: 0.8 }).unwrap();
    s.run_frame().unwrap();
    let (x, y) = s.field().argmax();
    // Cell centre nearest (0.2, 0.8) on a 32² grid is (6, 25).
    assert!((5..=7).contains(&x) && (24..=26).contains(&y), "argmax ({x}, {y})");

    input.send(InputEvent::TouchEnd).unwrap();
    let before = s.field().max();
    input.send(InputEvent::TouchMove { x: 0.9, y: 0.1 }).unwrap();
    let report = s.run_frame().unwrap();
    assert!(report.metrics.max_heat < before);
}

#[test]
fn backend_loss_abandons_frame_and_recovers() {
    let (presenter, log) = RecordingPresenter::new();
    // Scalar fill call 2 is the diffusion step of the third frame.
    let mut s = FrameScheduler::new(
        quiet_config(16, 16, 16),
        Box::new(FlakyBackend::new(&[2])),
        Box::new(Passthrough),
        Box::new(presenter),
    )
    .unwrap();
    s.input().send(InputEvent::PrimaryDown).unwrap();

    assert!(s.run_frame().is_ok());
    assert!(s.run_frame().is_ok());
    let err = s.run_frame().unwrap_err();
    assert!(matches!(
        err,
        FrameError::ResourceLost(ResourceError::ContextLost { .. })
    ));
    assert!(s.field().is_extinct());
    assert_eq!(s.resets(), 1);

    // Resumes on the next call with the brush still down.
    let report = s.run_frame().unwrap();
    assert_eq!(report.frame, FrameId(2));
    assert!(report.metrics.max_heat > 0.0);
    assert_eq!(report.metrics.resets, 1);
    assert_eq!(log.frame_ids(), vec![FrameId(0), FrameId(1), FrameId(2)]);
}

#[test]
fn backend_without_f32_buffers_fails_fast() {
    let err = FrameScheduler::new(
        quiet_config(16, 16, 16),
        Box::new(HalfPrecisionBackend),
        Box::new(Passthrough),
        Box::new(NullPresenter),
    )
    .err()
    .unwrap();
    match err {
        StartupError::Resource(ResourceError::PrecisionUnavailable { supported, .. }) => {
            assert_eq!(supported, vec![magma_core::Precision::F16]);
        }
        other => panic!("expected PrecisionUnavailable, got {other:?}"),
    }
}

#[test]
fn serial_and_rayon_schedulers_agree() {
    let mut config = quiet_config(48, 40, 24);
    // Keep the noise on: the default fBm sources must also be backend
    // independent.
    config.shading.flow_amplitude = 0.02;
    config.shading.crust_strength = 0.2;
    config.seed = 9;

    let mut serial = FrameScheduler::headless(config.clone()).unwrap();
    let mut parallel = FrameScheduler::new(
        config,
        Box::new(RayonBackend::new(Some(4)).unwrap()),
        Box::new(Passthrough),
        Box::new(NullPresenter),
    )
    .unwrap();
    assert_eq!(parallel.backend_name(), "rayon");

    let strokes = [
        InputEvent::TouchStart { x: 0.3, y: 0.3 },
        InputEvent::TouchMove { x: 0.4, y: 0.35 },
        InputEvent::TouchMove { x: 0.5, y: 0.5 },
        InputEvent::TouchMove { x: 0.7, y: 0.6 },
        InputEvent::TouchEnd,
    ];
    for event in strokes {
        serial.input().send(event).unwrap();
        parallel.input().send(event).unwrap();
        serial.run_frame().unwrap();
        parallel.run_frame().unwrap();
        assert_eq!(serial.field(), parallel.field());
        assert_eq!(serial.image(), parallel.image());
    }
}

#[test]
fn resize_mid_stroke_keeps_heat() {
    let (mut s, log) = recording_scheduler();
    let input = s.input();
    input.send(InputEvent::PrimaryDown).unwrap();
    s.run_frame().unwrap();
    let before = s.field().sum();

    input
        .send(InputEvent::Resize {
            width: 64,
            height: 16,
        })
        .unwrap();
    s.run_frame().unwrap();
    assert!(s.field().sum() > before);
    assert_eq!(s.viewport(), Viewport::new(64, 16));
    let last = log.last().unwrap();
    assert_eq!((last.image.width(), last.image.height()), (64, 16));
}
