//! Input boundary between the window collaborator and the frame thread.
//!
//! Event handlers never touch renderer state directly. They submit
//! [`InputEvent`]s through an [`InputSender`]; the scheduler drains an
//! [`InputReceiver`] exactly once per frame, right before it snapshots
//! the brush.
//!
//! ```text
//! Move / TouchMove ──> latest-position slot (overwritten, never full)
//! everything else  ──> bounded channel      (pen transitions, resize, loss)
//! ```
//!
//! Pointer motion arrives far faster than frames, so only the newest
//! position is kept. The bounded channel therefore only carries discrete
//! events, and a release cannot be crowded out by motion.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crossbeam_channel::{Receiver, Sender, TrySendError};

/// One event from the window collaborator.
///
/// Pointer coordinates are already normalised to `[0, 1]` with `v = 0`
/// at the top edge. Out-of-range values are clamped when applied;
/// non-finite positions are ignored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// Mouse moved.
    Move {
        /// Horizontal position.
        x: f32,
        /// Vertical position, 0 at the top.
        y: f32,
    },
    /// Primary (left) button pressed.
    PrimaryDown,
    /// Secondary (right) button pressed.
    SecondaryDown,
    /// Any button released.
    Release,
    /// A touch began.
    TouchStart {
        /// Horizontal position.
        x: f32,
        /// Vertical position, 0 at the top.
        y: f32,
    },
    /// A touch moved.
    TouchMove {
        /// Horizontal position.
        x: f32,
        /// Vertical position, 0 at the top.
        y: f32,
    },
    /// A touch ended.
    TouchEnd,
    /// The output surface changed size.
    Resize {
        /// New width in pixels.
        width: u32,
        /// New height in pixels.
        height: u32,
    },
    /// The execution context was lost and must be recreated.
    ContextLost,
}

impl InputEvent {
    /// `true` for events handled by the brush state machine.
    pub fn is_pointer(&self) -> bool {
        !matches!(self, Self::Resize { .. } | Self::ContextLost)
    }
}

/// Error submitting an event.
#[derive(Debug, PartialEq, Eq)]
pub enum SubmitError {
    /// The channel is full (back-pressure); the event was dropped.
    ///
    /// Only discrete events can hit this; moves are coalesced.
    ChannelFull,
    /// The scheduler has been dropped.
    Disconnected,
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ChannelFull => write!(f, "input channel full"),
            Self::Disconnected => write!(f, "input channel disconnected"),
        }
    }
}

impl std::error::Error for SubmitError {}

/// Newest coalesced move, tagged with its submission order.
#[derive(Clone, Copy, Debug)]
struct PendingMove {
    seq: u64,
    event: InputEvent,
}

type MoveSlot = Mutex<Option<PendingMove>>;

fn lock_slot(slot: &MoveSlot) -> MutexGuard<'_, Option<PendingMove>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Cloneable handle for submitting input from any thread.
#[derive(Clone, Debug)]
pub struct InputSender {
    tx: Sender<(u64, InputEvent)>,
    moves: Weak<MoveSlot>,
    seq: Arc<AtomicU64>,
}

impl InputSender {
    /// Submit one event without blocking.
    ///
    /// `Move` and `TouchMove` replace any move not yet drained and never
    /// fail with [`SubmitError::ChannelFull`].
    pub fn send(&self, event: InputEvent) -> Result<(), SubmitError> {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        match event {
            InputEvent::Move { .. } | InputEvent::TouchMove { .. } => {
                let slot = self.moves.upgrade().ok_or(SubmitError::Disconnected)?;
                let mut pending = lock_slot(&slot);
                // A racing sender may already have stored a newer move.
                if pending.is_none_or(|p| p.seq < seq) {
                    *pending = Some(PendingMove { seq, event });
                }
                Ok(())
            }
            _ => self.tx.try_send((seq, event)).map_err(|e| match e {
                TrySendError::Full(_) => SubmitError::ChannelFull,
                TrySendError::Disconnected(_) => SubmitError::Disconnected,
            }),
        }
    }

    /// Number of events waiting for the next frame, counting a pending
    /// move as one.
    pub fn pending(&self) -> usize {
        let moved = self
            .moves
            .upgrade()
            .map_or(0, |slot| usize::from(lock_slot(&slot).is_some()));
        self.tx.len() + moved
    }
}

/// Frame-thread end of the input boundary.
#[derive(Debug)]
pub struct InputReceiver {
    rx: Receiver<(u64, InputEvent)>,
    moves: Arc<MoveSlot>,
}

impl InputReceiver {
    /// Take everything submitted so far, in submission order, with
    /// consecutive moves collapsed into the newest one.
    pub fn drain(&self) -> Vec<InputEvent> {
        let mut events: Vec<(u64, InputEvent)> = self.rx.try_iter().collect();
        if let Some(m) = lock_slot(&self.moves).take() {
            let at = events.partition_point(|(seq, _)| *seq < m.seq);
            events.insert(at, (m.seq, m.event));
        }
        events.into_iter().map(|(_, event)| event).collect()
    }
}

/// Create an input boundary whose channel holds at most `capacity`
/// discrete events.
pub fn input_channel(capacity: usize) -> (InputSender, InputReceiver) {
    let (tx, rx) = crossbeam_channel::bounded(capacity.max(1));
    let moves = Arc::new(Mutex::new(None));
    let sender = InputSender {
        tx,
        moves: Arc::downgrade(&moves),
        seq: Arc::new(AtomicU64::new(0)),
    };
    (sender, InputReceiver { rx, moves })
}
