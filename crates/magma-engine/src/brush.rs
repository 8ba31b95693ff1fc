//! Pointer/brush state machine.
//!
//! ```text
//!            PrimaryDown | TouchStart
//!   PenUp  ─────────────────────────▶  PenDown
//!          ◀─────────────────────────
//!     SecondaryDown | Release | TouchEnd
//! ```
//!
//! Moves update the position in either state. The diffusion kernel only
//! ever sees an immutable [`PointerSnapshot`] taken once per frame.

use magma_core::PointerSnapshot;

use crate::input::InputEvent;

/// Whether the brush is injecting heat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrushState {
    /// Not drawing.
    PenUp,
    /// Drawing.
    PenDown,
}

/// Latest pointer position and pen state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Brush {
    state: BrushState,
    u: f32,
    v: f32,
}

impl Brush {
    /// A brush at the centre, drawing if `initial_drawing` is set.
    pub fn new(initial_drawing: bool) -> Self {
        let state = if initial_drawing {
            BrushState::PenDown
        } else {
            BrushState::PenUp
        };
        Self {
            state,
            u: 0.5,
            v: 0.5,
        }
    }

    /// Current pen state.
    pub fn state(&self) -> BrushState {
        self.state
    }

    /// Apply one event. Returns `false` (and changes nothing) for events
    /// that are not pointer events.
    pub fn apply(&mut self, event: &InputEvent) -> bool {
        match *event {
            InputEvent::Move { x, y } | InputEvent::TouchMove { x, y } => self.move_to(x, y),
            InputEvent::TouchStart { x, y } => {
                self.move_to(x, y);
                self.state = BrushState::PenDown;
            }
            InputEvent::PrimaryDown => self.state = BrushState::PenDown,
            InputEvent::SecondaryDown | InputEvent::Release | InputEvent::TouchEnd => {
                self.state = BrushState::PenUp;
            }
            InputEvent::Resize { .. } | InputEvent::ContextLost => return false,
        }
        true
    }

    fn move_to(&mut self, x: f32, y: f32) {
        if x.is_finite() && y.is_finite() {
            self.u = x.clamp(0.0, 1.0);
            self.v = y.clamp(0.0, 1.0);
        }
    }

    /// Immutable copy for one diffusion step.
    pub fn snapshot(&self) -> PointerSnapshot {
        PointerSnapshot::new(self.u, self.v, self.state == BrushState::PenDown)
    }
}

impl Default for Brush {
    fn default() -> Self {
        Self::new(false)
    }
}
