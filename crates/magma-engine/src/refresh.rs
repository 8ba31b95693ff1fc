//! Frame pacing for the realtime loop.

use std::time::{Duration, Instant};

/// Paces the realtime loop, standing in for the display's refresh
/// callback.
pub trait RefreshSignal: Send {
    /// Block until the next frame should start. Returning `false` stops
    /// the loop.
    fn wait(&mut self) -> bool;
}

/// Fixed-rate pacing: sleeps out whatever is left of the frame budget
/// since the previous call.
///
/// The sleep uses `thread::park_timeout`, so unparking the frame thread
/// ends it early.
#[derive(Debug)]
pub struct FixedRate {
    budget: Duration,
    last: Option<Instant>,
    remaining: Option<u64>,
}

impl FixedRate {
    /// Pace at `hz` frames per second (clamped to at least 0.001).
    pub fn new(hz: f64) -> Self {
        let hz = if hz.is_finite() { hz.max(0.001) } else { 60.0 };
        Self {
            budget: Duration::from_secs_f64(1.0 / hz),
            last: None,
            remaining: None,
        }
    }

    /// Stop after `frames` more frames.
    pub fn with_limit(mut self, frames: u64) -> Self {
        self.remaining = Some(frames);
        self
    }

    /// Target time between frames.
    pub fn budget(&self) -> Duration {
        self.budget
    }
}

impl RefreshSignal for FixedRate {
    fn wait(&mut self) -> bool {
        if let Some(n) = self.remaining.as_mut() {
            if *n == 0 {
                return false;
            }
            *n -= 1;
        }
        if let Some(last) = self.last {
            if let Some(rest) = self.budget.checked_sub(last.elapsed()) {
                std::thread::park_timeout(rest);
            }
        }
        self.last = Some(Instant::now());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_wait_returns_immediately() {
        let mut r = FixedRate::new(1.0);
        let start = Instant::now();
        assert!(r.wait());
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn limit_stops_the_signal() {
        let mut r = FixedRate::new(1000.0).with_limit(2);
        assert!(r.wait());
        assert!(r.wait());
        assert!(!r.wait());
        assert!(!r.wait());
    }

    #[test]
    fn budget_from_rate() {
        assert_eq!(FixedRate::new(50.0).budget(), Duration::from_millis(20));
    }

    #[test]
    fn invalid_rate_falls_back() {
        assert_eq!(FixedRate::new(f64::NAN).budget(), FixedRate::new(60.0).budget());
    }
}
