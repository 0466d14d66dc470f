//! Cancellable single-shot timers.
//!
//! Time is always passed in by the caller, so timer behaviour is
//! deterministic under test.

#[cfg(not(target_arch = "wasm32"))]
pub use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
pub use web_time::{Duration, Instant};

/// A debounce timer: every `schedule` cancels the pending deadline and starts
/// a new one, and each schedule fires at most once.
#[derive(Debug, Clone)]
pub struct DebounceTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl DebounceTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancel any pending deadline and start a new one from `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.cancel();
        self.deadline = Some(now + self.delay);
    }

    /// Drop the pending deadline, if any.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true exactly once when the deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Fire immediately if a deadline is pending (used on shutdown).
    pub fn flush(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once() {
        let start = Instant::now();
        let mut timer = DebounceTimer::from_millis(100);
        timer.schedule(start);
        assert!(!timer.poll(start + Duration::from_millis(50)));
        assert!(timer.poll(start + Duration::from_millis(100)));
        assert!(!timer.poll(start + Duration::from_millis(500)));
        assert!(!timer.is_pending());
    }

    #[test]
    fn test_reschedule_pushes_deadline() {
        let start = Instant::now();
        let mut timer = DebounceTimer::from_millis(100);
        timer.schedule(start);
        timer.schedule(start + Duration::from_millis(80));
        assert!(!timer.poll(start + Duration::from_millis(120)));
        assert!(timer.poll(start + Duration::from_millis(180)));
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut timer = DebounceTimer::from_millis(10);
        timer.schedule(start);
        timer.cancel();
        assert!(!timer.poll(start + Duration::from_secs(1)));
        assert!(!timer.flush());
    }
}
