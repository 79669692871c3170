//! Delay-and-coalesce timer for search input. The event loop polls
//! [`Debouncer::fire_due`] on its fixed tick; rapid keystrokes keep pushing
//! the deadline forward so only the last edit triggers a re-derivation.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Arm (or re-arm) the timer, coalescing with any pending deadline.
    pub fn arm(&mut self) {
        self.deadline = Some(Instant::now() + self.delay);
    }

    /// Drop any pending deadline without firing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// True exactly once per armed deadline, when it has elapsed.
    pub fn fire_due(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_the_delay() {
        let mut d = Debouncer::new(Duration::ZERO);
        assert!(!d.fire_due());

        d.arm();
        assert!(d.is_armed());
        assert!(d.fire_due());
        // One arm, one fire.
        assert!(!d.fire_due());
        assert!(!d.is_armed());
    }

    #[test]
    fn rearming_pushes_the_deadline_forward() {
        let mut d = Debouncer::new(Duration::from_secs(60));
        d.arm();
        assert!(!d.fire_due());
        d.arm();
        assert!(!d.fire_due());
        assert!(d.is_armed());
    }

    #[test]
    fn cancel_drops_the_pending_deadline() {
        let mut d = Debouncer::new(Duration::ZERO);
        d.arm();
        d.cancel();
        assert!(!d.fire_due());
    }
}
