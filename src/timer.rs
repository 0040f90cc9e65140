//! One-shot, cancelable commit deadline.
//!
//! The timer holds no thread and no callback. It records a deadline; the
//! owner polls it with the current time and learns when it has fired.
//! This keeps every transition on the thread that owns the composer, so a
//! canceled deadline can never fire late.

use std::time::{Duration, Instant};

/// A single pending deadline, or none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitTimer {
    deadline: Option<Instant>,
}

impl CommitTimer {
    /// A timer with nothing scheduled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule the deadline `timeout` after `now`.
    ///
    /// Any earlier deadline is canceled first. At most one is outstanding.
    pub fn schedule(&mut self, now: Instant, timeout: Duration) {
        self.cancel();
        self.deadline = Some(now + timeout);
    }

    /// Cancel the pending deadline. Safe when nothing is pending.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// The outstanding deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left until the deadline, saturating at zero.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// Fire the timer if its deadline has passed.
    ///
    /// Returns true exactly once per scheduled deadline.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(600);

    #[test]
    fn new_timer_is_idle() {
        let mut timer = CommitTimer::new();
        assert_eq!(timer.deadline(), None);
        assert!(!timer.poll(Instant::now()));
    }

    #[test]
    fn fires_once_after_deadline() {
        let start = Instant::now();
        let mut timer = CommitTimer::new();
        timer.schedule(start, TIMEOUT);

        assert!(!timer.poll(start + Duration::from_millis(599)));
        assert!(timer.poll(start + TIMEOUT));
        assert!(!timer.poll(start + TIMEOUT * 2));
        assert_eq!(timer.deadline(), None);
    }

    #[test]
    fn cancel_prevents_firing() {
        let start = Instant::now();
        let mut timer = CommitTimer::new();
        timer.schedule(start, TIMEOUT);
        timer.cancel();
        assert!(!timer.poll(start + TIMEOUT * 2));
    }

    #[test]
    fn cancel_without_deadline_is_noop() {
        let mut timer = CommitTimer::new();
        timer.cancel();
        timer.cancel();
        assert_eq!(timer, CommitTimer::new());
    }

    #[test]
    fn reschedule_replaces_deadline() {
        let start = Instant::now();
        let mut timer = CommitTimer::new();
        timer.schedule(start, TIMEOUT);
        let later = start + Duration::from_millis(500);
        timer.schedule(later, TIMEOUT);

        // The first deadline has passed but was replaced.
        assert!(!timer.poll(start + TIMEOUT));
        assert!(timer.poll(later + TIMEOUT));
    }

    #[test]
    fn remaining_saturates() {
        let start = Instant::now();
        let mut timer = CommitTimer::new();
        assert_eq!(timer.remaining(start), None);

        timer.schedule(start, TIMEOUT);
        assert_eq!(timer.remaining(start), Some(TIMEOUT));
        assert_eq!(timer.remaining(start + TIMEOUT * 3), Some(Duration::ZERO));
    }
}
