//! One-shot rescheduling timer.
//!
//! Holds a single deadline; scheduling again pushes it out. Time is passed in
//! explicitly so owners decide which clock to use and tests stay deterministic.
//! Used for the autosave quiet period and the duplicate-capture window.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debounce {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Arm (or re-arm) the timer to fire `quiet` after `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True while armed and the deadline has not been reached.
    pub fn is_active(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now < deadline)
    }

    /// Time left until the deadline; zero if already due, None if idle.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Fire once: returns true and disarms if the deadline has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
