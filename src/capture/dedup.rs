//! Consumer-side duplicate filter.
//!
//! Both capture paths can report the same clipboard change. The receiving
//! side drops a text identical to the last accepted one while the window that
//! acceptance opened is still running.

use std::time::{Duration, Instant};

use crate::config::DEFAULT_DEDUP_WINDOW_MS;
use crate::debounce::Debounce;

#[derive(Debug, Clone)]
pub struct CaptureFilter {
    last_text: Option<String>,
    window: Debounce,
}

impl Default for CaptureFilter {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_DEDUP_WINDOW_MS))
    }
}

impl CaptureFilter {
    pub fn new(window: Duration) -> Self {
        Self {
            last_text: None,
            window: Debounce::new(window),
        }
    }

    /// Returns false for a repeat inside the window. Only acceptances restart
    /// the window; a suppressed repeat leaves it where it was.
    pub fn accept(&mut self, text: &str, now: Instant) -> bool {
        let repeat = self.last_text.as_deref() == Some(text) && self.window.is_active(now);
        if repeat {
            return false;
        }
        self.last_text = Some(text.to_string());
        self.window.schedule(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> CaptureFilter {
        CaptureFilter::new(Duration::from_millis(1000))
    }

    #[test]
    fn test_same_text_within_window_is_dropped() {
        let mut filter = filter();
        let t0 = Instant::now();
        assert!(filter.accept("hello", t0));
        assert!(!filter.accept("hello", t0 + Duration::from_millis(500)));
    }

    #[test]
    fn test_same_text_after_window_is_accepted() {
        let mut filter = filter();
        let t0 = Instant::now();
        assert!(filter.accept("hello", t0));
        assert!(filter.accept("hello", t0 + Duration::from_millis(1500)));
    }

    #[test]
    fn test_different_text_is_always_accepted() {
        let mut filter = filter();
        let t0 = Instant::now();
        assert!(filter.accept("one", t0));
        assert!(filter.accept("two", t0 + Duration::from_millis(10)));
        assert!(filter.accept("one", t0 + Duration::from_millis(20)));
    }

    #[test]
    fn test_suppressed_repeat_does_not_extend_window() {
        let mut filter = filter();
        let t0 = Instant::now();
        assert!(filter.accept("hello", t0));
        assert!(!filter.accept("hello", t0 + Duration::from_millis(900)));
        assert!(filter.accept("hello", t0 + Duration::from_millis(1100)));
    }
}
