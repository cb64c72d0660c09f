//! Call-rate circuit breaker for the interception path
//!
//! A fixed-window counter with decay. Once the count passes
//! `decay_threshold` a deadline is armed; when it passes, the counter starts
//! over. Passing `trip_threshold` before that trips the breaker.

use std::time::{Duration, Instant};

pub const DEFAULT_DECAY_THRESHOLD: u32 = 100;
pub const DEFAULT_TRIP_THRESHOLD: u32 = 1000;
pub const DEFAULT_DECAY_INTERVAL: Duration = Duration::from_secs(1);

/// Outcome of recording one call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerDecision {
    Allow,
    Trip,
}

#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    count: u32,
    decay_deadline: Option<Instant>,
    decay_threshold: u32,
    trip_threshold: u32,
    decay_interval: Duration,
}

impl CircuitBreaker {
    pub fn new() -> Self {
        Self::with_thresholds(
            DEFAULT_DECAY_THRESHOLD,
            DEFAULT_TRIP_THRESHOLD,
            DEFAULT_DECAY_INTERVAL,
        )
    }

    pub fn with_thresholds(decay_threshold: u32, trip_threshold: u32, decay_interval: Duration) -> Self {
        Self {
            count: 0,
            decay_deadline: None,
            decay_threshold,
            trip_threshold,
            decay_interval,
        }
    }

    /// Count one call made at `now`
    ///
    /// A trip resets the breaker, so a later re-enable starts from zero.
    pub fn record(&mut self, now: Instant) -> BreakerDecision {
        if let Some(deadline) = self.decay_deadline {
            if now >= deadline {
                self.reset();
            }
        }

        self.count = self.count.saturating_add(1);

        if self.count > self.trip_threshold {
            self.reset();
            return BreakerDecision::Trip;
        }

        if self.count > self.decay_threshold && self.decay_deadline.is_none() {
            self.decay_deadline = Some(now + self.decay_interval);
        }

        BreakerDecision::Allow
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.decay_deadline = None;
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn decay_armed(&self) -> bool {
        self.decay_deadline.is_some()
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trips_after_threshold_within_window() {
        let mut breaker = CircuitBreaker::new();
        let now = Instant::now();

        for _ in 0..DEFAULT_TRIP_THRESHOLD {
            assert_eq!(breaker.record(now), BreakerDecision::Allow);
        }
        assert_eq!(breaker.record(now), BreakerDecision::Trip);
        assert_eq!(breaker.count(), 0);
    }

    #[test]
    fn test_decay_arms_above_decay_threshold() {
        let mut breaker = CircuitBreaker::new();
        let now = Instant::now();

        for _ in 0..DEFAULT_DECAY_THRESHOLD {
            breaker.record(now);
        }
        assert!(!breaker.decay_armed());

        breaker.record(now);
        assert!(breaker.decay_armed());
    }

    #[test]
    fn test_counter_resets_after_decay_interval() {
        let mut breaker = CircuitBreaker::with_thresholds(2, 5, Duration::from_millis(100));
        let start = Instant::now();

        for _ in 0..5 {
            assert_eq!(breaker.record(start), BreakerDecision::Allow);
        }

        let later = start + Duration::from_millis(150);
        assert_eq!(breaker.record(later), BreakerDecision::Allow);
        assert_eq!(breaker.count(), 1);
        assert!(!breaker.decay_armed());
    }

    #[test]
    fn test_slow_calls_never_trip() {
        let mut breaker = CircuitBreaker::with_thresholds(2, 5, Duration::from_millis(10));
        let mut now = Instant::now();
        for _ in 0..100 {
            assert_eq!(breaker.record(now), BreakerDecision::Allow);
            now += Duration::from_millis(4);
        }
    }
}
