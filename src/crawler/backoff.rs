//! Exponential backoff schedule for retrying fetches
//!
//! The schedule starts at the configured initial interval and grows
//! geometrically up to the maximum interval. Once the total time spent on a
//! target would exceed the configured budget, the schedule stops.
//!
//! A server-supplied rate-limit wait takes the place of the computed delay
//! for that one retry and resets the schedule, so a server that keeps asking
//! us to slow down does not also push the exponential delay up.

use crate::config::RetryConfig;
use std::time::{Duration, Instant};

/// Backoff state for the retries of a single target
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial_interval: Duration,
    max_interval: Duration,
    multiplier: f64,
    max_elapsed: Duration,
    current_interval: Duration,
    started: Instant,
}

impl ExponentialBackoff {
    /// Creates a fresh schedule; the elapsed-time budget starts now
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            initial_interval: config.initial_interval(),
            max_interval: config.max_interval(),
            multiplier: config.multiplier,
            max_elapsed: config.max_elapsed(),
            current_interval: config.initial_interval(),
            started: Instant::now(),
        }
    }

    /// Returns the delay before the next retry, or `None` once the budget is spent
    pub fn next_delay(&mut self) -> Option<Duration> {
        let delay = self.current_interval;
        if !self.within_budget(delay) {
            return None;
        }

        let grown = self.current_interval.as_nanos() as f64 * self.multiplier;
        self.current_interval = if grown >= self.max_interval.as_nanos() as f64 {
            self.max_interval
        } else {
            Duration::from_nanos(grown as u64)
        };

        Some(delay)
    }

    /// Schedules a server-requested wait in place of the computed delay
    ///
    /// The schedule is reset afterward, so the next transient failure waits
    /// the initial interval again.
    pub fn rate_limited(&mut self, wait: Duration) -> Option<Duration> {
        if !self.within_budget(wait) {
            return None;
        }

        self.reset();
        Some(wait)
    }

    /// Returns the interval schedule to its starting point
    pub fn reset(&mut self) {
        self.current_interval = self.initial_interval;
    }

    /// Time spent on this target so far
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn within_budget(&self, delay: Duration) -> bool {
        self.elapsed() + delay <= self.max_elapsed
    }
}
