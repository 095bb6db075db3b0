//! Bounded exponential-backoff policy for provider retries.
//!
//! Delay growth is deterministic and capped; jitter is applied separately at
//! sleep time so the growth curve stays unit-testable.

use std::time::Duration;

use rand::Rng;

/// Tunable parameters for the retry policy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum retries after the first attempt (total attempts = retries + 1).
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on the (pre-jitter) delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
    /// Jitter fraction applied to the capped delay (0.25 = ±25%).
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 4,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(30_000),
            multiplier: 2.0,
            jitter: 0.25,
        }
    }
}

impl RetryPolicy {
    /// The capped, un-jittered delay before retry number `retry` (0-based).
    pub fn base_delay(&self, retry: u32) -> Duration {
        let initial = self.initial_delay.as_millis() as f64;
        let ms = initial * self.multiplier.powi(retry as i32);
        Duration::from_millis(ms as u64).min(self.max_delay)
    }

    /// Apply ±jitter uniformly around `delay` so concurrent jobs do not
    /// retry in lockstep.
    pub fn jittered(&self, delay: Duration) -> Duration {
        if self.jitter <= 0.0 {
            return delay;
        }
        let ms = delay.as_millis() as f64;
        let spread = ms * self.jitter;
        let jittered = rand::rng().random_range(ms - spread..=ms + spread);
        Duration::from_millis(jittered.max(0.0) as u64)
    }
}
