//! Retry policy for session acquisition.
//!
//! Two schedules are evaluated together for every failed attempt:
//!
//! - an exponential schedule (1 unit, doubling) that refuses fatal errors
//!   and is limited to `max_retries` recurrences;
//! - a fixed-interval fallback schedule (1 unit).
//!
//! The wait is the shorter of the two delays. The retry bound and the
//! fatal filter apply to the combination, so a host that keeps failing is
//! attempted `1 + max_retries` times and a fatal error is never retried.

use std::time::Duration;

use crate::error::ConnectionError;

/// Default base delay of the exponential schedule and the fallback interval.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Exponential delay schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentialSchedule {
    pub base: Duration,
    pub factor: u32,
}

impl ExponentialSchedule {
    /// Delay before retry number `attempt` (zero-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base.saturating_mul(self.factor.saturating_pow(attempt))
    }
}

/// Decides whether a failed acquisition is retried, and after how long.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    exponential: ExponentialSchedule,
    max_retries: u32,
    fallback: Duration,
    fatal_markers: Vec<String>,
}

impl RetryPolicy {
    /// Policy with `base` as both the first exponential delay and the
    /// fallback interval.
    pub fn new(base: Duration) -> Self {
        Self {
            exponential: ExponentialSchedule { base, factor: 2 },
            max_retries: DEFAULT_MAX_RETRIES,
            fallback: base,
            fatal_markers: vec!["handshake".to_string(), "account is locked".to_string()],
        }
    }

    /// Policy that never retries.
    pub fn none() -> Self {
        Self::new(DEFAULT_BASE_DELAY).with_max_retries(0)
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_fallback_interval(mut self, interval: Duration) -> Self {
        self.fallback = interval;
        self
    }

    /// Treat errors whose message contains `marker` as fatal.
    pub fn with_fatal_marker(mut self, marker: impl Into<String>) -> Self {
        self.fatal_markers.push(marker.into());
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Whether the exponential schedule's input filter accepts `error`.
    pub fn is_retryable(&self, error: &ConnectionError) -> bool {
        if error.is_fatal() {
            return false;
        }
        let message = error.to_string();
        !self.fatal_markers.iter().any(|m| message.contains(m.as_str()))
    }

    /// The exponential schedule's decision for retry number `attempt`.
    pub fn exponential_delay(&self, error: &ConnectionError, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_retries || !self.is_retryable(error) {
            return None;
        }
        Some(self.exponential.delay(attempt))
    }

    /// The fallback schedule's delay.
    pub fn fallback_delay(&self) -> Duration {
        self.fallback
    }

    /// Delay before retry number `attempt`, or `None` to stop.
    pub fn next_delay(&self, error: &ConnectionError, attempt: u32) -> Option<Duration> {
        self.exponential_delay(error, attempt)
            .map(|delay| delay.min(self.fallback_delay()))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_DELAY)
    }
}

/// Progress through one acquisition sequence.
///
/// Created when acquisition starts and dropped when it resolves.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    attempt: u32,
    last_delay: Option<Duration>,
}

impl RetryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retries taken so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn last_delay(&self) -> Option<Duration> {
        self.last_delay
    }

    /// Record a failure and return the delay before the next attempt.
    pub fn next(&mut self, policy: &RetryPolicy, error: &ConnectionError) -> Option<Duration> {
        let delay = policy.next_delay(error, self.attempt)?;
        self.attempt += 1;
        self.last_delay = Some(delay);
        Some(delay)
    }
}
