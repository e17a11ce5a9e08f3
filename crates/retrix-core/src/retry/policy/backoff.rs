//! Exponential backoff policy: growing, capped pause before each retry.

use std::fmt;
use std::time::Duration;

use super::{Budget, RetryDecision, RetryPolicy};
use crate::retry::Classify;

pub const DEFAULT_INITIAL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(8);
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

/// Sleeps the current interval before granting a retry, then multiplies the
/// interval by `multiplier`, capped at `max_interval`.
///
/// The interval never decreases and never exceeds `max_interval`, even for a
/// multiplier below one or an initial interval above the cap.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff<K> {
    budget: Budget<K>,
    initial_interval: Duration,
    max_interval: Duration,
    multiplier: f64,
    current_interval: Duration,
}

impl<K: Copy + Eq + fmt::Debug> ExponentialBackoff<K> {
    /// Policy retrying errors whose kind is in `retryable`. Unset limits are defaulted on initialize.
    pub fn new(retryable: impl IntoIterator<Item = K>) -> Self {
        Self {
            budget: Budget::new(retryable),
            initial_interval: Duration::ZERO,
            max_interval: Duration::ZERO,
            multiplier: 0.0,
            current_interval: Duration::ZERO,
        }
    }

    /// Wall-clock budget for a whole run (zero means the 30s default).
    pub fn with_total_timeout(mut self, timeout: Duration) -> Self {
        self.budget.set_total_timeout(timeout);
        self
    }

    /// Maximum number of retries granted (zero means the default of 5).
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.budget.set_max_attempts(max_attempts);
        self
    }

    /// First pause (zero means the 1s default).
    pub fn with_initial_interval(mut self, interval: Duration) -> Self {
        self.initial_interval = interval;
        self
    }

    /// Cap on the pause (zero means the 8s default).
    pub fn with_max_interval(mut self, interval: Duration) -> Self {
        self.max_interval = interval;
        self
    }

    /// Growth factor per retry (non-positive or non-finite means 2.0).
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// First pause, after defaults.
    pub fn initial_interval(&self) -> Duration {
        self.initial_interval
    }

    /// Cap on the pause, after defaults.
    pub fn max_interval(&self) -> Duration {
        self.max_interval
    }

    /// Growth factor, after defaults.
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Pause the next granted retry will sleep.
    pub fn current_interval(&self) -> Duration {
        self.current_interval
    }

    fn advance(&mut self) {
        let grown = Duration::try_from_secs_f64(
            self.current_interval.as_secs_f64() * self.multiplier,
        )
        .unwrap_or(self.max_interval);
        self.current_interval = grown.min(self.max_interval).max(self.current_interval);
    }
}

impl<K: Copy + Eq + fmt::Debug> RetryPolicy for ExponentialBackoff<K> {
    type Kind = K;

    fn initialize(&mut self) {
        self.budget.initialize();
        if self.initial_interval.is_zero() {
            self.initial_interval = DEFAULT_INITIAL_INTERVAL;
        }
        if self.max_interval.is_zero() {
            self.max_interval = DEFAULT_MAX_INTERVAL;
        }
        if !(self.multiplier.is_finite() && self.multiplier > 0.0) {
            self.multiplier = DEFAULT_MULTIPLIER;
        }
        self.current_interval = self.initial_interval.min(self.max_interval);
    }

    fn total_timeout(&self) -> Duration {
        self.budget.total_timeout()
    }

    fn max_attempts(&self) -> u32 {
        self.budget.max_attempts()
    }

    fn attempts_used(&self) -> u32 {
        self.budget.attempts()
    }

    fn decide<E>(&mut self, error: E) -> RetryDecision<E>
    where
        E: Classify<Kind = Self::Kind>,
    {
        match self.budget.screen(error) {
            Ok(error) => {
                let delay = self.current_interval;
                std::thread::sleep(delay);
                self.advance();
                self.budget.record_retry(error.kind(), delay);
                RetryDecision::Retry(error)
            }
            Err(stop) => RetryDecision::Stop(stop),
        }
    }
}
