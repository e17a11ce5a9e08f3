//! Count-limited policy: retry immediately until the attempt cap.

use std::fmt;
use std::time::Duration;

use super::{Budget, RetryDecision, RetryPolicy};
use crate::retry::Classify;

/// Retries every retryable error straight away, up to `max_attempts` times.
#[derive(Debug, Clone)]
pub struct CountLimited<K> {
    budget: Budget<K>,
}

impl<K: Copy + Eq + fmt::Debug> CountLimited<K> {
    /// Policy retrying errors whose kind is in `retryable`. Unset limits are defaulted on initialize.
    pub fn new(retryable: impl IntoIterator<Item = K>) -> Self {
        Self {
            budget: Budget::new(retryable),
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
}

impl<K: Copy + Eq + fmt::Debug> RetryPolicy for CountLimited<K> {
    type Kind = K;

    fn initialize(&mut self) {
        self.budget.initialize();
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
                self.budget.record_retry(error.kind(), Duration::ZERO);
                RetryDecision::Retry(error)
            }
            Err(stop) => RetryDecision::Stop(stop),
        }
    }
}
