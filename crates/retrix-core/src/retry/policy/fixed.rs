//! Fixed-wait policy: constant pause before each retry.

use std::fmt;
use std::time::Duration;

use super::{Budget, RetryDecision, RetryPolicy};
use crate::retry::Classify;

/// Sleeps `wait` before granting each retry. A zero wait never sleeps.
#[derive(Debug, Clone)]
pub struct FixedWait<K> {
    budget: Budget<K>,
    wait: Duration,
}

impl<K: Copy + Eq + fmt::Debug> FixedWait<K> {
    /// Policy retrying errors whose kind is in `retryable`. Unset limits are defaulted on initialize.
    pub fn new(retryable: impl IntoIterator<Item = K>) -> Self {
        Self {
            budget: Budget::new(retryable),
            wait: Duration::ZERO,
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

    /// Pause before each retry (zero means no sleep).
    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    /// Configured pause before each retry.
    pub fn wait(&self) -> Duration {
        self.wait
    }
}

impl<K: Copy + Eq + fmt::Debug> RetryPolicy for FixedWait<K> {
    type Kind = K;

    fn initialize(&mut self) {
        // An unset wait stays zero.
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
                if !self.wait.is_zero() {
                    std::thread::sleep(self.wait);
                }
                self.budget.record_retry(error.kind(), self.wait);
                RetryDecision::Retry(error)
            }
            Err(stop) => RetryDecision::Stop(stop),
        }
    }
}
