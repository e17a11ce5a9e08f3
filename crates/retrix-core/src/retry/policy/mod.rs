//! Retry policies: per-error decisions with attempt bookkeeping and pacing.
//!
//! All variants share the same budget rules (total timeout, attempt cap,
//! retryable kinds) and differ only in how they pace a retry:
//! [`CountLimited`] retries immediately, [`FixedWait`] sleeps a constant
//! duration and [`ExponentialBackoff`] sleeps a growing, capped interval.

mod backoff;
mod count;
mod fixed;

pub use backoff::ExponentialBackoff;
pub use count::CountLimited;
pub use fixed::FixedWait;

use std::fmt;
use std::time::Duration;

use super::classify::{self, Classify};
use super::error::RetryError;

/// Total timeout applied when none (or zero) is configured.
pub const DEFAULT_TOTAL_TIMEOUT: Duration = Duration::from_secs(30);
/// Attempt cap applied when none (or zero) is configured.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Decision returned by a retry policy for one failed call.
#[derive(Debug)]
pub enum RetryDecision<E> {
    /// Call the operation again. Any pacing has already happened.
    Retry(E),
    /// Stop and report this outcome.
    Stop(RetryError<E>),
}

impl<E> RetryDecision<E> {
    /// True for [`RetryDecision::Retry`].
    pub fn should_retry(&self) -> bool {
        matches!(self, RetryDecision::Retry(_))
    }
}

/// A stateful retry decision function.
///
/// A policy is owned by exactly one executor. `decide` may block the calling
/// thread while it paces the next attempt.
pub trait RetryPolicy {
    type Kind: Copy + Eq + fmt::Debug;

    /// Fill unset (zero) configuration with defaults and reset attempt state.
    fn initialize(&mut self);

    /// Wall-clock budget for a whole run.
    fn total_timeout(&self) -> Duration;

    /// Maximum number of retries granted.
    fn max_attempts(&self) -> u32;

    /// Retries granted so far.
    fn attempts_used(&self) -> u32;

    /// Whether the attempt budget is spent. Once true, every further result,
    /// successful or not, ends the run with [`RetryError::RetryCountExhausted`].
    fn is_exhausted(&self) -> bool {
        self.attempts_used() >= self.max_attempts()
    }

    /// Decide whether the operation should run again after `error`.
    ///
    /// Exhaustion is checked before classification: once the budget is
    /// spent every error yields [`RetryError::RetryCountExhausted`].
    fn decide<E>(&mut self, error: E) -> RetryDecision<E>
    where
        E: Classify<Kind = Self::Kind>;
}

/// Configuration and attempt counter shared by every policy variant.
#[derive(Debug, Clone)]
pub(crate) struct Budget<K> {
    total_timeout: Duration,
    max_attempts: u32,
    retryable: Vec<K>,
    attempts: u32,
}

impl<K: Copy + Eq + fmt::Debug> Budget<K> {
    pub(crate) fn new(retryable: impl IntoIterator<Item = K>) -> Self {
        Self {
            total_timeout: Duration::ZERO,
            max_attempts: 0,
            retryable: retryable.into_iter().collect(),
            attempts: 0,
        }
    }

    pub(crate) fn set_total_timeout(&mut self, timeout: Duration) {
        self.total_timeout = timeout;
    }

    pub(crate) fn set_max_attempts(&mut self, max_attempts: u32) {
        self.max_attempts = max_attempts;
    }

    pub(crate) fn initialize(&mut self) {
        if self.total_timeout.is_zero() {
            self.total_timeout = DEFAULT_TOTAL_TIMEOUT;
        }
        if self.max_attempts == 0 {
            self.max_attempts = DEFAULT_MAX_ATTEMPTS;
        }
        self.attempts = 0;
    }

    pub(crate) fn total_timeout(&self) -> Duration {
        self.total_timeout
    }

    pub(crate) fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Apply the exhaustion check and the kind match. Hands the error back
    /// when it may be retried, otherwise the outcome to stop with.
    pub(crate) fn screen<E>(&self, error: E) -> Result<E, RetryError<E>>
    where
        E: Classify<Kind = K>,
    {
        if self.attempts >= self.max_attempts {
            tracing::debug!(
                attempts = self.attempts,
                max_attempts = self.max_attempts,
                "retry budget exhausted"
            );
            return Err(RetryError::RetryCountExhausted);
        }
        if !classify::is_retryable(&self.retryable, &error) {
            tracing::debug!(kind = ?error.kind(), "terminal error, not retrying");
            return Err(RetryError::Operation(error));
        }
        Ok(error)
    }

    /// Count a granted retry.
    pub(crate) fn record_retry(&mut self, kind: K, delay: Duration) {
        self.attempts += 1;
        tracing::debug!(
            attempt = self.attempts,
            max_attempts = self.max_attempts,
            ?kind,
            ?delay,
            "retrying after retryable error"
        );
    }
}

/// Any of the built-in policies, chosen at runtime (e.g. from config).
#[derive(Debug, Clone)]
pub enum AnyPolicy<K> {
    Count(CountLimited<K>),
    Fixed(FixedWait<K>),
    Backoff(ExponentialBackoff<K>),
}

impl<K> From<CountLimited<K>> for AnyPolicy<K> {
    fn from(p: CountLimited<K>) -> Self {
        AnyPolicy::Count(p)
    }
}

impl<K> From<FixedWait<K>> for AnyPolicy<K> {
    fn from(p: FixedWait<K>) -> Self {
        AnyPolicy::Fixed(p)
    }
}

impl<K> From<ExponentialBackoff<K>> for AnyPolicy<K> {
    fn from(p: ExponentialBackoff<K>) -> Self {
        AnyPolicy::Backoff(p)
    }
}

impl<K: Copy + Eq + fmt::Debug> RetryPolicy for AnyPolicy<K> {
    type Kind = K;

    fn initialize(&mut self) {
        match self {
            AnyPolicy::Count(p) => p.initialize(),
            AnyPolicy::Fixed(p) => p.initialize(),
            AnyPolicy::Backoff(p) => p.initialize(),
        }
    }

    fn total_timeout(&self) -> Duration {
        match self {
            AnyPolicy::Count(p) => p.total_timeout(),
            AnyPolicy::Fixed(p) => p.total_timeout(),
            AnyPolicy::Backoff(p) => p.total_timeout(),
        }
    }

    fn max_attempts(&self) -> u32 {
        match self {
            AnyPolicy::Count(p) => p.max_attempts(),
            AnyPolicy::Fixed(p) => p.max_attempts(),
            AnyPolicy::Backoff(p) => p.max_attempts(),
        }
    }

    fn attempts_used(&self) -> u32 {
        match self {
            AnyPolicy::Count(p) => p.attempts_used(),
            AnyPolicy::Fixed(p) => p.attempts_used(),
            AnyPolicy::Backoff(p) => p.attempts_used(),
        }
    }

    fn is_exhausted(&self) -> bool {
        match self {
            AnyPolicy::Count(p) => p.is_exhausted(),
            AnyPolicy::Fixed(p) => p.is_exhausted(),
            AnyPolicy::Backoff(p) => p.is_exhausted(),
        }
    }

    fn decide<E>(&mut self, error: E) -> RetryDecision<E>
    where
        E: Classify<Kind = Self::Kind>,
    {
        match self {
            AnyPolicy::Count(p) => p.decide(error),
            AnyPolicy::Fixed(p) => p.decide(error),
            AnyPolicy::Backoff(p) => p.decide(error),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{TestError, TestKind};
    use super::*;

    #[test]
    fn budget_defaults_fill_only_unset_fields() {
        let mut b = Budget::new([TestKind::Flaky]);
        b.initialize();
        assert_eq!(b.total_timeout(), DEFAULT_TOTAL_TIMEOUT);
        assert_eq!(b.max_attempts(), DEFAULT_MAX_ATTEMPTS);

        let mut b = Budget::new([TestKind::Flaky]);
        b.set_total_timeout(Duration::from_secs(3));
        b.set_max_attempts(9);
        b.initialize();
        assert_eq!(b.total_timeout(), Duration::from_secs(3));
        assert_eq!(b.max_attempts(), 9);
    }

    #[test]
    fn screen_checks_exhaustion_before_kind() {
        let mut b = Budget::new([TestKind::Flaky]);
        b.set_max_attempts(1);
        b.initialize();
        assert!(b.screen(TestError::Flaky(0)).is_ok());
        b.record_retry(TestKind::Flaky, Duration::ZERO);
        assert!(matches!(
            b.screen(TestError::Fatal),
            Err(RetryError::RetryCountExhausted)
        ));
    }

    #[test]
    fn any_policy_delegates() {
        let mut p: AnyPolicy<TestKind> = CountLimited::new([TestKind::Flaky])
            .with_max_attempts(2)
            .into();
        p.initialize();
        assert!(p.decide(TestError::Flaky(1)).should_retry());
        assert_eq!(p.attempts_used(), 1);
        match p.decide(TestError::Fatal) {
            RetryDecision::Stop(RetryError::Operation(e)) => assert_eq!(e, TestError::Fatal),
            other => panic!("expected terminal stop, got {:?}", other),
        }
    }

    #[test]
    fn is_exhausted_tracks_budget() {
        let mut p = CountLimited::new([TestKind::Flaky]).with_max_attempts(2);
        p.initialize();
        assert!(!p.is_exhausted());
        assert!(p.decide(TestError::Flaky(1)).should_retry());
        assert!(!p.is_exhausted());
        assert!(p.decide(TestError::Flaky(2)).should_retry());
        assert!(p.is_exhausted());
        p.initialize();
        assert!(!p.is_exhausted());
    }
}
