//! Retry executor with pluggable policies.
//!
//! This module encapsulates error classification (by kind), per-error retry
//! decisions with pacing, and the timeout-bounded loop that drives them, so
//! callers only supply the operation and a policy.

mod classify;
mod error;
pub mod policy;
mod run;

pub use classify::{is_retryable, Classify};
pub use error::RetryError;
pub use policy::{
    AnyPolicy, CountLimited, ExponentialBackoff, FixedWait, RetryDecision, RetryPolicy,
};
pub use run::Retrier;
