//! Scripted operations for executor tests.
//!
//! A scripted operation fails with a chosen error for its first N calls and
//! then succeeds, counting every call so tests can assert how often the
//! executor invoked it.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use retrix_core::retry::Classify;

/// Operation error with one retryable-looking and one fatal-looking kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpError {
    /// Transient failure; the payload is the call number that produced it.
    Unavailable(u32),
    /// Permanent failure with a message.
    Rejected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpErrorKind {
    Unavailable,
    Rejected,
}

impl Classify for OpError {
    type Kind = OpErrorKind;

    fn kind(&self) -> OpErrorKind {
        match self {
            OpError::Unavailable(_) => OpErrorKind::Unavailable,
            OpError::Rejected(_) => OpErrorKind::Rejected,
        }
    }
}

/// Shared call counter handed to both the operation and the test.
#[derive(Debug, Clone, Default)]
pub struct Calls(Arc<AtomicU32>);

impl Calls {
    pub fn get(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) -> u32 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Fails with `Unavailable` for the first `failures` calls, then returns
/// `"success"`. Each call first sleeps `call_time`.
pub fn flaky(
    failures: u32,
    call_time: Duration,
) -> (Calls, impl FnMut() -> Result<&'static str, OpError> + Send + 'static) {
    let calls = Calls::default();
    let counter = calls.clone();
    let op = move || {
        let n = counter.bump();
        if !call_time.is_zero() {
            std::thread::sleep(call_time);
        }
        if n > failures {
            Ok("success")
        } else {
            Err(OpError::Unavailable(n))
        }
    };
    (calls, op)
}

/// Always fails with `Unavailable`.
pub fn always_unavailable() -> (Calls, impl FnMut() -> Result<(), OpError> + Send + 'static) {
    let calls = Calls::default();
    let counter = calls.clone();
    let op = move || Err(OpError::Unavailable(counter.bump()));
    (calls, op)
}

/// Fails with `Unavailable` for `failures` calls, then with `Rejected`.
pub fn rejected_after(
    failures: u32,
) -> (Calls, impl FnMut() -> Result<(), OpError> + Send + 'static) {
    let calls = Calls::default();
    let counter = calls.clone();
    let op = move || {
        let n = counter.bump();
        if n > failures {
            Err(OpError::Rejected(format!("call {} rejected", n)))
        } else {
            Err(OpError::Unavailable(n))
        }
    };
    (calls, op)
}
