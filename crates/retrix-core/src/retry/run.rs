//! Retry loop: run an operation on a worker thread, raced against the
//! policy's total timeout.

use std::any::Any;
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::classify::Classify;
use super::error::RetryError;
use super::policy::{RetryDecision, RetryPolicy};

/// Executor owning one retry policy.
///
/// Each [`run`](Retrier::run) spawns one worker thread that calls the
/// operation sequentially and consults the policy after every failure. The
/// caller waits at most the policy's total timeout. On timeout the worker is
/// told to stop through an abort token it checks between calls; a call or a
/// pacing sleep already in progress is never interrupted, so the worker may
/// outlive `run` briefly.
///
/// Policy state (attempts, backoff interval) carries over between runs on the
/// same executor. Do not start a run while a previous one's worker may still
/// be active.
pub struct Retrier<P> {
    policy: Arc<Mutex<P>>,
    total_timeout: Duration,
}

impl<P: RetryPolicy> Retrier<P> {
    /// Initialize `policy` (fill defaults, reset attempts) and take ownership.
    pub fn new(mut policy: P) -> Self {
        policy.initialize();
        let total_timeout = policy.total_timeout();
        Self {
            policy: Arc::new(Mutex::new(policy)),
            total_timeout,
        }
    }

    /// Wall-clock budget of each run, fixed when the policy was initialized.
    pub fn total_timeout(&self) -> Duration {
        self.total_timeout
    }

    /// Retries granted so far. Blocks while a worker is inside `decide`.
    pub fn attempts_used(&self) -> u32 {
        lock(&self.policy).attempts_used()
    }

    /// Run `f` with the policy's view of the current state.
    pub fn with_policy<R>(&self, f: impl FnOnce(&P) -> R) -> R {
        f(&lock(&self.policy))
    }
}

impl<P> Retrier<P>
where
    P: RetryPolicy + Send + 'static,
{
    /// Call `operation` until it succeeds, fails terminally, exhausts the
    /// attempt budget, or the total timeout elapses.
    ///
    /// A panic inside `operation` is resumed on the calling thread.
    pub fn run<T, E, F>(&self, mut operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Classify<Kind = P::Kind> + Send + 'static,
    {
        let abort = Arc::new(AtomicBool::new(false));
        // Capacity 1: the single publish never blocks, even after the caller gave up.
        let (tx, rx) = mpsc::sync_channel::<Result<T, RetryError<E>>>(1);

        let worker = {
            let policy = Arc::clone(&self.policy);
            let abort = Arc::clone(&abort);
            std::thread::spawn(move || loop {
                let outcome = operation();
                if abort.load(Ordering::Acquire) {
                    tracing::trace!("retry worker cancelled after total timeout");
                    return;
                }
                let error = match outcome {
                    Ok(value) => {
                        // Exhaustion wins over any result, including success.
                        let published = if lock(&policy).is_exhausted() {
                            tracing::debug!("retry budget exhausted, discarding success");
                            Err(RetryError::RetryCountExhausted)
                        } else {
                            Ok(value)
                        };
                        let _ = tx.send(published);
                        return;
                    }
                    Err(e) => e,
                };
                match lock(&policy).decide(error) {
                    RetryDecision::Retry(_) => continue,
                    RetryDecision::Stop(stop) => {
                        let _ = tx.send(Err(stop));
                        return;
                    }
                }
            })
        };

        match rx.recv_timeout(self.total_timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                abort.store(true, Ordering::Release);
                tracing::warn!(
                    timeout = ?self.total_timeout,
                    "total timeout exceeded, abandoning retry loop"
                );
                Err(RetryError::TotalTimeoutExceeded)
            }
            Err(RecvTimeoutError::Disconnected) => {
                // The sender is only dropped unpublished when the worker panics.
                let payload: Box<dyn Any + Send> = match worker.join() {
                    Err(payload) => payload,
                    Ok(()) => Box::new("retry worker exited without publishing a result"),
                };
                panic::resume_unwind(payload)
            }
        }
    }
}

fn lock<P>(policy: &Mutex<P>) -> MutexGuard<'_, P> {
    policy.lock().unwrap_or_else(PoisonError::into_inner)
}
