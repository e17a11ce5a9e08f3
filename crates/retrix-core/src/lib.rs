//! Retry executor: call a fallible operation until it succeeds, fails
//! terminally, exhausts its retry budget or runs out of wall-clock time.
//!
//! ```
//! use std::io;
//! use std::time::Duration;
//! use retrix_core::retry::{FixedWait, Retrier, RetryError};
//!
//! let retrier = Retrier::new(
//!     FixedWait::new([io::ErrorKind::TimedOut])
//!         .with_wait(Duration::from_millis(200))
//!         .with_total_timeout(Duration::from_secs(5)),
//! );
//! let out: Result<u64, RetryError<io::Error>> = retrier.run(|| Ok(42));
//! assert_eq!(out.unwrap(), 42);
//! ```

pub mod config;
pub mod logging;
pub mod retry;
