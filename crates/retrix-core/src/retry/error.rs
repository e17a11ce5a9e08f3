//! Outcome errors returned by the retry executor.

use thiserror::Error;

/// Why a retried operation did not produce a value.
///
/// Every run ends in exactly one of these (or in the operation's success
/// value). The two sentinels carry no payload: on exhaustion the last
/// retryable error is discarded.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// The operation failed with an error whose kind is not retryable.
    #[error(transparent)]
    Operation(E),
    /// The policy's attempt budget was spent before the operation succeeded.
    #[error("retry count exhausted")]
    RetryCountExhausted,
    /// The total wall-clock budget elapsed before a result was published.
    #[error("total timeout exceeded")]
    TotalTimeoutExceeded,
}

impl<E> RetryError<E> {
    /// True when the total wall-clock budget ran out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, RetryError::TotalTimeoutExceeded)
    }

    /// True when the attempt budget was spent.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::RetryCountExhausted)
    }

    /// The terminal operation error, if this outcome carries one.
    pub fn into_operation_error(self) -> Option<E> {
        match self {
            RetryError::Operation(e) => Some(e),
            RetryError::RetryCountExhausted | RetryError::TotalTimeoutExceeded => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn sentinels_display() {
        let e: RetryError<io::Error> = RetryError::RetryCountExhausted;
        assert_eq!(e.to_string(), "retry count exhausted");
        let e: RetryError<io::Error> = RetryError::TotalTimeoutExceeded;
        assert_eq!(e.to_string(), "total timeout exceeded");
    }

    #[test]
    fn operation_error_is_transparent() {
        let inner = io::Error::new(io::ErrorKind::PermissionDenied, "no access");
        let e = RetryError::Operation(inner);
        assert_eq!(e.to_string(), "no access");
        assert!(!e.is_timeout());
        assert!(!e.is_exhausted());
        let back = e.into_operation_error().unwrap();
        assert_eq!(back.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn sentinels_have_no_operation_error() {
        let e: RetryError<io::Error> = RetryError::TotalTimeoutExceeded;
        assert!(e.is_timeout());
        assert!(e.source().is_none());
        assert!(e.into_operation_error().is_none());
    }
}
