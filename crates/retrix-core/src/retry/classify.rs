//! Classify operation errors into kinds for retry decisions.
//!
//! Policies never look at error payloads. They compare the kind an error
//! reports against the configured retryable kinds, by value.

use std::fmt;
use std::io;

/// An error that can report which kind of failure it is.
///
/// Two errors with the same kind are treated identically by every policy,
/// whatever data they carry.
pub trait Classify {
    type Kind: Copy + Eq + fmt::Debug;

    fn kind(&self) -> Self::Kind;
}

impl Classify for io::Error {
    type Kind = io::ErrorKind;

    fn kind(&self) -> io::ErrorKind {
        io::Error::kind(self)
    }
}

/// Whether `error`'s kind is one of `retryable`.
pub fn is_retryable<E: Classify>(retryable: &[E::Kind], error: &E) -> bool {
    let kind = error.kind();
    retryable.iter().any(|k| *k == kind)
}
