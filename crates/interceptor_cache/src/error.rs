use std::time::Duration;

use thiserror::Error;

/// Failures at the boundary of the cache coordinator.
///
/// A miss is not an error: lookups report it as `None`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
    /// The coordinator task is not running (stopped, panicked or dropped).
    #[error("cache unavailable: coordinator is not running")]
    Unavailable,

    /// The set queue was full and the body was not stored.
    #[error("cache overloaded: set queue is full")]
    Overloaded,

    /// No reply arrived within the caller's deadline.
    #[error("cache lookup timed out after {0:?}")]
    TimedOut(Duration),
}

pub type CacheResult<T> = Result<T, CacheError>;
