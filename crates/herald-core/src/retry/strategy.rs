//! The strategy trait consulted by the retry executor between attempts.

use std::error::Error;
use std::time::Duration;

/// A strategy for retrying failed operations with backoff.
///
/// Implementations decide how many attempts are allowed, how long to wait
/// after each failure, and whether a particular error is worth retrying at
/// all. [`RetryPolicy`](super::RetryPolicy) is the stock implementation; wrap
/// it to refine retryability without touching the executor.
///
/// # Examples
///
/// Only retry errors that look transient:
///
/// ```rust
/// use herald_core::retry::{BackoffStrategy, RetryPolicy};
/// use std::error::Error;
/// use std::time::Duration;
///
/// struct NetworkOnly {
///     inner: RetryPolicy,
/// }
///
/// impl BackoffStrategy for NetworkOnly {
///     fn max_attempts(&self) -> u32 {
///         self.inner.max_attempts()
///     }
///
///     fn next_delay(&self, attempt: u32) -> Option<Duration> {
///         self.inner.next_delay(attempt)
///     }
///
///     fn should_retry(&self, error: &dyn Error, _attempt: u32) -> bool {
///         error.to_string().to_lowercase().contains("network")
///     }
/// }
/// ```
pub trait BackoffStrategy: Send + Sync {
    /// Total number of attempts allowed, including the first one.
    ///
    /// Values below 1 are treated as 1 by the executor.
    fn max_attempts(&self) -> u32;

    /// Delay to wait after `attempt` failed attempts (1-indexed).
    ///
    /// Returns `None` when no further attempt should be made.
    fn next_delay(&self, attempt: u32) -> Option<Duration>;

    /// Determine if an error is retryable.
    ///
    /// Default implementation returns `true` for all errors.
    ///
    /// # Parameters
    /// - `error`: The error returned by the last attempt
    /// - `attempt`: Number of attempts made so far (1-indexed)
    fn should_retry(&self, error: &dyn Error, attempt: u32) -> bool {
        let _ = (error, attempt);
        true
    }
}

impl<S: BackoffStrategy + ?Sized> BackoffStrategy for &S {
    fn max_attempts(&self) -> u32 {
        (**self).max_attempts()
    }

    fn next_delay(&self, attempt: u32) -> Option<Duration> {
        (**self).next_delay(attempt)
    }

    fn should_retry(&self, error: &dyn Error, attempt: u32) -> bool {
        (**self).should_retry(error, attempt)
    }
}
