//! Terminal errors produced by the retry executor.

use thiserror::Error;

/// Result of a retried operation: the success value, or the terminal error.
pub type RetryOutcome<T, E> = std::result::Result<T, RetryError<E>>;

/// Why a retried operation did not produce a value.
///
/// Intermediate failures are never surfaced here; only the error from the
/// final attempt is carried by [`RetryError::OperationFailure`].
#[derive(Debug, Error, PartialEq)]
pub enum RetryError<E> {
    /// Every permitted attempt failed (or the strategy declined to retry).
    #[error("operation failed after {attempts} attempt(s): {source}")]
    OperationFailure {
        /// Number of attempts made, including the first
        attempts: u32,
        /// Error returned by the last attempt
        #[source]
        source: E,
    },

    /// The retry was cancelled before it completed.
    #[error("retry cancelled after {attempts} attempt(s)")]
    Cancelled {
        /// Number of attempts that had started before cancellation
        attempts: u32,
    },
}

impl<E> RetryError<E> {
    /// Number of attempts made before the executor gave up.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::OperationFailure { attempts, .. } | Self::Cancelled { attempts } => *attempts,
        }
    }

    /// Whether this error came from cancellation rather than a failed operation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Borrow the last operation error, if the retry ended in failure.
    pub fn last_error(&self) -> Option<&E> {
        match self {
            Self::OperationFailure { source, .. } => Some(source),
            Self::Cancelled { .. } => None,
        }
    }

    /// Take ownership of the last operation error, if any.
    pub fn into_last_error(self) -> Option<E> {
        match self {
            Self::OperationFailure { source, .. } => Some(source),
            Self::Cancelled { .. } => None,
        }
    }
}
