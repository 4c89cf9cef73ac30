//! Pairing a retry policy with a notification dispatcher
//!
//! The executor and the dispatcher know nothing about each other. [`Herald`]
//! holds one of each and provides the usual glue: retry an operation and,
//! if it ultimately fails, tell the user with an error notification.

use crate::config::HeraldConfig;
use herald_core::{RetryError, RetryExecutor, RetryOutcome, RetryPolicy};
use herald_notify::{NotificationDispatcher, NotificationId};
use std::error::Error;
use tracing::debug;

/// Shared retry policy, executor and dispatcher.
///
/// Cheap to clone; clones share the dispatcher queue.
///
/// # Examples
///
/// ```rust
/// use herald::{Herald, HeraldConfig};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let herald = Herald::new(HeraldConfig::default());
///
/// let saved = herald
///     .retry_or_notify("Could not save progress", || async { Ok::<_, std::io::Error>(7) })
///     .await;
///
/// assert_eq!(saved.ok(), Some(7));
/// assert!(herald.dispatcher().active().is_none());
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Herald {
    policy: RetryPolicy,
    executor: RetryExecutor,
    dispatcher: NotificationDispatcher,
}

impl Herald {
    /// Build from configuration with the Tokio clock and no haptics.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn new(config: HeraldConfig) -> Self {
        let dispatcher = NotificationDispatcher::builder()
            .defaults(config.notifications)
            .build();
        Self::from_parts(config.retry, RetryExecutor::new(), dispatcher)
    }

    /// Assemble from preconfigured parts, e.g. with a custom clock or haptics.
    pub fn from_parts(
        policy: RetryPolicy,
        executor: RetryExecutor,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            policy,
            executor,
            dispatcher,
        }
    }

    /// Policy used by [`retry`](Self::retry) and [`retry_or_notify`](Self::retry_or_notify).
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// The retry executor.
    pub fn executor(&self) -> &RetryExecutor {
        &self.executor
    }

    /// The notification dispatcher.
    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    /// Retry `operation` under the configured policy.
    pub async fn retry<F, Fut, T, E>(&self, operation: F) -> RetryOutcome<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Error + 'static,
    {
        self.executor.execute(&self.policy, operation).await
    }

    /// Retry `operation`; on terminal failure show `message` as an error
    /// notification.
    ///
    /// Cancellation is not reported, since it is not a failure the user
    /// needs to hear about. The outcome is returned unchanged either way.
    pub async fn retry_or_notify<F, Fut, T, E>(
        &self,
        message: impl Into<String>,
        operation: F,
    ) -> RetryOutcome<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Error + 'static,
    {
        let outcome = self.retry(operation).await;
        if let Err(err) = &outcome {
            self.report(err, message);
        }
        outcome
    }

    /// Show `message` as an error notification if `err` is a failure.
    ///
    /// Returns the id of the queued notification, or `None` for a
    /// cancellation.
    pub fn report<E>(&self, err: &RetryError<E>, message: impl Into<String>) -> Option<NotificationId>
    where
        E: Error,
    {
        match err {
            RetryError::Cancelled { attempts } => {
                debug!(attempts, "Retry cancelled, not notifying");
                None
            }
            RetryError::OperationFailure { attempts, source } => {
                debug!(attempts, error = %source, "Reporting terminal retry failure");
                Some(self.dispatcher.show_error(message))
            }
        }
    }
}
