//! Executes fallible operations under a [`BackoffStrategy`].

use super::strategy::BackoffStrategy;
use crate::error::{RetryError, RetryOutcome};
use crate::time::{Clock, TokioClock};
use std::error::Error;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Diagnostic record of one intermediate failure.
///
/// Emitted after a failed attempt that will be retried, before the executor
/// starts waiting. The terminal failure is never reported here; it is
/// returned to the caller instead.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryEvent {
    /// Attempt that just failed (1-indexed)
    pub attempt: u32,
    /// Total attempts the strategy allows
    pub max_attempts: u32,
    /// Delay before the next attempt
    pub delay: Duration,
    /// Rendered error from the failed attempt
    pub error: String,
}

type RetryObserver = Arc<dyn Fn(&RetryEvent) + Send + Sync>;

/// Runs an operation until it succeeds or the strategy gives up.
///
/// The executor holds no per-call state: each call owns its own attempt
/// counter and delay, so one executor can be shared freely between tasks.
///
/// # Examples
///
/// ```rust
/// use herald_core::retry::{RetryExecutor, RetryPolicy};
/// use herald_core::time::RecordingClock;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let clock = RecordingClock::new();
/// let executor = RetryExecutor::new().with_clock(clock.clone());
/// let policy = RetryPolicy::new(3, Duration::from_secs(1), 2.0);
///
/// let mut calls = 0;
/// let outcome = executor
///     .execute(&policy, || {
///         calls += 1;
///         async { Err::<(), _>(std::io::Error::other("offline")) }
///     })
///     .await;
///
/// assert!(outcome.is_err());
/// assert_eq!(calls, 3);
/// assert_eq!(clock.sleeps(), vec![Duration::from_secs(1), Duration::from_secs(2)]);
/// # }
/// ```
#[derive(Clone)]
pub struct RetryExecutor {
    clock: Arc<dyn Clock>,
    observer: Option<RetryObserver>,
}

impl RetryExecutor {
    /// Create an executor that sleeps on the Tokio timer.
    pub fn new() -> Self {
        Self {
            clock: Arc::new(TokioClock),
            observer: None,
        }
    }

    /// Use `clock` for backoff delays.
    pub fn with_clock(self, clock: impl Clock + 'static) -> Self {
        self.with_shared_clock(Arc::new(clock))
    }

    /// Use an already shared clock for backoff delays.
    pub fn with_shared_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Install a callback invoked for every intermediate failure.
    pub fn on_retry<F>(mut self, observer: F) -> Self
    where
        F: Fn(&RetryEvent) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// Execute an operation with retry logic.
    ///
    /// The operation is called repeatedly until it succeeds, the strategy
    /// declines to retry the error, or the attempt limit is reached. The
    /// success path never waits.
    ///
    /// # Returns
    /// - `Ok(T)`: The successful result
    /// - `Err(RetryError::OperationFailure)`: The error from the final attempt
    pub async fn execute<S, F, Fut, T, E>(&self, strategy: &S, operation: F) -> RetryOutcome<T, E>
    where
        S: BackoffStrategy + ?Sized,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Error + 'static,
    {
        self.run(strategy, None, operation).await
    }

    /// Execute an operation with retry logic, stopping early on cancellation.
    ///
    /// Cancellation is observed before each attempt, while an attempt is in
    /// flight (the attempt future is dropped), and during backoff. Once
    /// cancelled, no further attempt starts and the outcome is
    /// [`RetryError::Cancelled`].
    pub async fn execute_with_cancel<S, F, Fut, T, E>(
        &self,
        strategy: &S,
        cancel: &CancellationToken,
        operation: F,
    ) -> RetryOutcome<T, E>
    where
        S: BackoffStrategy + ?Sized,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Error + 'static,
    {
        self.run(strategy, Some(cancel), operation).await
    }

    /// Execute a synchronous operation with retry logic.
    ///
    /// Backoff delays block the calling thread with `std::thread::sleep`; the
    /// executor's clock is not consulted. Do not call this from inside an
    /// async task.
    pub fn execute_blocking<S, F, T, E>(&self, strategy: &S, mut operation: F) -> RetryOutcome<T, E>
    where
        S: BackoffStrategy + ?Sized,
        F: FnMut() -> Result<T, E>,
        E: Error + 'static,
    {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let error = match operation() {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            match self.plan_retry(strategy, attempts, &error) {
                Some(delay) => std::thread::sleep(delay),
                None => {
                    return Err(RetryError::OperationFailure {
                        attempts,
                        source: error,
                    });
                }
            }
        }
    }

    #[tracing::instrument(
        name = "retry",
        skip_all,
        fields(max_attempts = strategy.max_attempts(), cancellable = cancel.is_some())
    )]
    async fn run<S, F, Fut, T, E>(
        &self,
        strategy: &S,
        cancel: Option<&CancellationToken>,
        mut operation: F,
    ) -> RetryOutcome<T, E>
    where
        S: BackoffStrategy + ?Sized,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Error + 'static,
    {
        let mut attempts = 0;
        loop {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                debug!(attempts, "Retry cancelled before next attempt");
                return Err(RetryError::Cancelled { attempts });
            }

            attempts += 1;
            let result = match cancel {
                Some(token) => tokio::select! {
                    biased;
                    () = token.cancelled() => {
                        debug!(attempts, "Retry cancelled during attempt");
                        return Err(RetryError::Cancelled { attempts });
                    }
                    result = operation() => result,
                },
                None => operation().await,
            };

            let error = match result {
                Ok(value) => {
                    if attempts > 1 {
                        debug!(attempts, "Operation succeeded after retrying");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            let Some(delay) = self.plan_retry(strategy, attempts, &error) else {
                return Err(RetryError::OperationFailure {
                    attempts,
                    source: error,
                });
            };

            match cancel {
                Some(token) => tokio::select! {
                    biased;
                    () = token.cancelled() => {
                        debug!(attempts, "Retry cancelled during backoff");
                        return Err(RetryError::Cancelled { attempts });
                    }
                    () = self.clock.sleep(delay) => {}
                },
                None => self.clock.sleep(delay).await,
            }
        }
    }

    /// Decide whether to retry after `attempts` failures; reports the event if so.
    fn plan_retry<S, E>(&self, strategy: &S, attempts: u32, error: &E) -> Option<Duration>
    where
        S: BackoffStrategy + ?Sized,
        E: Error + 'static,
    {
        let max_attempts = strategy.max_attempts().max(1);

        if attempts >= max_attempts {
            debug!(attempts, %error, "Retry attempts exhausted");
            return None;
        }
        if !strategy.should_retry(error, attempts) {
            debug!(attempts, %error, "Error is not retryable");
            return None;
        }
        let delay = strategy.next_delay(attempts)?;

        warn!(
            attempt = attempts,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            %error,
            "Attempt failed, retrying"
        );

        if let Some(observer) = &self.observer {
            observer(&RetryEvent {
                attempt: attempts,
                max_attempts,
                delay,
                error: error.to_string(),
            });
        }

        Some(delay)
    }
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RetryExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("clock", &self.clock)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RetryPolicy;
    use crate::time::RecordingClock;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use std::io;

    fn recording_executor() -> (RetryExecutor, RecordingClock) {
        let clock = RecordingClock::new();
        (RetryExecutor::new().with_clock(clock.clone()), clock)
    }

    #[tokio::test]
    async fn test_immediate_success() {
        let (executor, clock) = recording_executor();
        let mut calls = 0;

        let result = executor
            .execute(&RetryPolicy::default(), || {
                calls += 1;
                async { Ok::<_, io::Error>(42) }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 1);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_retry_success_on_third_attempt() {
        let (executor, clock) = recording_executor();
        let policy = RetryPolicy::new(5, Duration::from_millis(100), 2.0);
        let mut calls = 0;

        let result = executor
            .execute(&policy, || {
                calls += 1;
                let current = calls;
                async move {
                    if current < 3 {
                        Err(io::Error::other("retry me"))
                    } else {
                        Ok(current)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_millis(100), Duration::from_millis(200)]
        );
    }

    #[tokio::test]
    async fn test_max_attempts_exceeded_returns_last_error() {
        let (executor, clock) = recording_executor();
        let policy = RetryPolicy::new(3, Duration::from_secs(1), 2.0);
        let mut calls = 0;

        let result = executor
            .execute(&policy, || {
                calls += 1;
                let current = calls;
                async move { Err::<(), _>(io::Error::other(format!("failure {current}"))) }
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.attempts(), 3);
        assert_eq!(err.last_error().unwrap().to_string(), "failure 3");
        assert_eq!(calls, 3);
        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[tokio::test]
    async fn test_single_attempt_never_sleeps() {
        let (executor, clock) = recording_executor();
        let mut calls = 0;

        let result = executor
            .execute(&RetryPolicy::no_retry(), || {
                calls += 1;
                async { Err::<(), _>(io::Error::other("nope")) }
            })
            .await;

        assert!(matches!(
            result,
            Err(RetryError::OperationFailure { attempts: 1, .. })
        ));
        assert_eq!(calls, 1);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_custom_retry_predicate() {
        struct NetworkOnly(RetryPolicy);

        impl BackoffStrategy for NetworkOnly {
            fn max_attempts(&self) -> u32 {
                self.0.max_attempts()
            }

            fn next_delay(&self, attempt: u32) -> Option<Duration> {
                self.0.next_delay(attempt)
            }

            fn should_retry(&self, error: &dyn Error, _attempt: u32) -> bool {
                error.to_string().contains("network")
            }
        }

        let (executor, _clock) = recording_executor();
        let strategy = NetworkOnly(RetryPolicy::new(5, Duration::from_millis(1), 2.0));

        // Should NOT retry "auth" errors
        let mut calls = 0;
        let result = executor
            .execute(&strategy, || {
                calls += 1;
                async { Err::<(), _>(io::Error::other("auth failed")) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls, 1);

        // Should retry "network" errors
        let mut calls = 0;
        let result = executor
            .execute(&strategy, || {
                calls += 1;
                let current = calls;
                async move {
                    if current < 3 {
                        Err(io::Error::other("network error"))
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_observer_sees_intermediate_failures_only() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let executor = RetryExecutor::new()
            .with_clock(RecordingClock::new())
            .on_retry(move |event| sink.lock().push(event.clone()));
        let policy = RetryPolicy::new(3, Duration::from_secs(1), 2.0);

        let _ = executor
            .execute(&policy, || async {
                Err::<(), _>(io::Error::other("flaky"))
            })
            .await;

        let events = events.lock();
        assert_eq!(
            *events,
            vec![
                RetryEvent {
                    attempt: 1,
                    max_attempts: 3,
                    delay: Duration::from_secs(1),
                    error: "flaky".to_string(),
                },
                RetryEvent {
                    attempt: 2,
                    max_attempts: 3,
                    delay: Duration::from_secs(2),
                    error: "flaky".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_cancelled_before_first_attempt() {
        let (executor, _clock) = recording_executor();
        let token = CancellationToken::new();
        token.cancel();
        let mut calls = 0;

        let result = executor
            .execute_with_cancel(&RetryPolicy::default(), &token, || {
                calls += 1;
                async { Ok::<_, io::Error>(()) }
            })
            .await;

        assert!(matches!(result, Err(RetryError::Cancelled { attempts: 0 })));
        assert_eq!(calls, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_during_backoff_stops_attempts() {
        let executor = RetryExecutor::new();
        let policy = RetryPolicy::new(5, Duration::from_secs(10), 2.0);
        let token = CancellationToken::new();
        let canceller = token.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            canceller.cancel();
        });

        let mut calls = 0;
        let result = executor
            .execute_with_cancel(&policy, &token, || {
                calls += 1;
                async { Err::<(), _>(io::Error::other("down")) }
            })
            .await;

        let err = result.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(err.attempts(), 1);
        assert_eq!(calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_during_attempt() {
        let executor = RetryExecutor::new();
        let token = CancellationToken::new();
        let canceller = token.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            canceller.cancel();
        });

        let result = executor
            .execute_with_cancel(&RetryPolicy::default(), &token, || async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, io::Error>("too late")
            })
            .await;

        assert_eq!(result.unwrap_err().attempts(), 1);
    }

    #[tokio::test]
    async fn test_uncancelled_token_behaves_like_execute() {
        let (executor, clock) = recording_executor();
        let token = CancellationToken::new();
        let policy = RetryPolicy::new(2, Duration::from_millis(500), 2.0);

        let result = executor
            .execute_with_cancel(&policy, &token, || async {
                Err::<(), _>(io::Error::other("still down"))
            })
            .await;

        assert!(matches!(
            result,
            Err(RetryError::OperationFailure { attempts: 2, .. })
        ));
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(500)]);
    }

    #[test]
    fn test_blocking_retry_succeeds_after_failures() {
        let executor = RetryExecutor::new();
        let policy = RetryPolicy::new(4, Duration::from_millis(1), 2.0);
        let mut calls = 0;

        let result = executor.execute_blocking(&policy, || {
            calls += 1;
            if calls < 3 {
                Err(io::Error::other("busy"))
            } else {
                Ok(calls)
            }
        });

        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn test_blocking_retry_exhausts_attempts() {
        let executor = RetryExecutor::new();
        let policy = RetryPolicy::new(2, Duration::ZERO, 1.0);
        let mut calls = 0;

        let result = executor.execute_blocking(&policy, || {
            calls += 1;
            Err::<(), _>(io::Error::other("busy"))
        });

        assert_eq!(result.unwrap_err().attempts(), 2);
        assert_eq!(calls, 2);
    }
}
