//! Clock abstraction used for backoff delays and expiry timers.
//!
//! Production code sleeps on the Tokio timer through [`TokioClock`]. Tests can
//! swap in [`RecordingClock`], which remembers every requested delay and
//! returns immediately, or run [`TokioClock`] under a paused Tokio runtime.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Source of suspension for time-driven components.
#[async_trait]
pub trait Clock: Send + Sync + fmt::Debug {
    /// Suspend the caller for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Clock backed by `tokio::time`.
///
/// Honors `tokio::time::pause()`, so paused-runtime tests advance it
/// deterministically.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Clock that records requested sleeps instead of waiting.
///
/// Each call yields to the scheduler once so that concurrently pending work
/// (such as a cancellation) gets a chance to run.
///
/// # Examples
///
/// ```rust
/// use herald_core::time::{Clock, RecordingClock};
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let clock = RecordingClock::new();
/// clock.sleep(Duration::from_secs(5)).await;
/// assert_eq!(clock.sleeps(), vec![Duration::from_secs(5)]);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingClock {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingClock {
    /// Create an empty recording clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delay requested so far, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().clone()
    }

    /// Sum of all requested delays.
    pub fn total(&self) -> Duration {
        self.sleeps.lock().iter().sum()
    }

    /// Forget recorded delays.
    pub fn clear(&self) {
        self.sleeps.lock().clear();
    }
}

#[async_trait]
impl Clock for RecordingClock {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().push(duration);
        tokio::task::yield_now().await;
    }
}

/// Convert fractional seconds into a [`Duration`], saturating instead of panicking.
///
/// Negative and NaN inputs become zero; values too large for a `Duration`
/// (including positive infinity) become [`Duration::MAX`].
pub fn saturating_duration_from_secs(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_clock_records_in_order() {
        let clock = RecordingClock::new();

        clock.sleep(Duration::from_millis(100)).await;
        clock.sleep(Duration::from_millis(200)).await;

        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_millis(100), Duration::from_millis(200)]
        );
        assert_eq!(clock.total(), Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_recording_clock_clones_share_history() {
        let clock = RecordingClock::new();
        let observer = clock.clone();

        clock.sleep(Duration::from_secs(1)).await;
        assert_eq!(observer.sleeps().len(), 1);

        observer.clear();
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn test_saturating_duration_from_secs() {
        assert_eq!(saturating_duration_from_secs(1.5), Duration::from_millis(1500));
        assert_eq!(saturating_duration_from_secs(-2.0), Duration::ZERO);
        assert_eq!(saturating_duration_from_secs(f64::NAN), Duration::ZERO);
        assert_eq!(saturating_duration_from_secs(f64::INFINITY), Duration::MAX);
        assert_eq!(saturating_duration_from_secs(1e300), Duration::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_clock_advances_paused_time() {
        let start = tokio::time::Instant::now();

        TokioClock.sleep(Duration::from_secs(3)).await;

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(3));
        assert!(elapsed < Duration::from_millis(3_010));
    }
}
