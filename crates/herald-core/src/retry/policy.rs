//! Exponential backoff policy.

use super::strategy::BackoffStrategy;
use crate::time::saturating_duration_from_secs;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Exponential backoff policy: how many attempts, and how long to wait between them.
///
/// Delays grow geometrically: the wait after failed attempt `k` (1-indexed) is
/// `initial_delay * multiplier^(k-1)`. There is no jitter and, unless
/// [`max_delay`](RetryPolicyBuilder::max_delay) is set, no ceiling. Callers
/// choosing large multipliers or attempt counts should set a cap.
///
/// # Mathematical Formula
///
/// ```text
/// base_delay(k)  = initial_delay * (multiplier ^ (k - 1))
/// final_delay(k) = min(base_delay(k), max_delay)   // only when max_delay is set
/// ```
///
/// # Examples
///
/// ```rust
/// use herald_core::retry::RetryPolicy;
/// use std::time::Duration;
///
/// // Default configuration (max_attempts=3, initial=1s, multiplier=2.0, no cap)
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.delays().collect::<Vec<_>>(), vec![
///     Duration::from_secs(1),
///     Duration::from_secs(2),
/// ]);
///
/// // Custom configuration
/// let policy = RetryPolicy::builder()
///     .max_attempts(5)
///     .initial_delay(Duration::from_millis(250))
///     .multiplier(1.5)
///     .max_delay(Duration::from_secs(2))
///     .build();
/// assert_eq!(policy.max_attempts(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RetryPolicyRepr", into = "RetryPolicyRepr")]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    multiplier: f64,
    max_delay: Option<Duration>,
}

impl RetryPolicy {
    /// Attempts used by [`RetryPolicy::default`].
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    /// Initial delay used by [`RetryPolicy::default`].
    pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);
    /// Multiplier used by [`RetryPolicy::default`].
    pub const DEFAULT_MULTIPLIER: f64 = 2.0;

    /// Create a policy from its three defining parameters.
    ///
    /// Out-of-range values are clamped the same way the builder clamps them.
    pub fn new(max_attempts: u32, initial_delay: Duration, multiplier: f64) -> Self {
        Self::builder()
            .max_attempts(max_attempts)
            .initial_delay(initial_delay)
            .multiplier(multiplier)
            .build()
    }

    /// Policy that performs exactly one attempt and never waits.
    pub fn no_retry() -> Self {
        Self::builder().max_attempts(1).build()
    }

    /// Create a new builder for configuring a policy.
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::default()
    }

    /// Builder pre-filled with this policy's settings, for layered overrides.
    pub fn to_builder(&self) -> RetryPolicyBuilder {
        RetryPolicyBuilder {
            max_attempts: Some(self.max_attempts),
            initial_delay: Some(self.initial_delay),
            multiplier: Some(self.multiplier),
            max_delay: self.max_delay,
        }
    }

    /// Total number of attempts, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay after the first failed attempt.
    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Growth factor applied after each failed attempt.
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Optional ceiling on a single delay.
    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay
    }

    /// Delay inserted after failed attempt `attempt` (1-indexed).
    ///
    /// `attempt == 0` is treated as `1`. The result saturates at
    /// [`Duration::MAX`] instead of overflowing.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let delay = saturating_duration_from_secs(secs);

        match self.max_delay {
            Some(cap) => delay.min(cap),
            None => delay,
        }
    }

    /// The full sequence of inter-attempt delays (`max_attempts - 1` entries).
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (1..self.max_attempts).map(|attempt| self.delay_for_attempt(attempt))
    }

    /// Sum of every delay an always-failing operation would incur.
    pub fn total_delay(&self) -> Duration {
        self.delays()
            .fold(Duration::ZERO, |total, delay| total.saturating_add(delay))
    }
}

impl Default for RetryPolicy {
    /// Create a policy with the defaults used across the apps.
    ///
    /// Defaults:
    /// - `max_attempts`: 3
    /// - `initial_delay`: 1s
    /// - `multiplier`: 2.0 (doubles each time)
    /// - `max_delay`: none
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            initial_delay: Self::DEFAULT_INITIAL_DELAY,
            multiplier: Self::DEFAULT_MULTIPLIER,
            max_delay: None,
        }
    }
}

impl BackoffStrategy for RetryPolicy {
    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn next_delay(&self, attempt: u32) -> Option<Duration> {
        (attempt < self.max_attempts).then(|| self.delay_for_attempt(attempt))
    }
}

/// Builder for configuring [`RetryPolicy`].
///
/// Unset parameters fall back to the [`RetryPolicy::default`] values.
///
/// # Examples
///
/// ```rust
/// use herald_core::retry::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::builder()
///     .max_attempts(4)
///     .initial_delay(Duration::from_millis(500))
///     .multiplier(3.0)
///     .build();
///
/// assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(4500));
/// ```
#[derive(Debug, Default)]
pub struct RetryPolicyBuilder {
    max_attempts: Option<u32>,
    initial_delay: Option<Duration>,
    multiplier: Option<f64>,
    max_delay: Option<Duration>,
}

impl RetryPolicyBuilder {
    /// Set the total number of attempts, including the first.
    ///
    /// Values below 1 are raised to 1. Default: 3
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts.max(1));
        self
    }

    /// Set the delay after the first failed attempt.
    ///
    /// Default: 1s
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = Some(delay);
        self
    }

    /// Set the exponential multiplier.
    ///
    /// Values below 1.0 and non-finite values are replaced with 1.0 (constant
    /// backoff). Default: 2.0
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = Some(if multiplier.is_finite() {
            multiplier.max(1.0)
        } else {
            1.0
        });
        self
    }

    /// Cap every individual delay at `delay`.
    ///
    /// Default: uncapped
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = Some(delay);
        self
    }

    /// Build the `RetryPolicy` instance.
    pub fn build(self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self
                .max_attempts
                .unwrap_or(RetryPolicy::DEFAULT_MAX_ATTEMPTS),
            initial_delay: self
                .initial_delay
                .unwrap_or(RetryPolicy::DEFAULT_INITIAL_DELAY),
            multiplier: self.multiplier.unwrap_or(RetryPolicy::DEFAULT_MULTIPLIER),
            max_delay: self.max_delay,
        }
    }
}

/// Serialized form: durations as fractional seconds, clamped on the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RetryPolicyRepr {
    max_attempts: u32,
    initial_delay_secs: f64,
    multiplier: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_delay_secs: Option<f64>,
}

impl Default for RetryPolicyRepr {
    fn default() -> Self {
        RetryPolicy::default().into()
    }
}

impl From<RetryPolicyRepr> for RetryPolicy {
    fn from(repr: RetryPolicyRepr) -> Self {
        let builder = RetryPolicy::builder()
            .max_attempts(repr.max_attempts)
            .initial_delay(saturating_duration_from_secs(repr.initial_delay_secs))
            .multiplier(repr.multiplier);

        let builder = match repr.max_delay_secs {
            Some(secs) => builder.max_delay(saturating_duration_from_secs(secs)),
            None => builder,
        };
        builder.build()
    }
}

impl From<RetryPolicy> for RetryPolicyRepr {
    fn from(policy: RetryPolicy) -> Self {
        Self {
            max_attempts: policy.max_attempts,
            initial_delay_secs: policy.initial_delay.as_secs_f64(),
            multiplier: policy.multiplier,
            max_delay_secs: policy.max_delay.map(|d| d.as_secs_f64()),
        }
    }
}
