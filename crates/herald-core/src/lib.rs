#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Core abstractions for the Herald ecosystem.
//!
//! This crate provides the pieces shared by every Herald crate:
//!
//! - **Retry with exponential backoff** via [`RetryExecutor`] and [`RetryPolicy`]
//!   - Pure exponential delays (`initial_delay * multiplier^(k-1)`)
//!   - Optional delay cap
//!   - Custom retry predicates through the [`BackoffStrategy`] trait
//!   - Cooperative cancellation with [`CancellationToken`]
//! - **A clock abstraction** via the [`Clock`] trait, so timing can be driven by
//!   Tokio in production and recorded in tests
//! - **Terminal retry errors** via [`RetryError`]
//!
//! # Examples
//!
//! Using the prelude for convenient imports:
//!
//! ```rust
//! use herald_core::prelude::*;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let policy = RetryPolicy::builder()
//!     .max_attempts(3)
//!     .initial_delay(Duration::from_millis(100))
//!     .build();
//!
//! let value = RetryExecutor::new()
//!     .execute(&policy, || async { Ok::<_, std::io::Error>(42) })
//!     .await?;
//! assert_eq!(value, 42);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod retry;
pub mod time;

pub use error::{RetryError, RetryOutcome};
pub use retry::{BackoffStrategy, RetryEvent, RetryExecutor, RetryPolicy, RetryPolicyBuilder};
pub use time::{Clock, RecordingClock, TokioClock};
pub use tokio_util::sync::CancellationToken;

/// Convenient re-exports of commonly used items.
///
/// Import all core abstractions with:
///
/// ```rust
/// use herald_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{RetryError, RetryOutcome};
    pub use crate::retry::{
        BackoffStrategy, RetryEvent, RetryExecutor, RetryPolicy, RetryPolicyBuilder,
    };
    pub use crate::time::{Clock, TokioClock};
    pub use tokio_util::sync::CancellationToken;
}
