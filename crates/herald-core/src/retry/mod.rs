//! Retry with exponential backoff.
//!
//! This module provides a small, shareable retry executor driven by a
//! [`BackoffStrategy`]. The stock strategy, [`RetryPolicy`], retries every
//! failure with a pure exponential delay.
//!
//! # Key Types
//!
//! - [`RetryPolicy`] - Attempt limit, initial delay and multiplier
//! - [`BackoffStrategy`] - Trait for custom attempt limits, delays and retry predicates
//! - [`RetryExecutor`] - Runs an operation under a strategy (async, cancellable, or blocking)
//! - [`RetryEvent`] - Diagnostic record of an intermediate failure
//!
//! # Examples
//!
//! ```rust
//! use herald_core::retry::{RetryExecutor, RetryPolicy};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let policy = RetryPolicy::builder()
//!     .max_attempts(3)
//!     .initial_delay(Duration::from_millis(100))
//!     .build();
//!
//! let result = RetryExecutor::new()
//!     .execute(&policy, || async {
//!         // Your operation here
//!         Ok::<_, std::io::Error>(42)
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod executor;
mod policy;
mod strategy;

pub use executor::{RetryEvent, RetryExecutor};
pub use policy::{RetryPolicy, RetryPolicyBuilder};
pub use strategy::BackoffStrategy;
