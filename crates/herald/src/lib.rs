#![deny(unsafe_code)]
#![warn(missing_docs)]

//! # Herald
//!
//! Retry with exponential backoff, and serialized delivery of transient
//! user-facing notifications, for Tokio applications.
//!
//! - [`herald_core`]: [`RetryExecutor`], [`RetryPolicy`], the [`Clock`]
//!   abstraction and [`RetryError`]
//! - [`herald_notify`]: [`NotificationDispatcher`], [`Notification`] and
//!   haptic feedback
//! - this crate: [`HeraldConfig`] loading, optional tracing setup, and
//!   [`Herald`], which reports terminal retry failures as error notifications
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use herald::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HeraldConfig::from_env()?;
//! let herald = Herald::new(config);
//!
//! let lessons = herald
//!     .retry_or_notify("Could not load lessons", || async {
//!         Ok::<_, std::io::Error>(vec!["hiragana", "katakana"])
//!     })
//!     .await?;
//!
//! herald.dispatcher().show_success(format!("Loaded {} lessons", lessons.len()));
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `env` (default): `HeraldConfig::from_env` and `.env` loading via `dotenvy`
//! - `trace`: [`observability::init_tracing`] via `tracing-subscriber`

pub mod config;
pub mod error;
#[cfg(feature = "trace")]
pub mod observability;
pub mod report;

pub use config::HeraldConfig;
pub use error::{ConfigError, Result};
pub use report::Herald;

pub use herald_core::{
    BackoffStrategy, CancellationToken, Clock, RecordingClock, RetryError, RetryEvent,
    RetryExecutor, RetryOutcome, RetryPolicy, RetryPolicyBuilder, TokioClock,
};
pub use herald_notify::{
    DispatcherBuilder, DispatcherState, HapticFeedback, HapticKind, NoHaptics, Notification,
    NotificationAction, NotificationDefaults, NotificationDispatcher, NotificationId, Phase,
    RecordingHaptics, Severity,
};

/// Re-exports of sub-crates
pub use herald_core;
pub use herald_notify;

/// Convenient re-exports of commonly used items.
///
/// ```rust
/// use herald::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::HeraldConfig;
    pub use crate::error::ConfigError;
    pub use crate::report::Herald;
    pub use herald_core::prelude::*;
    pub use herald_notify::prelude::*;
}
