#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Serialized delivery of transient notifications.
//!
//! [`NotificationDispatcher`] shows one [`Notification`] at a time, queues the
//! rest in arrival order, and retires each one after its display duration.
//! Every promotion plays a haptic pattern through the [`HapticFeedback`]
//! collaborator and publishes the new active notification on a
//! `tokio::sync::watch` channel for the presentation layer.
//!
//! # Examples
//!
//! ```rust
//! use herald_notify::prelude::*;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let haptics = RecordingHaptics::new();
//! let dispatcher = NotificationDispatcher::builder()
//!     .haptics(haptics.clone())
//!     .build();
//!
//! let mut active = dispatcher.subscribe();
//! dispatcher.show_success("Lesson complete");
//!
//! assert!(active.has_changed().unwrap());
//! assert_eq!(
//!     active.borrow_and_update().as_ref().map(|n| n.message().to_owned()),
//!     Some("Lesson complete".to_owned())
//! );
//! assert_eq!(haptics.events(), vec![HapticKind::Success]);
//! # }
//! ```

pub mod config;
pub mod dispatcher;
pub mod haptics;
pub mod notification;

pub use config::NotificationDefaults;
pub use dispatcher::{DispatcherBuilder, DispatcherState, NotificationDispatcher, Phase};
pub use haptics::{HapticFeedback, HapticKind, NoHaptics, RecordingHaptics};
pub use notification::{Notification, NotificationAction, NotificationId, Severity};

/// Convenient re-exports of commonly used items.
pub mod prelude {
    pub use crate::config::NotificationDefaults;
    pub use crate::dispatcher::{DispatcherState, NotificationDispatcher, Phase};
    pub use crate::haptics::{HapticFeedback, HapticKind, NoHaptics, RecordingHaptics};
    pub use crate::notification::{Notification, NotificationId, Severity};
}
