//! Notification payloads and severities.

use crate::haptics::HapticKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Unique identifier assigned to a notification when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(Uuid);

impl NotificationId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// How serious a notification is.
///
/// Severity selects the default display duration and the haptic pattern
/// played when the notification becomes active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// An action completed
    Success,
    /// Something failed
    Error,
    /// Something needs attention
    Warning,
    /// Neutral information
    Info,
}

impl Severity {
    /// Every severity, in declaration order.
    pub const ALL: [Severity; 4] = [
        Severity::Success,
        Severity::Error,
        Severity::Warning,
        Severity::Info,
    ];

    /// Built-in display duration for this severity.
    ///
    /// Errors linger longest so they can be read; warnings slightly less.
    pub const fn default_duration(self) -> Duration {
        match self {
            Severity::Success => Duration::from_millis(3_000),
            Severity::Error => Duration::from_millis(4_000),
            Severity::Warning => Duration::from_millis(3_500),
            Severity::Info => Duration::from_millis(3_000),
        }
    }

    /// Haptic pattern played on promotion. Info reuses the success pattern.
    pub const fn haptic(self) -> HapticKind {
        match self {
            Severity::Success | Severity::Info => HapticKind::Success,
            Severity::Error => HapticKind::Error,
            Severity::Warning => HapticKind::Warning,
        }
    }

    /// Lowercase name, as used in configuration.
    pub const fn label(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Optional follow-up action attached to a notification ("Undo", "Retry", ...).
#[derive(Clone)]
pub struct NotificationAction {
    label: String,
    callback: Arc<dyn Fn() + Send + Sync>,
}

impl NotificationAction {
    /// Create an action with a button label and a callback.
    pub fn new<F>(label: impl Into<String>, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            callback: Arc::new(callback),
        }
    }

    /// Button label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Run the callback.
    pub fn invoke(&self) {
        (self.callback)();
    }
}

impl fmt::Debug for NotificationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationAction")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// A transient, user-facing message.
///
/// Two notifications are equal only if they share an id; identical messages
/// submitted twice are distinct notifications.
///
/// # Examples
///
/// ```rust
/// use herald_notify::{Notification, Severity};
/// use std::time::Duration;
///
/// let saved = Notification::success("Deck saved");
/// assert_eq!(saved.duration(), Duration::from_secs(3));
///
/// let offline = Notification::new("You are offline", Severity::Warning)
///     .with_duration(Duration::from_secs(10))
///     .with_action("Retry", || println!("retrying"));
/// assert_eq!(offline.action().map(|a| a.label()), Some("Retry"));
/// ```
#[derive(Debug, Clone)]
pub struct Notification {
    id: NotificationId,
    message: String,
    severity: Severity,
    duration: Duration,
    action: Option<NotificationAction>,
    created_at: DateTime<Utc>,
}

impl Notification {
    /// Create a notification with the severity's default duration and no action.
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            id: NotificationId::new(),
            message: message.into(),
            severity,
            duration: severity.default_duration(),
            action: None,
            created_at: Utc::now(),
        }
    }

    /// Success notification with the default duration.
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Success)
    }

    /// Error notification with the default duration.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Error)
    }

    /// Warning notification with the default duration.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Warning)
    }

    /// Info notification with the default duration.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Info)
    }

    /// Override how long the notification stays active.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Attach a follow-up action.
    pub fn with_action<F>(mut self, label: impl Into<String>, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.action = Some(NotificationAction::new(label, callback));
        self
    }

    /// Unique identifier.
    pub fn id(&self) -> NotificationId {
        self.id
    }

    /// Text payload.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Severity.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// How long the notification stays active once displayed.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Follow-up action, if any.
    pub fn action(&self) -> Option<&NotificationAction> {
        self.action.as_ref()
    }

    /// When the notification was created (not when it was displayed).
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl PartialEq for Notification {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Notification {}
