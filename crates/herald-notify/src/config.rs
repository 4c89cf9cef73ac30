//! Per-severity display durations.

use crate::notification::Severity;
use herald_core::time::saturating_duration_from_secs;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default display duration for each severity.
///
/// The convenience methods on the dispatcher (`show_success`, `show_error`,
/// ...) take their duration from here.
///
/// # Examples
///
/// ```rust
/// use herald_notify::{NotificationDefaults, Severity};
/// use std::time::Duration;
///
/// let defaults = NotificationDefaults::default()
///     .with_duration(Severity::Error, Duration::from_secs(6));
///
/// assert_eq!(defaults.duration_for(Severity::Error), Duration::from_secs(6));
/// assert_eq!(defaults.duration_for(Severity::Warning), Duration::from_millis(3_500));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "NotificationDefaultsRepr", into = "NotificationDefaultsRepr")]
pub struct NotificationDefaults {
    success: Duration,
    error: Duration,
    warning: Duration,
    info: Duration,
}

impl NotificationDefaults {
    /// Duration used for notifications of `severity`.
    pub fn duration_for(&self, severity: Severity) -> Duration {
        match severity {
            Severity::Success => self.success,
            Severity::Error => self.error,
            Severity::Warning => self.warning,
            Severity::Info => self.info,
        }
    }

    /// Override the duration for one severity.
    pub fn with_duration(mut self, severity: Severity, duration: Duration) -> Self {
        *self.slot_mut(severity) = duration;
        self
    }

    /// Override the duration for one severity in place.
    pub fn set_duration(&mut self, severity: Severity, duration: Duration) {
        *self.slot_mut(severity) = duration;
    }

    fn slot_mut(&mut self, severity: Severity) -> &mut Duration {
        match severity {
            Severity::Success => &mut self.success,
            Severity::Error => &mut self.error,
            Severity::Warning => &mut self.warning,
            Severity::Info => &mut self.info,
        }
    }
}

impl Default for NotificationDefaults {
    fn default() -> Self {
        Self {
            success: Severity::Success.default_duration(),
            error: Severity::Error.default_duration(),
            warning: Severity::Warning.default_duration(),
            info: Severity::Info.default_duration(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct NotificationDefaultsRepr {
    success_secs: f64,
    error_secs: f64,
    warning_secs: f64,
    info_secs: f64,
}

impl Default for NotificationDefaultsRepr {
    fn default() -> Self {
        NotificationDefaults::default().into()
    }
}

impl From<NotificationDefaultsRepr> for NotificationDefaults {
    fn from(repr: NotificationDefaultsRepr) -> Self {
        Self {
            success: saturating_duration_from_secs(repr.success_secs),
            error: saturating_duration_from_secs(repr.error_secs),
            warning: saturating_duration_from_secs(repr.warning_secs),
            info: saturating_duration_from_secs(repr.info_secs),
        }
    }
}

impl From<NotificationDefaults> for NotificationDefaultsRepr {
    fn from(defaults: NotificationDefaults) -> Self {
        Self {
            success_secs: defaults.success.as_secs_f64(),
            error_secs: defaults.error.as_secs_f64(),
            warning_secs: defaults.warning.as_secs_f64(),
            info_secs: defaults.info.as_secs_f64(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_match_severity_defaults() {
        let defaults = NotificationDefaults::default();
        for severity in Severity::ALL {
            assert_eq!(defaults.duration_for(severity), severity.default_duration());
        }
    }

    #[test]
    fn test_set_duration_only_touches_one_severity() {
        let mut defaults = NotificationDefaults::default();
        defaults.set_duration(Severity::Info, Duration::from_secs(1));

        assert_eq!(defaults.duration_for(Severity::Info), Duration::from_secs(1));
        assert_eq!(defaults.duration_for(Severity::Success), Duration::from_secs(3));
    }

    #[test]
    fn test_deserialize_partial_table() {
        let defaults: NotificationDefaults = toml::from_str("error_secs = 8.0").unwrap();

        assert_eq!(defaults.duration_for(Severity::Error), Duration::from_secs(8));
        assert_eq!(
            defaults.duration_for(Severity::Warning),
            Duration::from_millis(3_500)
        );
    }

    #[test]
    fn test_deserialize_negative_duration_clamps_to_zero() {
        let defaults: NotificationDefaults = toml::from_str("info_secs = -1.0").unwrap();
        assert_eq!(defaults.duration_for(Severity::Info), Duration::ZERO);
    }

    #[test]
    fn test_deserialize_rejects_unknown_severity() {
        let result: Result<NotificationDefaults, _> = toml::from_str("fatal_secs = 1.0");
        assert!(result.is_err());
    }
}
