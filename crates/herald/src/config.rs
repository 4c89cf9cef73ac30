//! Layered configuration for retry and notification defaults

use crate::error::{ConfigError, Result};
use herald_core::RetryPolicy;
use herald_core::time::saturating_duration_from_secs;
use herald_notify::{NotificationDefaults, Severity};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Maximum attempts, including the first.
pub const ENV_RETRY_MAX_ATTEMPTS: &str = "HERALD_RETRY_MAX_ATTEMPTS";
/// Delay after the first failure, in seconds.
pub const ENV_RETRY_INITIAL_DELAY: &str = "HERALD_RETRY_INITIAL_DELAY_SECS";
/// Backoff multiplier.
pub const ENV_RETRY_MULTIPLIER: &str = "HERALD_RETRY_MULTIPLIER";
/// Cap on any single delay, in seconds.
pub const ENV_RETRY_MAX_DELAY: &str = "HERALD_RETRY_MAX_DELAY_SECS";

/// Configuration for a [`Herald`](crate::Herald).
///
/// Every field has a default, so a config file only needs the keys it
/// changes:
///
/// ```toml
/// [retry]
/// max_attempts = 5
/// initial_delay_secs = 0.5
///
/// [notifications]
/// error_secs = 6.0
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeraldConfig {
    /// Backoff policy used by `Herald::retry` and `Herald::retry_or_notify`
    pub retry: RetryPolicy,

    /// Durations used by the dispatcher's `show_*` helpers
    pub notifications: NotificationDefaults,
}

impl HeraldConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    /// This will look for:
    /// - `HERALD_RETRY_MAX_ATTEMPTS`
    /// - `HERALD_RETRY_INITIAL_DELAY_SECS`
    /// - `HERALD_RETRY_MULTIPLIER`
    /// - `HERALD_RETRY_MAX_DELAY_SECS`
    /// - `HERALD_SUCCESS_SECS`, `HERALD_ERROR_SECS`, `HERALD_WARNING_SECS`,
    ///   `HERALD_INFO_SECS`
    ///
    /// Unset variables keep their defaults. A set variable that does not parse
    /// is an error rather than being silently ignored.
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply `HERALD_*` environment variables on top of this configuration.
    ///
    /// Use this after [`from_file`](Self::from_file) so the environment wins
    /// over the file.
    #[cfg(feature = "env")]
    pub fn with_env_overrides(self) -> Result<Self> {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            tracing::warn!(error = %err, "Ignoring unreadable .env file");
        }
        self.with_overrides(|key| std::env::var(key).ok())
    }

    #[cfg_attr(not(feature = "env"), allow(dead_code))]
    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let max_attempts: Option<u32> = parse_var(&lookup, ENV_RETRY_MAX_ATTEMPTS)?;
        let initial_delay: Option<f64> = parse_var(&lookup, ENV_RETRY_INITIAL_DELAY)?;
        let multiplier: Option<f64> = parse_var(&lookup, ENV_RETRY_MULTIPLIER)?;
        let max_delay: Option<f64> = parse_var(&lookup, ENV_RETRY_MAX_DELAY)?;

        let mut retry = self.retry.to_builder();
        if let Some(max_attempts) = max_attempts {
            retry = retry.max_attempts(max_attempts);
        }
        if let Some(secs) = initial_delay {
            retry = retry.initial_delay(saturating_duration_from_secs(secs));
        }
        if let Some(multiplier) = multiplier {
            retry = retry.multiplier(multiplier);
        }
        if let Some(secs) = max_delay {
            retry = retry.max_delay(saturating_duration_from_secs(secs));
        }
        self.retry = retry.build();

        for severity in Severity::ALL {
            let key = severity_env_key(severity);
            if let Some(secs) = parse_var::<f64>(&lookup, &key)? {
                self.notifications
                    .set_duration(severity, saturating_duration_from_secs(secs));
            }
        }

        Ok(self)
    }
}

/// Variable overriding the default duration for `severity`, e.g. `HERALD_ERROR_SECS`.
pub fn severity_env_key(severity: Severity) -> String {
    format!("HERALD_{}_SECS", severity.label().to_ascii_uppercase())
}

#[cfg_attr(not(feature = "env"), allow(dead_code))]
fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_owned(),
            value: raw,
        })
}
