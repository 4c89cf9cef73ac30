//! Error types for configuration loading

use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading a [`HeraldConfig`](crate::HeraldConfig)
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// File that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML or has unknown keys
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Environment variable holds a value that does not parse
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue {
        /// Variable name
        key: String,
        /// Raw value as found
        value: String,
    },
}
