//! Configuration error types.

use thiserror::Error;

/// Errors raised while reading, writing, or interpreting the settings file.
///
/// Loading never surfaces these to callers of [`SettingsStore`](crate::SettingsStore);
/// they are logged and the store falls back to defaults. Writing does.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    ReadError {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The settings file could not be written.
    #[error("failed to write {path}: {source}")]
    WriteError {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// TOML text or a table within it did not match the expected shape.
    #[error("failed to parse {path}: {source}")]
    ParseError {
        /// Path (or logical location) of the malformed content.
        path: String,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// A record could not be turned into a TOML table.
    #[error("failed to serialize settings: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// A value was structurally valid but outside accepted bounds.
    #[error("invalid value for {field}: {message}")]
    ValidationError {
        /// Dotted field path or file path.
        field: String,
        /// Human-readable explanation.
        message: String,
    },

    /// No platform configuration directory could be determined.
    #[error("could not determine the user configuration directory")]
    NoConfigDir,
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
