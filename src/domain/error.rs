//! Domain-level error types for mesh-sync.
//!
//! All errors are typed with `thiserror`. Only configuration problems and
//! transport failures against the record store are fatal; everything else
//! is carried as a value in the run report.

use std::path::PathBuf;
use thiserror::Error;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// Settings file is absent.
    #[error("Missing {}. Please create one based on config.example.json.", .path.display())]
    SettingsNotFound { path: PathBuf },

    /// Configuration or environment error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {message}")]
    JsonParse {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Transport-level failure talking to the record store.
    #[error("HTTP error: {message}")]
    Http {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// The device tool could not be started.
    #[error("Subprocess error: {message}")]
    Subprocess {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// IO operation failed.
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl AppError {
    /// Create a JSON parse error.
    pub fn json_parse(err: serde_json::Error) -> Self {
        Self::JsonParse {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an HTTP error with context.
    pub fn http(message: impl Into<String>, err: reqwest::Error) -> Self {
        Self::Http {
            message: format!("{}: {err}", message.into()),
            source: Some(err),
        }
    }

    /// Create a subprocess error with context.
    pub fn subprocess(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Subprocess {
            message: format!("{}: {err}", message.into()),
            source: Some(err),
        }
    }

    /// Create an IO error with context.
    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(err),
        }
    }

    /// Whether this error belongs to the startup configuration class.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::SettingsNotFound { .. } | Self::Config { .. })
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
