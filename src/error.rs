// src/error.rs

//! Unified error handling for the feedscan agent.

use std::fmt;

use thiserror::Error;

/// Result type alias for feedscan operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization failed
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// The current document is not the expected feed page
    #[error("Environment mismatch: expected feed at {expected}, found {actual}")]
    EnvironmentMismatch { expected: String, actual: String },

    /// Activating a page control failed
    #[error("Activation error for {context}: {message}")]
    Activation { context: String, message: String },

    /// Export serialization or hand-off failed
    #[error("Export error for {context}: {message}")]
    Export { context: String, message: String },
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an environment mismatch error.
    pub fn environment(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::EnvironmentMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an activation error with context.
    pub fn activation(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Activation {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create an export error with context.
    pub fn export(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Export {
            context: context.into(),
            message: message.to_string(),
        }
    }
}
