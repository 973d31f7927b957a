//! Domain error types
//!
//! This module defines the error hierarchy for Sigilo. All errors are
//! domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main Sigilo error type
///
/// This is the primary error type used throughout the library. Variants map
/// onto the failure taxonomy of the pipeline: configuration problems are
/// fatal at startup, model availability degrades a single component, data
/// problems fail only the operation that hit them.
#[derive(Debug, Error)]
pub enum SigiloError {
    /// Configuration-related errors (bad pattern, unknown category,
    /// missing stop-term file). Fatal at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A statistical model or lexicon bundle could not be loaded. The
    /// affected detector degrades; the pipeline keeps running.
    #[error("Model unavailable ({component}): {reason}")]
    ModelUnavailable { component: String, reason: String },

    /// Malformed data (invalid serialized mapping, offset out of range).
    /// Fails the current operation only, never other sessions.
    #[error("Data error: {0}")]
    Data(String),

    /// Validation model call errors surfaced by the leak validator.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The session was cancelled before substitution committed.
    #[error("Session cancelled")]
    Cancelled,

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for SigiloError {
    fn from(err: std::io::Error) -> Self {
        SigiloError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SigiloError {
    fn from(err: serde_json::Error) -> Self {
        SigiloError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for SigiloError {
    fn from(err: toml::de::Error) -> Self {
        SigiloError::Configuration(format!("TOML parse error: {err}"))
    }
}
