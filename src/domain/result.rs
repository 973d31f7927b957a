//! Result type alias for Sigilo

use super::errors::SigiloError;

/// Result type alias used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, SigiloError>;
