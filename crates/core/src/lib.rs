//! Shared primitives for all Rust crates in azcheck.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across azcheck crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Configuration(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Error categories surfaced to the host runtime.
///
/// Every variant is terminal for the invocation that produced it.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed configuration, subject properties or secret.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Credential construction or token acquisition failed.
    #[error("authentication error: {0}")]
    Authentication(String),

    /// A cloud API call failed, including any page of a listing.
    #[error("transport error: {0}")]
    Transport(String),

    /// A resource identifier does not have the expected shape.
    #[error("format error: {0}")]
    Format(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns a stable lowercase label for the error category.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Authentication(_) => "authentication",
            Self::Transport(_) => "transport",
            Self::Format(_) => "format",
            Self::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AppError, NonEmptyString};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[test]
    fn error_kind_labels_are_stable() {
        assert_eq!(AppError::Format("x".to_owned()).kind(), "format");
        assert_eq!(AppError::Transport("x".to_owned()).kind(), "transport");
        assert_eq!(
            AppError::Authentication("x".to_owned()).to_string(),
            "authentication error: x"
        );
    }
}
