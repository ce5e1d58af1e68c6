//! Shared primitives for all Rust crates in Skyscraper.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across Skyscraper crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Creates a validated non-empty string, naming the offending field on failure.
    pub fn for_field(field: &str, value: impl Into<String>) -> AppResult<Self> {
        Self::new(value)
            .map_err(|_| AppError::Validation(format!("{field} must not be empty or whitespace")))
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

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist or is not visible to the caller.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Caller is not authenticated.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but the request was rejected.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Caller kind outside the known set. Unreachable after authentication.
    #[error("unrecognized caller: {0}")]
    UnrecognizedCaller(String),

    /// Begin, commit or rollback failed at the storage layer.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// Audit record could not be serialized or persisted.
    #[error("audit failure: {0}")]
    Audit(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns whether the error must be reported as a server-side failure.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::UnrecognizedCaller(_) | Self::Transaction(_) | Self::Audit(_) | Self::Internal(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{AppError, NonEmptyString};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(result.is_err());
    }

    #[test]
    fn for_field_names_the_offending_field() {
        let result = NonEmptyString::for_field("owner", "\t");
        match result {
            Err(AppError::Validation(message)) => assert!(message.starts_with("owner ")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn storage_failures_are_internal() {
        assert!(AppError::Transaction("commit failed".to_owned()).is_internal());
        assert!(AppError::Audit("insert failed".to_owned()).is_internal());
        assert!(!AppError::NotFound("user".to_owned()).is_internal());
    }
}
