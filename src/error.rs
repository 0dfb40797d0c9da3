//! Error types for the ledger engine
//!
//! Every failure surfaces as one of a small set of kinds so the boundary
//! layer (CLI, embedding service) can map it to a user-visible status
//! without inspecting messages.

use thiserror::Error;

/// The main error type for ledger operations
#[derive(Error, Debug)]
pub enum EnvelopeError {
    /// Configuration-related errors (settings file, paths)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Referenced budget/account/category/transaction does not exist
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Malformed input: bad amount, non-first-of-month date, self-transfer, ...
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation would break a ledger invariant
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Concurrent modification detected by the store
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Underlying persistence failure or timeout
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

/// Coarse classification of an [`EnvelopeError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    InvariantViolation,
    Conflict,
    StoreUnavailable,
}

impl ErrorKind {
    /// Process exit code used by the CLI for this kind
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::NotFound => 3,
            Self::InvalidArgument => 4,
            Self::InvariantViolation => 5,
            Self::Conflict => 6,
            Self::StoreUnavailable => 7,
        }
    }
}

impl EnvelopeError {
    /// Create a "not found" error for budgets
    pub fn budget_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Budget",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for accounts
    pub fn account_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Account",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for categories
    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Category",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for category groups
    pub fn group_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Category group",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for transactions
    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Transaction",
            identifier: identifier.into(),
        }
    }

    /// The taxonomy kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) | Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvariantViolation(_) => ErrorKind::InvariantViolation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an invalid-argument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Check if this is an invariant violation
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::InvariantViolation(_))
    }
}

impl From<std::io::Error> for EnvelopeError {
    fn from(err: std::io::Error) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for EnvelopeError {
    fn from(err: serde_json::Error) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}

/// Result type alias for ledger operations
pub type EnvelopeResult<T> = Result<T, EnvelopeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EnvelopeError::InvalidArgument("month must be a first-of-month date".into());
        assert_eq!(
            err.to_string(),
            "Invalid argument: month must be a first-of-month date"
        );
    }

    #[test]
    fn test_not_found_error() {
        let err = EnvelopeError::account_not_found("Checking");
        assert_eq!(err.to_string(), "Account not found: Checking");
        assert!(err.is_not_found());
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_kinds_and_exit_codes() {
        assert_eq!(
            EnvelopeError::Config("bad".into()).kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            EnvelopeError::Conflict("revision".into()).kind().exit_code(),
            6
        );
        assert_eq!(
            EnvelopeError::InvariantViolation("split".into()).kind(),
            ErrorKind::InvariantViolation
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let envelope_err: EnvelopeError = io_err.into();
        assert!(matches!(envelope_err, EnvelopeError::StoreUnavailable(_)));
    }
}
