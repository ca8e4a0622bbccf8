//! Error types for hgcoref.
//!
//! All errors are strongly typed using thiserror. Store failures are carried
//! unchanged inside [`CorefError::Storage`]; the engine never retries them.

use thiserror::Error;

use crate::storage::StorageError;

/// Validation errors raised for malformed input or configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Cannot parse edge {input:?}: {reason}")]
    EdgeParse {
        input: String,
        reason: String,
    },

    #[error("Field '{field}' must be greater than zero")]
    ZeroValue {
        field: String,
    },

    #[error("Field '{field}' must be a single atom, got {value:?}")]
    NotAnAtom {
        field: String,
        value: String,
    },

    #[error("Field '{field}' cannot be empty")]
    EmptyField {
        field: String,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        reason: String,
    },
}

/// Top-level error type for coreference operations.
#[derive(Debug, Error)]
pub enum CorefError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Could not generate an unused coreference id after {attempts} attempts")]
    IdExhausted {
        attempts: u32,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl CorefError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if the failure came from the store.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

/// Result type alias for coreference operations.
pub type CorefResult<T> = Result<T, CorefError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::ZeroValue {
            field: "id_length".to_string(),
        };
        assert!(err.to_string().contains("id_length"));

        let err = ValidationError::NotAnAtom {
            field: "coref_connector".to_string(),
            value: "(a b)".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("coref_connector"));
        assert!(msg.contains("(a b)"));
    }

    #[test]
    fn test_coref_error_from_storage() {
        let err: CorefError = StorageError::BackendError("disk gone".to_string()).into();
        assert!(err.is_storage());
        assert!(!err.is_validation());
        assert!(err.to_string().contains("disk gone"));
    }

    #[test]
    fn test_coref_error_from_validation() {
        let err: CorefError = ValidationError::EmptyField {
            field: "coref_id_key".to_string(),
        }
        .into();
        assert!(err.is_validation());
    }

    #[test]
    fn test_id_exhausted_and_internal() {
        let err = CorefError::IdExhausted { attempts: 16 };
        assert!(err.to_string().contains("16 attempts"));

        let err = CorefError::internal("unexpected state");
        assert!(err.to_string().contains("unexpected state"));
    }
}
