//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        actual: f64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("Duplicate {field}: '{value}'")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, actual: f64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a duplicate value validation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        ValidationError::Duplicate {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    DegenerateObjective,
    IncompatibleScoreFunction,
    OutOfDomain,

    // Not found errors
    UnknownObjective,
    UnknownAlternative,
    UnknownUser,
    UnknownElement,

    // Notification errors
    ReentrantNotification,
    HandlerFailed,

    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::DegenerateObjective => "DEGENERATE_OBJECTIVE",
            ErrorCode::IncompatibleScoreFunction => "INCOMPATIBLE_SCORE_FUNCTION",
            ErrorCode::OutOfDomain => "OUT_OF_DOMAIN",
            ErrorCode::UnknownObjective => "UNKNOWN_OBJECTIVE",
            ErrorCode::UnknownAlternative => "UNKNOWN_ALTERNATIVE",
            ErrorCode::UnknownUser => "UNKNOWN_USER",
            ErrorCode::UnknownElement => "UNKNOWN_ELEMENT",
            ErrorCode::ReentrantNotification => "REENTRANT_NOTIFICATION",
            ErrorCode::HandlerFailed => "HANDLER_FAILED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::ValidationFailed,
            message: message.into(),
            details: HashMap::new(),
        }
        .with_detail("field", field.into())
    }

    /// Objective lookup failed.
    pub fn unknown_objective(key: impl Into<String>) -> Self {
        let key = key.into();
        Self::new(
            ErrorCode::UnknownObjective,
            format!("No objective matches '{}'", key),
        )
        .with_detail("objective", key)
    }

    /// Alternative lookup failed.
    pub fn unknown_alternative(key: impl Into<String>) -> Self {
        let key = key.into();
        Self::new(
            ErrorCode::UnknownAlternative,
            format!("No alternative matches '{}'", key),
        )
        .with_detail("alternative", key)
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        DomainError::new(ErrorCode::ValidationFailed, err.to_string())
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}
