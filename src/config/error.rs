//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Weight total must be positive, got {0}")]
    InvalidWeightTotal(f64),

    #[error("Pump step must be in (0, 1], got {0}")]
    InvalidPumpStep(f64),

    #[error("Alternative extent must be positive, got {0}")]
    InvalidAlternativeExtent(f64),

    #[error("Current username cannot be blank")]
    BlankUsername,

    #[error("Log level cannot be empty")]
    EmptyLogLevel,
}
