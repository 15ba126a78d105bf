//! Agent and capability configuration errors.

use std::fmt;

use crate::validation::ValidationError;

/// Errors raised while validating agent configuration.
///
/// Construction is atomic: the first violation fails the whole
/// configuration and no partial agent is produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A required field was missing or empty.
    MissingField { field: &'static str },

    /// A name failed identifier validation.
    InvalidName {
        field: &'static str,
        reason: ValidationError,
    },

    /// A generation parameter was outside its allowed range.
    OutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Two capabilities in the list share a name.
    DuplicateCapability { name: String },
}

impl ConfigError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::MissingField { .. } => "MISSING_REQUIRED_FIELD",
            ConfigError::InvalidName { .. } => "INVALID_CONFIG",
            ConfigError::OutOfRange { .. } => "INVALID_PARAMETER",
            ConfigError::DuplicateCapability { .. } => "DUPLICATE_CAPABILITY",
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingField { field } => {
                write!(f, "Required field '{}' is missing", field)
            }
            ConfigError::InvalidName { field, reason } => {
                write!(f, "Invalid '{}': {}", field, reason)
            }
            ConfigError::OutOfRange {
                parameter,
                value,
                min,
                max,
            } => write!(
                f,
                "Parameter '{}' out of range: {} (allowed: {}..={})",
                parameter, value, min, max
            ),
            ConfigError::DuplicateCapability { name } => {
                write!(f, "Capability '{}' is declared more than once", name)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
