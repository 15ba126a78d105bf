//! Capability lookup and execution errors.

use std::fmt;

/// Errors that can occur while resolving or executing a capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// No capability with the requested name is registered.
    NotFound { name: String },

    /// A capability with the same name is already registered.
    AlreadyRegistered { name: String },

    /// The handler ran but failed; the original cause's message is kept.
    ExecutionFailed { name: String, cause: String },

    /// The model-issued arguments could not be decoded against the schema.
    InvalidArguments { name: String, reason: String },
}

impl CapabilityError {
    /// Create a NotFound error for a capability name.
    pub fn not_found(name: impl Into<String>) -> Self {
        CapabilityError::NotFound { name: name.into() }
    }

    /// Create an ExecutionFailed error preserving the handler's cause.
    pub fn execution_failed(name: impl Into<String>, cause: impl Into<String>) -> Self {
        CapabilityError::ExecutionFailed {
            name: name.into(),
            cause: cause.into(),
        }
    }

    /// The capability name this error refers to.
    pub fn capability_name(&self) -> &str {
        match self {
            CapabilityError::NotFound { name }
            | CapabilityError::AlreadyRegistered { name }
            | CapabilityError::ExecutionFailed { name, .. }
            | CapabilityError::InvalidArguments { name, .. } => name,
        }
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            CapabilityError::NotFound { .. } => "CAPABILITY_NOT_FOUND",
            CapabilityError::AlreadyRegistered { .. } => "DUPLICATE_CAPABILITY",
            CapabilityError::ExecutionFailed { .. } => "CAPABILITY_EXECUTION_FAILED",
            CapabilityError::InvalidArguments { .. } => "INVALID_PARAMETER",
        }
    }
}

impl fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityError::NotFound { name } => {
                write!(f, "Capability '{}' not found", name)
            }
            CapabilityError::AlreadyRegistered { name } => {
                write!(f, "Capability '{}' is already registered", name)
            }
            CapabilityError::ExecutionFailed { name, cause } => {
                write!(f, "Capability '{}' execution failed: {}", name, cause)
            }
            CapabilityError::InvalidArguments { name, reason } => {
                write!(f, "Capability '{}' received invalid arguments: {}", name, reason)
            }
        }
    }
}

impl std::error::Error for CapabilityError {}

/// Result type alias for capability operations.
pub type CapabilityResult<T> = Result<T, CapabilityError>;
