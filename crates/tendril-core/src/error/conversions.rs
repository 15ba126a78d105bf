//! Error type conversions and the top-level composite error.
//!
//! `TendrilError` unifies the taxonomy so callers can propagate with `?`
//! regardless of which component a failure originated in.

use super::backend::BackendError;
use super::capability::CapabilityError;
use super::config::ConfigError;
use super::workflow::WorkflowError;

/// Main error type for Tendril operations.
#[derive(Debug, Clone, PartialEq)]
pub enum TendrilError {
    /// Configuration validation failed.
    Config(ConfigError),

    /// A model backend failed.
    Backend(BackendError),

    /// Capability lookup or execution failed.
    Capability(CapabilityError),

    /// Workflow building or execution failed.
    Workflow(WorkflowError),
}

impl TendrilError {
    /// Stable machine-readable code, delegated to the underlying error.
    pub fn code(&self) -> &'static str {
        match self {
            TendrilError::Config(e) => e.code(),
            TendrilError::Backend(e) => e.code(),
            TendrilError::Capability(e) => e.code(),
            TendrilError::Workflow(e) => e.code(),
        }
    }

    /// Whether this error represents a transient condition worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            TendrilError::Backend(e) => e.is_transient(),
            _ => false,
        }
    }
}

impl std::fmt::Display for TendrilError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TendrilError::Config(e) => write!(f, "Configuration error: {}", e),
            TendrilError::Backend(e) => write!(f, "Backend error: {}", e),
            TendrilError::Capability(e) => write!(f, "Capability error: {}", e),
            TendrilError::Workflow(e) => write!(f, "Workflow error: {}", e),
        }
    }
}

impl std::error::Error for TendrilError {}

impl From<ConfigError> for TendrilError {
    fn from(err: ConfigError) -> Self {
        TendrilError::Config(err)
    }
}

impl From<BackendError> for TendrilError {
    fn from(err: BackendError) -> Self {
        TendrilError::Backend(err)
    }
}

impl From<CapabilityError> for TendrilError {
    fn from(err: CapabilityError) -> Self {
        TendrilError::Capability(err)
    }
}

impl From<WorkflowError> for TendrilError {
    fn from(err: WorkflowError) -> Self {
        TendrilError::Workflow(err)
    }
}

/// Result type alias for Tendril operations.
pub type TendrilResult<T> = Result<T, TendrilError>;
