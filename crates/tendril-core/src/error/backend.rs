//! Model-backend failure classification.
//!
//! Backend adapters must sort every failure into exactly one of these
//! kinds; raw transport errors never cross the backend boundary.

use std::fmt;

/// Errors a model backend can surface, classified for callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The backend executed but failed, or returned an unexpected shape.
    Execution {
        message: String,
        /// Original cause's message, when available
        cause: Option<String>,
    },

    /// Network-level failure reaching the backend.
    Network {
        message: String,
        cause: Option<String>,
    },

    /// The backend rejected the request due to rate limiting.
    RateLimit {
        message: String,
        /// Suggested wait before retrying, when the backend reports one
        retry_after_ms: Option<u64>,
    },
}

impl BackendError {
    /// Create an execution error without a cause.
    pub fn execution(message: impl Into<String>) -> Self {
        BackendError::Execution {
            message: message.into(),
            cause: None,
        }
    }

    /// Create an execution error preserving the original cause's message.
    pub fn execution_with_cause(
        message: impl Into<String>,
        cause: &(dyn std::error::Error + '_),
    ) -> Self {
        BackendError::Execution {
            message: message.into(),
            cause: Some(cause.to_string()),
        }
    }

    /// Create a network error without a cause.
    pub fn network(message: impl Into<String>) -> Self {
        BackendError::Network {
            message: message.into(),
            cause: None,
        }
    }

    /// Create a rate-limit error, with the backend's suggested wait if it
    /// reported one.
    pub fn rate_limit(message: impl Into<String>, retry_after_ms: Option<u64>) -> Self {
        BackendError::RateLimit {
            message: message.into(),
            retry_after_ms,
        }
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            BackendError::Execution { .. } => "EXECUTION_ERROR",
            BackendError::Network { .. } => "NETWORK_ERROR",
            BackendError::RateLimit { .. } => "RATE_LIMIT_ERROR",
        }
    }

    /// Whether this failure is a transient condition worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, BackendError::Network { .. })
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Execution { message, cause } => match cause {
                Some(cause) => write!(f, "Execution failed: {}: {}", message, cause),
                None => write!(f, "Execution failed: {}", message),
            },
            BackendError::Network { message, cause } => match cause {
                Some(cause) => write!(f, "Network error: {}: {}", message, cause),
                None => write!(f, "Network error: {}", message),
            },
            BackendError::RateLimit {
                message,
                retry_after_ms,
            } => match retry_after_ms {
                Some(ms) => write!(f, "Rate limited: {} (retry after {}ms)", message, ms),
                None => write!(f, "Rate limited: {}", message),
            },
        }
    }
}

impl std::error::Error for BackendError {}

/// Result type alias for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;
