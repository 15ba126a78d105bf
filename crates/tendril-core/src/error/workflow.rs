//! Workflow engine errors.

use std::fmt;

use crate::validation::ValidationError;

/// Errors raised by the workflow builder and engine.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowError {
    /// The builder was asked to build without a name set.
    MissingName,

    /// No active workflow with the given id exists.
    ///
    /// Terminal workflows are evicted from the active set, so this also
    /// covers workflows that already completed, failed, or were cancelled.
    NotFound { workflow_id: String },

    /// A step's `validate` hook returned false.
    StepValidationFailed { step: String },

    /// A step's `validate` or `execute` hook failed.
    StepFailed { step: String, cause: String },

    /// A context key failed identifier validation.
    InvalidContextKey { reason: ValidationError },
}

impl WorkflowError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            WorkflowError::MissingName => "MISSING_REQUIRED_FIELD",
            WorkflowError::NotFound { .. } => "WORKFLOW_NOT_FOUND",
            WorkflowError::StepValidationFailed { .. } => "STEP_VALIDATION_FAILED",
            WorkflowError::StepFailed { .. } => "WORKFLOW_ERROR",
            WorkflowError::InvalidContextKey { .. } => "INVALID_PARAMETER",
        }
    }

    /// The failed step's name, when this error refers to a step.
    pub fn step_name(&self) -> Option<&str> {
        match self {
            WorkflowError::StepValidationFailed { step } | WorkflowError::StepFailed { step, .. } => {
                Some(step)
            }
            _ => None,
        }
    }
}

impl fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowError::MissingName => write!(f, "Workflow name is required"),
            WorkflowError::NotFound { workflow_id } => {
                write!(f, "Workflow not found: {}", workflow_id)
            }
            WorkflowError::StepValidationFailed { step } => {
                write!(f, "Validation failed for step: {}", step)
            }
            WorkflowError::StepFailed { step, cause } => {
                write!(f, "Step '{}' failed: {}", step, cause)
            }
            WorkflowError::InvalidContextKey { reason } => {
                write!(f, "Invalid context key: {}", reason)
            }
        }
    }
}

impl std::error::Error for WorkflowError {}

/// Result type alias for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;
