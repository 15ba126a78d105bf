//! Error taxonomy for Tendril.
//!
//! Every failure mode carries a stable machine-readable code via `code()`
//! so callers can branch without string-matching display text. Component
//! errors ([`ConfigError`], [`BackendError`], [`CapabilityError`],
//! [`WorkflowError`]) convert into the top-level [`TendrilError`] for
//! `?`-based propagation across component boundaries.
//!
//! The [`strategy`] submodule layers composable reactions (logging,
//! notification, retry) on top of the taxonomy.

pub mod backend;
pub mod capability;
pub mod config;
pub mod conversions;
pub mod strategy;
pub mod workflow;

pub use backend::{BackendError, BackendResult};
pub use capability::{CapabilityError, CapabilityResult};
pub use config::{ConfigError, ConfigResult};
pub use conversions::{TendrilError, TendrilResult};
pub use strategy::{
    CompositeStrategy, ErrorReport, ErrorStrategy, LogStrategy, Notifier, NotifyStrategy,
    RetryConfig, RetryStrategy, Severity, StrategyChain,
};
pub use workflow::{WorkflowError, WorkflowResult};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_errors_convert_into_tendril_error() {
        let err: TendrilError = CapabilityError::not_found("search").into();
        assert_eq!(err.code(), "CAPABILITY_NOT_FOUND");
        assert!(!err.is_transient());

        let err: TendrilError = BackendError::network("connection reset").into();
        assert_eq!(err.code(), "NETWORK_ERROR");
        assert!(err.is_transient());
    }

    #[test]
    fn codes_are_stable_across_the_taxonomy() {
        assert_eq!(WorkflowError::MissingName.code(), "MISSING_REQUIRED_FIELD");
        assert_eq!(
            WorkflowError::NotFound {
                workflow_id: "wf-1".into()
            }
            .code(),
            "WORKFLOW_NOT_FOUND"
        );
        assert_eq!(
            ConfigError::MissingField { field: "name" }.code(),
            "MISSING_REQUIRED_FIELD"
        );
        assert_eq!(
            BackendError::rate_limit("slow down", Some(500)).code(),
            "RATE_LIMIT_ERROR"
        );
    }

    #[test]
    fn display_includes_component_prefix() {
        let err: TendrilError = WorkflowError::MissingName.into();
        assert_eq!(err.to_string(), "Workflow error: Workflow name is required");
    }
}
