//! # Tendril Testing
//!
//! Test tooling for Tendril agents: a scripted mock model backend, mock
//! capabilities with call tracking, and ready-made configuration
//! fixtures.

pub mod fixtures;
pub mod mock_backend;
pub mod mock_capability;

pub use fixtures::{agent_config, agent_config_with, deterministic_params, echo_capability};
pub use mock_backend::MockBackend;
pub use mock_capability::MockCapability;
