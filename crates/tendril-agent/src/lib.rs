//! # Tendril Agent
//!
//! Agent execution pipeline: configuration-validated agents that prompt an
//! injected model backend and resolve model-issued capability calls in
//! fixed-size concurrent batches.

pub mod agent;
pub mod registry;

pub use agent::{Agent, TOOL_CALL_BATCH_SIZE};
pub use registry::CapabilityRegistry;
