//! # Tendril Workflow
//!
//! Sequential workflow engine: named step sequences threaded through a
//! typed context, with lifecycle tracking (PENDING, RUNNING, COMPLETED,
//! FAILED, CANCELLED), status callbacks, and a fluent builder.

pub mod builder;
pub mod context;
pub mod engine;
pub mod step;

pub use builder::WorkflowBuilder;
pub use context::{ContextKey, WorkflowContext};
pub use engine::{
    Workflow, WorkflowCallbacks, WorkflowEngine, WorkflowExecutionResult, WorkflowFailure,
    WorkflowId, WorkflowStatus,
};
pub use step::{FnStep, StepError, WorkflowStep};
