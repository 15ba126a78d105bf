//! # Tendril Core
//!
//! Core traits and types for the Tendril agent toolkit.
//! This crate provides the capability model, agent configuration, model
//! backend abstraction, chat message shapes, and the error taxonomy with
//! its composable handling strategies.

pub mod backend;
pub mod capability;
pub mod config;
pub mod error;
pub mod message;
pub mod validation;

pub use backend::{ChunkStream, ExecutionRequest, ModelBackend, ToolDescriptor};
pub use capability::{
    Capability, CapabilityArgs, CapabilityHandler, CapabilityName, FnHandler, HandlerError,
    ParameterKind, ParameterSchema, ParameterSpec,
};
pub use config::{AgentConfig, GenerationParams};
pub use error::{
    BackendError, BackendResult, CapabilityError, CapabilityResult, CompositeStrategy, ConfigError,
    ConfigResult, ErrorReport, ErrorStrategy, LogStrategy, Notifier, NotifyStrategy, RetryConfig,
    RetryStrategy, Severity, StrategyChain, TendrilError, TendrilResult, WorkflowError,
    WorkflowResult,
};
pub use message::{
    ChatMessage, ExecutionResult, FinishReason, FunctionCall, Role, StreamChunk, TokenUsage,
    ToolCallRequest,
};
pub use validation::{IdentifierRules, ValidationError};
