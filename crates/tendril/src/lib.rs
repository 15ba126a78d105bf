//! # Tendril
//!
//! Tendril is an agent orchestration toolkit. It provides configuration-
//! validated agents that resolve model-issued capability calls in batched
//! concurrent dispatch, a sequential workflow engine with lifecycle
//! tracking, composable error-handling strategies, and a type-keyed
//! in-process message bus.
//!
//! ## Core Components
//!
//! - **[Agent]**: validated configuration plus an injected [`ModelBackend`];
//!   `process` runs one full turn including capability resolution
//! - **[Capability]**: named, schema-described async operation an agent
//!   may invoke
//! - **[WorkflowEngine]**: executes named step sequences with a typed
//!   context, status callbacks, and guaranteed active-map eviction
//! - **[StrategyChain]**: fans raised errors out to logging, notification,
//!   and retry strategies
//! - **[MessageBus]**: topic-keyed publish/subscribe with all-or-nothing
//!   concurrent handler dispatch
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use tendril::{Agent, AgentConfig, Capability, ParameterSchema};
//! # use tendril::{BackendResult, ExecutionRequest, ExecutionResult, ModelBackend};
//! # use tendril::{ChatMessage, TokenUsage};
//! # use async_trait::async_trait;
//!
//! # struct EchoBackend;
//! # #[async_trait]
//! # impl ModelBackend for EchoBackend {
//! #     async fn execute(&self, request: ExecutionRequest) -> BackendResult<ExecutionResult> {
//! #         Ok(ExecutionResult::completion(
//! #             vec![ChatMessage::assistant(request.messages.last().unwrap().content.clone())],
//! #             TokenUsage::default(),
//! #         ))
//! #     }
//! # }
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let shout = Capability::from_fn(
//!     "shout",
//!     "Upper-cases the input text",
//!     ParameterSchema::new(),
//!     |args| async move {
//!         let text = args.get("text").and_then(|v| v.as_str()).unwrap_or_default();
//!         Ok(text.to_uppercase().into())
//!     },
//! )?;
//!
//! let config = AgentConfig::new("greeter", "echo-model").with_capability(shout);
//! let agent = Agent::new(config, Arc::new(EchoBackend))?;
//! let result = agent.process("hello").await?;
//! assert!(!result.messages.is_empty());
//! # Ok(())
//! # }
//! ```

// Module aliases for namespaced access
pub use tendril_agent as agent;
pub use tendril_core as core;
pub use tendril_mesh as mesh;
pub use tendril_workflow as workflow;

#[cfg(feature = "testing")]
pub use tendril_testing as testing;

// Core types
pub use tendril_core::{
    AgentConfig, BackendError, BackendResult, Capability, CapabilityArgs, CapabilityError,
    CapabilityHandler, CapabilityName, CapabilityResult, ChatMessage, ChunkStream,
    CompositeStrategy, ConfigError, ConfigResult, ErrorReport, ErrorStrategy, ExecutionRequest,
    ExecutionResult, FinishReason, FnHandler, FunctionCall, GenerationParams, HandlerError,
    IdentifierRules, LogStrategy, ModelBackend, Notifier, NotifyStrategy, ParameterKind,
    ParameterSchema, ParameterSpec, RetryConfig, RetryStrategy, Role, Severity, StrategyChain,
    StreamChunk, TendrilError, TendrilResult, TokenUsage, ToolCallRequest, ToolDescriptor,
    ValidationError, WorkflowError, WorkflowResult,
};

// Agent pipeline
pub use tendril_agent::{Agent, CapabilityRegistry, TOOL_CALL_BATCH_SIZE};

// Workflow engine
pub use tendril_workflow::{
    ContextKey, FnStep, StepError, Workflow, WorkflowBuilder, WorkflowCallbacks, WorkflowContext,
    WorkflowEngine, WorkflowExecutionResult, WorkflowFailure, WorkflowId, WorkflowStatus,
    WorkflowStep,
};

// Message bus
pub use tendril_mesh::{BusError, BusResult, Envelope, MessageBus, MessageHandler, MessageId, Subscription, Topic};
