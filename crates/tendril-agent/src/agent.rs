//! Agent execution pipeline.
//!
//! `process` assembles the conversation, invokes the injected model
//! backend, and resolves any model-issued capability calls in fixed-size
//! concurrent batches. The pipeline performs no retries of its own;
//! callers layer retry policy on top via the error strategy chain.

use std::sync::Arc;

use futures::future;
use serde_json::Value;
use tendril_core::{
    AgentConfig, Capability, CapabilityArgs, CapabilityError, ChatMessage, ConfigError,
    ConfigResult, ExecutionRequest, ExecutionResult, ModelBackend, TendrilResult, ToolCallRequest,
};

use crate::registry::CapabilityRegistry;

/// Tool calls are resolved in concurrent batches of this size. Batches run
/// strictly one after another.
pub const TOOL_CALL_BATCH_SIZE: usize = 5;

/// An agent: validated configuration, capability registry, and an injected
/// model backend.
pub struct Agent {
    config: AgentConfig,
    registry: CapabilityRegistry,
    backend: Arc<dyn ModelBackend>,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl Agent {
    /// Build an agent from a configuration and a model backend.
    ///
    /// Validation is atomic: any violation fails construction and no
    /// agent is produced.
    pub fn new(config: AgentConfig, backend: Arc<dyn ModelBackend>) -> ConfigResult<Self> {
        config.validate()?;

        let mut registry = CapabilityRegistry::new();
        for capability in &config.capabilities {
            registry
                .register(capability.clone())
                .map_err(|_| ConfigError::DuplicateCapability {
                    name: capability.name().as_str().to_string(),
                })?;
        }

        Ok(Self {
            config,
            registry,
            backend,
        })
    }

    /// The validated configuration this agent was built from.
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// The agent's capability registry.
    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Register an additional capability after construction.
    pub fn add_capability(&mut self, capability: Capability) -> ConfigResult<()> {
        self.registry
            .register(capability.clone())
            .map_err(|_| ConfigError::DuplicateCapability {
                name: capability.name().as_str().to_string(),
            })?;
        self.config.capabilities.push(capability);
        Ok(())
    }

    /// Run one full turn: prompt the model, resolve any capability calls
    /// it issues, and aggregate the results.
    pub async fn process(&self, input: &str) -> TendrilResult<ExecutionResult> {
        let mut messages = Vec::new();
        if !self.config.system_prompt.is_empty() {
            messages.push(ChatMessage::system(self.config.system_prompt.clone()));
        }
        messages.push(ChatMessage::user(input));

        let request = ExecutionRequest::new(self.config.model.clone(), messages)
            .with_temperature(self.config.generation.temperature)
            .with_max_tokens(self.config.generation.max_tokens)
            .with_tools(self.registry.descriptors());

        tracing::debug!(
            agent = %self.config.name,
            model = %self.config.model,
            tools = self.registry.len(),
            "Dispatching execution request"
        );

        let mut result = self.backend.execute(request).await?;

        if result.has_tool_calls() {
            tracing::debug!(
                agent = %self.config.name,
                calls = result.tool_calls.len(),
                "Resolving model-issued capability calls"
            );
            let tool_messages = self.resolve_tool_calls(&result.tool_calls).await?;
            result.messages.extend(tool_messages);
        }

        Ok(result)
    }

    /// Look up a capability by name and invoke its handler.
    ///
    /// Handler failures are wrapped with the original cause preserved.
    pub async fn execute_capability(
        &self,
        name: &str,
        args: CapabilityArgs,
    ) -> Result<Value, CapabilityError> {
        let capability = self
            .registry
            .get(name)
            .ok_or_else(|| CapabilityError::not_found(name))?;

        capability
            .handler()
            .invoke(args)
            .await
            .map_err(|cause| CapabilityError::execution_failed(name, cause.to_string()))
    }

    /// Resolve tool calls in batches of [`TOOL_CALL_BATCH_SIZE`].
    ///
    /// Calls within one batch are joined all-or-nothing: the first failure
    /// aborts the join, the whole resolution, and therefore the whole
    /// `process` call. Later batches are never started after a failure.
    /// With `parallel_capabilities` disabled, calls resolve strictly in
    /// order instead.
    async fn resolve_tool_calls(
        &self,
        calls: &[ToolCallRequest],
    ) -> TendrilResult<Vec<ChatMessage>> {
        let mut messages = Vec::with_capacity(calls.len());
        for batch in calls.chunks(TOOL_CALL_BATCH_SIZE) {
            if self.config.generation.parallel_capabilities {
                let batch_messages =
                    future::try_join_all(batch.iter().map(|call| self.resolve_call(call))).await?;
                messages.extend(batch_messages);
            } else {
                for call in batch {
                    messages.push(self.resolve_call(call).await?);
                }
            }
        }
        Ok(messages)
    }

    /// Resolve a single tool call into a tool-result message.
    async fn resolve_call(&self, call: &ToolCallRequest) -> TendrilResult<ChatMessage> {
        let name = call.function.name.as_str();
        let args = parse_arguments(name, &call.function.arguments)?;
        let value = self.execute_capability(name, args).await?;

        let content = match value {
            Value::String(text) => text,
            other => other.to_string(),
        };
        let mut message = ChatMessage::tool(content, name);
        message.tool_call_id = call.id.clone();
        Ok(message)
    }
}

/// Decode the model's JSON-encoded argument string into an argument map.
fn parse_arguments(name: &str, raw: &str) -> Result<CapabilityArgs, CapabilityError> {
    if raw.trim().is_empty() {
        return Ok(CapabilityArgs::new());
    }
    serde_json::from_str::<CapabilityArgs>(raw).map_err(|err| CapabilityError::InvalidArguments {
        name: name.to_string(),
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use serde_json::json;
    use tendril_core::{BackendError, BackendResult, ParameterSchema, TendrilError, TokenUsage};

    struct ScriptedBackend {
        result: Mutex<Option<BackendResult<ExecutionResult>>>,
    }

    impl ScriptedBackend {
        fn returning(result: BackendResult<ExecutionResult>) -> Arc<Self> {
            Arc::new(Self {
                result: Mutex::new(Some(result)),
            })
        }
    }

    #[async_trait]
    impl ModelBackend for ScriptedBackend {
        async fn execute(&self, _request: ExecutionRequest) -> BackendResult<ExecutionResult> {
            self.result
                .lock()
                .expect("scripted result lock")
                .take()
                .expect("backend called more than scripted")
        }
    }

    fn counting_capability(name: &str, counter: Arc<AtomicU32>) -> Capability {
        Capability::from_fn(name, "Counts invocations", ParameterSchema::new(), move |_args| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(json!("done"))
            }
        })
        .expect("valid capability name")
    }

    fn completion_with_calls(calls: Vec<ToolCallRequest>) -> ExecutionResult {
        ExecutionResult::with_tool_calls(
            vec![ChatMessage::assistant("")],
            calls,
            TokenUsage::default(),
        )
    }

    #[tokio::test]
    async fn invalid_config_fails_construction() {
        let backend = ScriptedBackend::returning(Err(BackendError::execution("unused")));
        let config = AgentConfig::new("", "gpt-4o");
        assert!(Agent::new(config, backend).is_err());
    }

    #[tokio::test]
    async fn backend_failure_is_returned_as_typed_error() {
        let backend = ScriptedBackend::returning(Err(BackendError::network("connection reset")));
        let agent = Agent::new(AgentConfig::new("assistant", "gpt-4o"), backend).unwrap();

        let err = agent.process("hello").await.unwrap_err();
        assert_eq!(err.code(), "NETWORK_ERROR");
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn process_resolves_issued_tool_calls() {
        let counter = Arc::new(AtomicU32::new(0));
        let backend = ScriptedBackend::returning(Ok(completion_with_calls(vec![
            ToolCallRequest::new("tick", "{}"),
            ToolCallRequest::new("tick", "{}"),
        ])));

        let config = AgentConfig::new("assistant", "gpt-4o")
            .with_capability(counting_capability("tick", Arc::clone(&counter)));
        let agent = Agent::new(config, backend).unwrap();

        let result = agent.process("go").await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        // One tool-result message appended per resolved call.
        let tool_messages = result
            .messages
            .iter()
            .filter(|m| m.tool_name.as_deref() == Some("tick"))
            .count();
        assert_eq!(tool_messages, 2);
    }

    #[tokio::test]
    async fn missing_capability_in_later_batch_prevents_following_calls() {
        let counter = Arc::new(AtomicU32::new(0));

        // Seven calls: the first batch of five succeeds, call six targets
        // a capability that does not exist, call seven must never run.
        let mut calls: Vec<ToolCallRequest> =
            (0..5).map(|_| ToolCallRequest::new("tick", "{}")).collect();
        calls.push(ToolCallRequest::new("missing", "{}"));
        calls.push(ToolCallRequest::new("tick", "{}"));

        let backend = ScriptedBackend::returning(Ok(completion_with_calls(calls)));
        let config = AgentConfig::new("assistant", "gpt-4o")
            .with_capability(counting_capability("tick", Arc::clone(&counter)));
        let agent = Agent::new(config, backend).unwrap();

        let err = agent.process("go").await.unwrap_err();
        assert_eq!(err.code(), "CAPABILITY_NOT_FOUND");
        assert_eq!(counter.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn sequential_mode_resolves_calls_in_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let order_clone = Arc::clone(&order);
        let record = Capability::from_fn(
            "record",
            "Records its argument",
            ParameterSchema::new(),
            move |args| {
                let order = Arc::clone(&order_clone);
                async move {
                    let index = args.get("i").and_then(Value::as_u64).unwrap_or(0);
                    order.lock().expect("order lock").push(index);
                    Ok(Value::Null)
                }
            },
        )
        .unwrap();

        let calls = (0..3)
            .map(|i| ToolCallRequest::new("record", format!("{{\"i\":{}}}", i)))
            .collect();
        let backend = ScriptedBackend::returning(Ok(completion_with_calls(calls)));

        let mut config = AgentConfig::new("assistant", "gpt-4o").with_capability(record);
        config.generation.parallel_capabilities = false;
        let agent = Agent::new(config, backend).unwrap();

        agent.process("go").await.unwrap();
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn execute_capability_wraps_handler_failures() {
        let failing = Capability::from_fn(
            "fragile",
            "Always fails",
            ParameterSchema::new(),
            |_args| async { Err("disk on fire".into()) },
        )
        .unwrap();

        let backend = ScriptedBackend::returning(Err(BackendError::execution("unused")));
        let config = AgentConfig::new("assistant", "gpt-4o").with_capability(failing);
        let agent = Agent::new(config, backend).unwrap();

        let err = agent
            .execute_capability("fragile", CapabilityArgs::new())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "CAPABILITY_EXECUTION_FAILED");
        assert!(err.to_string().contains("disk on fire"));
    }

    #[tokio::test]
    async fn malformed_arguments_are_rejected() {
        let backend = ScriptedBackend::returning(Ok(completion_with_calls(vec![
            ToolCallRequest::new("tick", "not json"),
        ])));
        let counter = Arc::new(AtomicU32::new(0));
        let config = AgentConfig::new("assistant", "gpt-4o")
            .with_capability(counting_capability("tick", counter));
        let agent = Agent::new(config, backend).unwrap();

        let err = agent.process("go").await.unwrap_err();
        assert!(matches!(
            err,
            TendrilError::Capability(CapabilityError::InvalidArguments { .. })
        ));
    }

    #[tokio::test]
    async fn add_capability_rejects_duplicates() {
        let counter = Arc::new(AtomicU32::new(0));
        let backend = ScriptedBackend::returning(Err(BackendError::execution("unused")));
        let config = AgentConfig::new("assistant", "gpt-4o")
            .with_capability(counting_capability("tick", Arc::clone(&counter)));
        let mut agent = Agent::new(config, backend).unwrap();

        let duplicate = counting_capability("tick", counter);
        assert!(matches!(
            agent.add_capability(duplicate),
            Err(ConfigError::DuplicateCapability { .. })
        ));
    }
}
