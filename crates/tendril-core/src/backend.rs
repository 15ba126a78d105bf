//! Model backend abstraction.
//!
//! A [`ModelBackend`] turns an [`ExecutionRequest`] into an
//! [`ExecutionResult`]. Backends are constructor-injected so agents can be
//! wired to production providers or to scripted mocks without any global
//! state.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::capability::Capability;
use crate::error::{BackendError, BackendResult};
use crate::message::{ChatMessage, ExecutionResult, StreamChunk};

/// Tool descriptor projected from a capability for the model's benefit.
///
/// The `parameters` value is a JSON schema object with `type`,
/// `properties`, and a `required` list derived from the capability's
/// parameter flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDescriptor {
    /// Project a capability's declared schema into descriptor form.
    pub fn from_capability(capability: &Capability) -> Self {
        Self {
            name: capability.name().as_str().to_string(),
            description: capability.description().to_string(),
            parameters: json!({
                "type": "object",
                "properties": capability.parameters().to_json_schema(),
                "required": capability.parameters().required_names(),
            }),
        }
    }
}

/// One fully-assembled request to a model backend.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub tools: Vec<ToolDescriptor>,
    pub stream: bool,
}

impl ExecutionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            model: model.into(),
            temperature: 0.7,
            max_tokens: 2048,
            tools: Vec::new(),
            stream: false,
        }
    }

    /// Set the sampling temperature using the builder pattern.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the completion token budget using the builder pattern.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Attach tool descriptors using the builder pattern.
    pub fn with_tools(mut self, tools: Vec<ToolDescriptor>) -> Self {
        self.tools = tools;
        self
    }

    /// Request a streaming response using the builder pattern.
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }
}

/// Boxed chunk stream returned by streaming backends.
pub type ChunkStream = Pin<Box<dyn Stream<Item = StreamChunk> + Send>>;

/// A model provider capable of executing assembled requests.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Execute a request and return the complete result.
    async fn execute(&self, request: ExecutionRequest) -> BackendResult<ExecutionResult>;

    /// Execute a request as a chunk stream.
    ///
    /// Backends without streaming support keep the default, which reports
    /// an execution error.
    async fn execute_stream(&self, request: ExecutionRequest) -> BackendResult<ChunkStream> {
        let _ = request;
        Err(BackendError::execution("Streaming is not supported by this backend"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{ParameterKind, ParameterSchema, ParameterSpec};

    fn search_capability() -> Capability {
        Capability::from_fn(
            "search",
            "Search the knowledge base",
            ParameterSchema::new()
                .with_parameter("query", ParameterSpec::required_string("Search query"))
                .with_parameter(
                    "limit",
                    ParameterSpec::new(ParameterKind::Number, "Max results"),
                ),
            |_args| async { Ok(Value::Null) },
        )
        .expect("valid capability name")
    }

    #[test]
    fn descriptor_projects_schema_and_required_list() {
        let descriptor = ToolDescriptor::from_capability(&search_capability());

        assert_eq!(descriptor.name, "search");
        assert_eq!(descriptor.parameters["type"], "object");
        assert_eq!(
            descriptor.parameters["properties"]["query"]["type"],
            "string"
        );
        assert_eq!(descriptor.parameters["required"], json!(["query"]));
    }

    #[test]
    fn request_builder_sets_fields() {
        let request = ExecutionRequest::new("gpt-4o", vec![ChatMessage::user("hi")])
            .with_temperature(0.2)
            .with_max_tokens(512)
            .with_stream(true);

        assert_eq!(request.model, "gpt-4o");
        assert_eq!(request.temperature, 0.2);
        assert_eq!(request.max_tokens, 512);
        assert!(request.stream);
        assert!(request.tools.is_empty());
    }
}
