//! Chat messages and model execution results.
//!
//! These are the shapes exchanged with a model backend: the messages sent
//! in, and the [`ExecutionResult`] that comes back — either whole, or
//! accumulated chunk-by-chunk from a streaming response.

use serde::{Deserialize, Serialize};

/// Role of a chat message participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A single message in a model conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who produced the message
    pub role: Role,
    /// Message text
    pub content: String,
    /// Optional participant name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Tool call this message responds to, for `Role::Tool` messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Name of the tool that produced this message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(Role::System, content)
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(Role::User, content)
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(Role::Assistant, content)
    }

    /// Create a tool-result message attributed to a named capability.
    pub fn tool(content: impl Into<String>, tool_name: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            name: None,
            tool_call_id: None,
            tool_name: Some(tool_name.into()),
        }
    }

    fn plain(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            name: None,
            tool_call_id: None,
            tool_name: None,
        }
    }
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
    FunctionCall,
}

/// Token accounting for one model invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    /// Sum another usage into this one.
    pub fn accumulate(&mut self, other: &TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

/// A model-issued request to invoke a capability.
///
/// Ephemeral: created per `process()` call and consumed immediately by the
/// batching dispatcher. Arguments arrive JSON-encoded exactly as the model
/// produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Backend-assigned call identifier, when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The requested function invocation
    pub function: FunctionCall,
}

/// The function half of a tool call: name plus JSON-encoded arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

impl ToolCallRequest {
    /// Create a tool call request for a named capability.
    pub fn new(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: None,
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

/// The outcome of one model invocation.
///
/// Immutable once returned by a backend. The agent pipeline appends
/// tool-result messages while resolving tool calls and returns the
/// aggregate to its caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Ordered message sequence produced by the invocation
    pub messages: Vec<ChatMessage>,
    /// Tool calls the model issued, if any
    #[serde(default)]
    pub tool_calls: Vec<ToolCallRequest>,
    /// Why generation stopped
    pub finish_reason: FinishReason,
    /// Token accounting
    pub usage: TokenUsage,
}

impl ExecutionResult {
    /// Create a plain completion result with no tool calls.
    pub fn completion(messages: Vec<ChatMessage>, usage: TokenUsage) -> Self {
        Self {
            messages,
            tool_calls: Vec::new(),
            finish_reason: FinishReason::Stop,
            usage,
        }
    }

    /// Create a result carrying model-issued tool calls.
    pub fn with_tool_calls(
        messages: Vec<ChatMessage>,
        tool_calls: Vec<ToolCallRequest>,
        usage: TokenUsage,
    ) -> Self {
        Self {
            messages,
            tool_calls,
            finish_reason: FinishReason::ToolCalls,
            usage,
        }
    }

    /// Check whether the model requested any tool calls.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Drain a stream of chunks into a single result.
    ///
    /// Streamed responses arrive as deltas; this accumulates content,
    /// tool calls, and usage in arrival order, keeping the last reported
    /// finish reason.
    pub async fn drain<S>(stream: S) -> ExecutionResult
    where
        S: futures::Stream<Item = StreamChunk>,
    {
        use futures::StreamExt;

        let mut result = ExecutionResult {
            messages: Vec::new(),
            tool_calls: Vec::new(),
            finish_reason: FinishReason::Length,
            usage: TokenUsage::default(),
        };

        futures::pin_mut!(stream);
        while let Some(chunk) = stream.next().await {
            if let Some(content) = chunk.content {
                result.messages.push(ChatMessage::assistant(content));
            }
            result.tool_calls.extend(chunk.tool_calls);
            if let Some(reason) = chunk.finish_reason {
                result.finish_reason = reason;
            }
            if let Some(usage) = chunk.usage {
                result.usage.accumulate(&usage);
            }
        }

        result
    }
}

/// One delta of a streaming model response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Content delta, if the chunk carried text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Tool calls completed in this chunk
    #[serde(default)]
    pub tool_calls: Vec<ToolCallRequest>,
    /// Finish reason, reported on the final chunk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
    /// Usage accounting, when the backend reports it per chunk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}
