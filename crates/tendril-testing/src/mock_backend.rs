//! # Mock Model Backend
//!
//! A scripted [`ModelBackend`] for driving agents in tests: queue up
//! results or failures, then inspect the requests the agent assembled.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream;
use tendril_core::{
    BackendError, BackendResult, ChatMessage, ChunkStream, ExecutionRequest, ExecutionResult,
    ModelBackend, StreamChunk, TokenUsage, ToolCallRequest,
};

/// Scripted backend: pops one queued outcome per `execute` call.
///
/// Clones share the script and the captured requests. An exhausted queue
/// yields a plain "mock response" completion rather than panicking.
#[derive(Clone, Default)]
pub struct MockBackend {
    script: Arc<Mutex<VecDeque<BackendResult<ExecutionResult>>>>,
    chunks: Arc<Mutex<VecDeque<Vec<StreamChunk>>>>,
    requests: Arc<Mutex<Vec<ExecutionRequest>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw outcome.
    pub fn with_result(self, result: BackendResult<ExecutionResult>) -> Self {
        self.script.lock().unwrap().push_back(result);
        self
    }

    /// Queue a plain text completion.
    pub fn with_completion(self, text: impl Into<String>) -> Self {
        self.with_result(Ok(ExecutionResult::completion(
            vec![ChatMessage::assistant(text)],
            TokenUsage::default(),
        )))
    }

    /// Queue a result carrying model-issued tool calls.
    pub fn with_tool_calls(self, calls: Vec<ToolCallRequest>) -> Self {
        self.with_result(Ok(ExecutionResult::with_tool_calls(
            vec![ChatMessage::assistant("")],
            calls,
            TokenUsage::default(),
        )))
    }

    /// Queue a backend failure.
    pub fn with_error(self, error: BackendError) -> Self {
        self.with_result(Err(error))
    }

    /// Queue one streaming response as a chunk sequence.
    pub fn with_stream(self, chunks: Vec<StreamChunk>) -> Self {
        self.chunks.lock().unwrap().push_back(chunks);
        self
    }

    /// Number of `execute` calls made so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// The requests the agent assembled, in call order.
    pub fn requests(&self) -> Vec<ExecutionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The most recent request, if any call was made.
    pub fn last_request(&self) -> Option<ExecutionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ModelBackend for MockBackend {
    async fn execute(&self, request: ExecutionRequest) -> BackendResult<ExecutionResult> {
        self.requests.lock().unwrap().push(request);
        self.script.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(ExecutionResult::completion(
                vec![ChatMessage::assistant("mock response")],
                TokenUsage::default(),
            ))
        })
    }

    async fn execute_stream(&self, request: ExecutionRequest) -> BackendResult<ChunkStream> {
        self.requests.lock().unwrap().push(request);
        let chunks = self
            .chunks
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| BackendError::execution("No streamed response scripted"))?;
        Ok(Box::pin(stream::iter(chunks)))
    }
}
