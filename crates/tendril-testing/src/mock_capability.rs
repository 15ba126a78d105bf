//! # Mock Capabilities for Testing
//!
//! Mock capability handlers that return predictable responses, allowing
//! for reliable and controlled agent testing scenarios.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tendril_core::{
    Capability, CapabilityArgs, CapabilityHandler, HandlerError, ParameterSchema,
};

/// A mock capability that returns predefined responses based on argument
/// patterns.
///
/// Clones share call tracking, so tests keep one handle while the agent
/// owns another.
#[derive(Debug, Clone)]
pub struct MockCapability {
    name: String,
    responses: HashMap<String, Result<Value, String>>,
    default_response: Option<Result<Value, String>>,
    call_count: Arc<Mutex<usize>>,
    call_history: Arc<Mutex<Vec<CapabilityArgs>>>,
}

impl MockCapability {
    /// Create a new mock capability with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            responses: HashMap::new(),
            default_response: None,
            call_count: Arc::new(Mutex::new(0)),
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response for a specific argument map.
    pub fn with_response(mut self, args: &CapabilityArgs, response: Value) -> Self {
        self.responses.insert(Self::key(args), Ok(response));
        self
    }

    /// Add a failure for a specific argument map.
    pub fn with_failure(mut self, args: &CapabilityArgs, error: impl Into<String>) -> Self {
        self.responses.insert(Self::key(args), Err(error.into()));
        self
    }

    /// Set a default response for any unmatched arguments.
    pub fn with_default_response(mut self, response: Value) -> Self {
        self.default_response = Some(Ok(response));
        self
    }

    /// Set a default failure for any unmatched arguments.
    pub fn with_default_failure(mut self, error: impl Into<String>) -> Self {
        self.default_response = Some(Err(error.into()));
        self
    }

    /// Get the number of times this capability has been invoked.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Get the history of argument maps passed to this capability.
    pub fn call_history(&self) -> Vec<CapabilityArgs> {
        self.call_history.lock().unwrap().clone()
    }

    /// Reset call count and history.
    pub fn reset(&self) {
        *self.call_count.lock().unwrap() = 0;
        self.call_history.lock().unwrap().clear();
    }

    /// Check if the capability was invoked with specific arguments.
    pub fn was_called_with(&self, args: &CapabilityArgs) -> bool {
        self.call_history.lock().unwrap().contains(args)
    }

    /// Wrap this mock into a registrable [`Capability`].
    pub fn into_capability(self) -> Capability {
        self.into_capability_with_schema(ParameterSchema::new())
    }

    /// Wrap this mock into a [`Capability`] with a declared schema.
    pub fn into_capability_with_schema(self, schema: ParameterSchema) -> Capability {
        let name = self.name.clone();
        Capability::new(&name, "Mock capability", schema, Arc::new(self))
            .expect("mock capability name must be a valid identifier")
    }

    fn key(args: &CapabilityArgs) -> String {
        // serde_json maps are ordered, so serialization is canonical.
        Value::Object(args.clone()).to_string()
    }
}

#[async_trait]
impl CapabilityHandler for MockCapability {
    async fn invoke(&self, args: CapabilityArgs) -> Result<Value, HandlerError> {
        *self.call_count.lock().unwrap() += 1;
        self.call_history.lock().unwrap().push(args.clone());

        let outcome = self
            .responses
            .get(&Self::key(&args))
            .or(self.default_response.as_ref())
            .cloned()
            .unwrap_or(Ok(Value::Null));

        outcome.map_err(HandlerError::from)
    }
}
