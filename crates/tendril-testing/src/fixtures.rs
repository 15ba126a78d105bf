//! Ready-made configurations for tests.

use serde_json::Value;
use tendril_core::{
    AgentConfig, Capability, GenerationParams, ParameterSchema, ParameterSpec,
};

/// A minimal valid agent configuration against the mock model.
pub fn agent_config(name: impl Into<String>) -> AgentConfig {
    AgentConfig::new(name, "mock-model").with_system_prompt("You are a test agent.")
}

/// A valid configuration carrying the given capabilities.
pub fn agent_config_with(
    name: impl Into<String>,
    capabilities: Vec<Capability>,
) -> AgentConfig {
    let mut config = agent_config(name);
    config.capabilities = capabilities;
    config
}

/// Deterministic generation parameters for reproducible assertions.
pub fn deterministic_params() -> GenerationParams {
    GenerationParams {
        temperature: 0.0,
        max_tokens: 256,
        top_p: 1.0,
        presence_penalty: 0.0,
        frequency_penalty: 0.0,
        parallel_capabilities: true,
    }
}

/// An echo capability with a one-parameter schema.
pub fn echo_capability() -> Capability {
    Capability::from_fn(
        "echo",
        "Echoes the text argument back",
        ParameterSchema::new().with_parameter("text", ParameterSpec::required_string("Text to echo")),
        |args| async move {
            Ok(args.get("text").cloned().unwrap_or(Value::Null))
        },
    )
    .expect("echo is a valid capability name")
}
