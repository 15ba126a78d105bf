//! Agent configuration with atomic validation.
//!
//! An [`AgentConfig`] is validated as a whole before any agent is built:
//! the first violation fails construction and no partially-configured
//! agent ever exists.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::capability::Capability;
use crate::error::{ConfigError, ConfigResult};

/// Sampling and dispatch parameters for model generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Sampling temperature, `0.0..=2.0`
    pub temperature: f64,
    /// Maximum completion tokens requested from the backend
    pub max_tokens: u32,
    /// Nucleus sampling cutoff, `0.0..=1.0`
    pub top_p: f64,
    /// Presence penalty, `-2.0..=2.0`
    pub presence_penalty: f64,
    /// Frequency penalty, `-2.0..=2.0`
    pub frequency_penalty: f64,
    /// Whether model-issued capability calls may resolve concurrently
    pub parallel_capabilities: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2048,
            top_p: 1.0,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
            parallel_capabilities: true,
        }
    }
}

impl GenerationParams {
    /// Check every parameter against its allowed range.
    pub fn validate(&self) -> ConfigResult<()> {
        check_range("temperature", self.temperature, 0.0, 2.0)?;
        check_range("top_p", self.top_p, 0.0, 1.0)?;
        check_range("presence_penalty", self.presence_penalty, -2.0, 2.0)?;
        check_range("frequency_penalty", self.frequency_penalty, -2.0, 2.0)?;
        Ok(())
    }
}

fn check_range(parameter: &'static str, value: f64, min: f64, max: f64) -> ConfigResult<()> {
    if value < min || value > max || value.is_nan() {
        return Err(ConfigError::OutOfRange {
            parameter,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Complete configuration for one agent instance.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Stable identifier, generated when not supplied
    pub id: String,
    /// Human-readable agent name
    pub name: String,
    /// Model identifier passed through to the backend
    pub model: String,
    /// System prompt prepended to every conversation
    pub system_prompt: String,
    /// Capabilities the agent may invoke
    pub capabilities: Vec<Capability>,
    /// Generation parameters
    pub generation: GenerationParams,
}

impl AgentConfig {
    /// Create a configuration with a generated id and default generation
    /// parameters.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            model: model.into(),
            system_prompt: String::new(),
            capabilities: Vec::new(),
            generation: GenerationParams::default(),
        }
    }

    /// Set an explicit id using the builder pattern.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the system prompt using the builder pattern.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Append a capability using the builder pattern.
    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    /// Set generation parameters using the builder pattern.
    pub fn with_generation(mut self, generation: GenerationParams) -> Self {
        self.generation = generation;
        self
    }

    /// Validate the whole configuration.
    ///
    /// Checks required fields, generation parameter ranges, and that no
    /// two capabilities share a name. The first violation wins.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "name" });
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "model" });
        }
        self.generation.validate()?;

        let mut seen = std::collections::HashSet::new();
        for capability in &self.capabilities {
            if !seen.insert(capability.name().as_str()) {
                return Err(ConfigError::DuplicateCapability {
                    name: capability.name().as_str().to_string(),
                });
            }
        }
        Ok(())
    }
}
