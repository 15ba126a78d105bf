//! Capability model: named, schema-described async operations an agent can invoke.
//!
//! A [`Capability`] pairs a validated name and a parameter schema with an
//! async handler. Capabilities are declared at agent-configuration time and
//! are immutable afterwards; the schema is what gets projected into the tool
//! descriptors a model backend sees.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validation::{IdentifierRules, ValidationError};

/// Boxed error type produced by capability handlers.
///
/// Handlers may fail with arbitrary errors; the agent pipeline wraps them
/// into a typed [`CapabilityError`](crate::error::CapabilityError) with the
/// original cause preserved.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Argument map passed to a capability handler.
pub type CapabilityArgs = serde_json::Map<String, Value>;

/// Validated capability name.
///
/// Guarantees the name is non-empty, bounded in length, and contains only
/// identifier-safe characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CapabilityName(String);

impl CapabilityName {
    /// Parse and validate a capability name.
    pub fn parse(name: &str) -> Result<Self, ValidationError> {
        IdentifierRules::CAPABILITY_NAME
            .validate(name)
            .map(CapabilityName)
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CapabilityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for CapabilityName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CapabilityName::parse(&value)
    }
}

impl From<CapabilityName> for String {
    fn from(name: CapabilityName) -> Self {
        name.0
    }
}

/// The JSON-schema-like kind of a capability parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

impl ParameterKind {
    /// Get the JSON schema type name for this kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParameterKind::String => "string",
            ParameterKind::Number => "number",
            ParameterKind::Boolean => "boolean",
            ParameterKind::Object => "object",
            ParameterKind::Array => "array",
        }
    }
}

/// Schema for a single capability parameter.
///
/// Array parameters describe their elements through `items`; object
/// parameters describe their fields through `properties`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Parameter kind (string, number, boolean, object, array)
    pub kind: ParameterKind,
    /// Human-readable description shown to the model
    pub description: String,
    /// Whether the parameter must be present in tool calls
    #[serde(default)]
    pub required: bool,
    /// Allowed values, for enumerated string parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,
    /// Element schema, for array parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ParameterSpec>>,
    /// Field schemas, for object parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, ParameterSpec>>,
}

impl ParameterSpec {
    /// Create a parameter spec with the given kind and description.
    pub fn new(kind: ParameterKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            required: false,
            allowed_values: None,
            items: None,
            properties: None,
        }
    }

    /// Create a required string parameter.
    pub fn required_string(description: impl Into<String>) -> Self {
        Self::new(ParameterKind::String, description).required()
    }

    /// Mark this parameter as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Restrict this parameter to an enumerated set of values.
    pub fn with_allowed_values(mut self, values: Vec<String>) -> Self {
        self.allowed_values = Some(values);
        self
    }

    /// Render this spec as a JSON schema fragment.
    pub fn to_json_schema(&self) -> Value {
        let mut schema = serde_json::Map::new();
        schema.insert("type".into(), Value::String(self.kind.type_name().into()));
        schema.insert(
            "description".into(),
            Value::String(self.description.clone()),
        );
        if let Some(values) = &self.allowed_values {
            schema.insert(
                "enum".into(),
                Value::Array(values.iter().cloned().map(Value::String).collect()),
            );
        }
        if let Some(items) = &self.items {
            schema.insert("items".into(), items.to_json_schema());
        }
        if let Some(properties) = &self.properties {
            let props: serde_json::Map<String, Value> = properties
                .iter()
                .map(|(name, spec)| (name.clone(), spec.to_json_schema()))
                .collect();
            schema.insert("properties".into(), Value::Object(props));
        }
        Value::Object(schema)
    }
}

/// Ordered mapping of parameter name to spec for one capability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema(BTreeMap<String, ParameterSpec>);

impl ParameterSchema {
    /// Create an empty parameter schema.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Add a parameter using the builder pattern.
    pub fn with_parameter(mut self, name: impl Into<String>, spec: ParameterSpec) -> Self {
        self.0.insert(name.into(), spec);
        self
    }

    /// Names of all parameters marked required, in schema order.
    pub fn required_names(&self) -> Vec<String> {
        self.0
            .iter()
            .filter(|(_, spec)| spec.required)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Iterate over parameter names and specs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParameterSpec)> {
        self.0.iter()
    }

    /// Check whether the schema declares no parameters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render the schema as a JSON schema `properties` object.
    pub fn to_json_schema(&self) -> Value {
        let props: serde_json::Map<String, Value> = self
            .0
            .iter()
            .map(|(name, spec)| (name.clone(), spec.to_json_schema()))
            .collect();
        Value::Object(props)
    }
}

/// Async handler invoked when a model issues a tool call for a capability.
#[async_trait]
pub trait CapabilityHandler: Send + Sync {
    /// Invoke the handler with an argument map matching the declared schema.
    async fn invoke(&self, args: CapabilityArgs) -> Result<Value, HandlerError>;
}

type BoxedHandlerFn = Arc<
    dyn Fn(CapabilityArgs) -> Pin<Box<dyn Future<Output = Result<Value, HandlerError>> + Send>>
        + Send
        + Sync,
>;

/// Closure adapter implementing [`CapabilityHandler`].
#[derive(Clone)]
pub struct FnHandler {
    func: BoxedHandlerFn,
}

impl FnHandler {
    /// Wrap an async closure as a capability handler.
    pub fn new<F, Fut>(func: F) -> Self
    where
        F: Fn(CapabilityArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
    {
        Self {
            func: Arc::new(move |args| Box::pin(func(args))),
        }
    }
}

#[async_trait]
impl CapabilityHandler for FnHandler {
    async fn invoke(&self, args: CapabilityArgs) -> Result<Value, HandlerError> {
        (self.func)(args).await
    }
}

/// A named, schema-described async operation an agent can invoke.
#[derive(Clone)]
pub struct Capability {
    name: CapabilityName,
    description: String,
    parameters: ParameterSchema,
    handler: Arc<dyn CapabilityHandler>,
}

impl Capability {
    /// Create a capability from a raw name, validating it.
    pub fn new(
        name: &str,
        description: impl Into<String>,
        parameters: ParameterSchema,
        handler: Arc<dyn CapabilityHandler>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            name: CapabilityName::parse(name)?,
            description: description.into(),
            parameters,
            handler,
        })
    }

    /// Create a capability from an async closure handler.
    pub fn from_fn<F, Fut>(
        name: &str,
        description: impl Into<String>,
        parameters: ParameterSchema,
        func: F,
    ) -> Result<Self, ValidationError>
    where
        F: Fn(CapabilityArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
    {
        Self::new(name, description, parameters, Arc::new(FnHandler::new(func)))
    }

    /// The capability's validated name.
    pub fn name(&self) -> &CapabilityName {
        &self.name
    }

    /// Human-readable description of what the capability does.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The declared parameter schema.
    pub fn parameters(&self) -> &ParameterSchema {
        &self.parameters
    }

    /// The shared handler for this capability.
    pub fn handler(&self) -> Arc<dyn CapabilityHandler> {
        Arc::clone(&self.handler)
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_requires_valid_name() {
        let handler = Arc::new(FnHandler::new(|_args| async {
            Ok(Value::String("ok".into()))
        }));

        let valid = Capability::new("echo", "Echo input", ParameterSchema::new(), handler.clone());
        assert!(valid.is_ok());

        let invalid = Capability::new("", "Nameless", ParameterSchema::new(), handler);
        assert_eq!(invalid.unwrap_err(), ValidationError::Empty);
    }

    #[test]
    fn required_names_filters_by_required_flag() {
        let schema = ParameterSchema::new()
            .with_parameter("query", ParameterSpec::required_string("Search query"))
            .with_parameter(
                "limit",
                ParameterSpec::new(ParameterKind::Number, "Max results"),
            );

        assert_eq!(schema.required_names(), vec!["query".to_string()]);
    }

    #[test]
    fn parameter_spec_renders_json_schema() {
        let spec = ParameterSpec::required_string("Output format")
            .with_allowed_values(vec!["json".into(), "text".into()]);

        let schema = spec.to_json_schema();
        assert_eq!(schema["type"], "string");
        assert_eq!(schema["enum"][0], "json");
    }

    #[tokio::test]
    async fn fn_handler_invokes_closure() {
        let handler = FnHandler::new(|args: CapabilityArgs| async move {
            let name = args
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("world");
            Ok(Value::String(format!("hello {}", name)))
        });

        let mut args = CapabilityArgs::new();
        args.insert("name".into(), Value::String("tendril".into()));

        let result = handler.invoke(args).await.unwrap();
        assert_eq!(result, Value::String("hello tendril".into()));
    }
}
