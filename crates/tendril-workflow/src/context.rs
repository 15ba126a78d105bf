//! Typed workflow context.
//!
//! The context is the data bag threaded through a workflow's steps: each
//! step receives the current context and returns the context the next step
//! sees. Keys are validated identifiers; values are JSON with typed
//! accessors on top.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tendril_core::{IdentifierRules, ValidationError};

/// Validated context key.
///
/// Allows namespacing characters (`.` and `:`) on top of the usual
/// identifier set, so keys like `research.summary` work.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContextKey(String);

impl ContextKey {
    /// Parse and validate a context key.
    pub fn parse(key: &str) -> Result<Self, ValidationError> {
        IdentifierRules::CONTEXT_KEY.validate(key).map(ContextKey)
    }

    /// Get the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ContextKey {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ContextKey::parse(&value)
    }
}

impl From<ContextKey> for String {
    fn from(key: ContextKey) -> Self {
        key.0
    }
}

/// The data bag a workflow threads through its steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowContext(BTreeMap<ContextKey, Value>);

impl WorkflowContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert a value under a raw key, validating the key.
    pub fn insert(
        &mut self,
        key: &str,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, ValidationError> {
        let key = ContextKey::parse(key)?;
        Ok(self.0.insert(key, value.into()))
    }

    /// Insert a value using the builder pattern.
    pub fn with_value(
        mut self,
        key: &str,
        value: impl Into<Value>,
    ) -> Result<Self, ValidationError> {
        self.insert(key, value)?;
        Ok(self)
    }

    /// Look up a raw JSON value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let key = ContextKey::parse(key).ok()?;
        self.0.get(&key)
    }

    /// Look up a value and deserialize it into a concrete type.
    ///
    /// Returns `None` when the key is absent or the value does not
    /// deserialize into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Whether a key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Remove a key, returning its value if present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let key = ContextKey::parse(key).ok()?;
        self.0.remove(&key)
    }

    /// Iterate over keys and values in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&ContextKey, &Value)> {
        self.0.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the context is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
