//! Capability registry.
//!
//! Registries are plain values constructed by their owning agent and
//! injected wherever lookup is needed; there is no global registry.

use std::collections::HashMap;

use tendril_core::{
    Capability, CapabilityError, CapabilityName, CapabilityResult, ToolDescriptor,
};

/// Name-keyed store of the capabilities one agent may invoke.
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    capabilities: HashMap<CapabilityName, Capability>,
}

impl CapabilityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            capabilities: HashMap::new(),
        }
    }

    /// Register a capability, rejecting duplicate names.
    pub fn register(&mut self, capability: Capability) -> CapabilityResult<()> {
        let name = capability.name().clone();
        if self.capabilities.contains_key(&name) {
            return Err(CapabilityError::AlreadyRegistered {
                name: name.as_str().to_string(),
            });
        }
        self.capabilities.insert(name, capability);
        Ok(())
    }

    /// Register a capability using the builder pattern.
    pub fn with_capability(mut self, capability: Capability) -> CapabilityResult<Self> {
        self.register(capability)?;
        Ok(self)
    }

    /// Look up a capability by name.
    pub fn get(&self, name: &str) -> Option<&Capability> {
        let parsed = CapabilityName::parse(name).ok()?;
        self.capabilities.get(&parsed)
    }

    /// Whether a capability with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names of all registered capabilities, sorted for stable output.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .capabilities
            .keys()
            .map(|name| name.as_str().to_string())
            .collect();
        names.sort();
        names
    }

    /// Project every registered capability into a tool descriptor.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        let mut entries: Vec<&Capability> = self.capabilities.values().collect();
        entries.sort_by(|a, b| a.name().cmp(b.name()));
        entries
            .into_iter()
            .map(ToolDescriptor::from_capability)
            .collect()
    }

    /// Number of registered capabilities.
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tendril_core::ParameterSchema;

    fn capability(name: &str) -> Capability {
        Capability::from_fn(name, "Test capability", ParameterSchema::new(), |_args| async {
            Ok(Value::Null)
        })
        .expect("valid capability name")
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = CapabilityRegistry::new();
        registry.register(capability("search")).unwrap();

        assert!(registry.contains("search"));
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = CapabilityRegistry::new();
        registry.register(capability("search")).unwrap();

        let err = registry.register(capability("search")).unwrap_err();
        assert_eq!(err.code(), "DUPLICATE_CAPABILITY");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn descriptors_are_sorted_by_name() {
        let registry = CapabilityRegistry::new()
            .with_capability(capability("zeta"))
            .unwrap()
            .with_capability(capability("alpha"))
            .unwrap();

        let descriptors = registry.descriptors();
        assert_eq!(descriptors[0].name, "alpha");
        assert_eq!(descriptors[1].name, "zeta");
    }
}
