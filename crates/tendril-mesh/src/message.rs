//! Message envelope types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tendril_core::{IdentifierRules, ValidationError};
use uuid::Uuid;

/// Unique message identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Generate a fresh id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated topic name.
///
/// Topics use the namespaced identifier set, so dotted names like
/// `workflow.completed` work.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Topic(String);

impl Topic {
    /// Parse and validate a topic name.
    pub fn parse(topic: &str) -> Result<Self, ValidationError> {
        IdentifierRules::CONTEXT_KEY.validate(topic).map(Topic)
    }

    /// Get the topic as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Topic {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Topic::parse(&value)
    }
}

impl From<Topic> for String {
    fn from(topic: Topic) -> Self {
        topic.0
    }
}

/// A published message: identity, topic, payload, and publish time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Generated message identity, logged alongside handler failures
    pub id: MessageId,
    /// Topic the message was published under
    pub topic: Topic,
    /// Arbitrary JSON payload
    pub payload: Value,
    /// UTC publish timestamp
    pub timestamp: DateTime<Utc>,
}

impl Envelope {
    /// Wrap a payload for publishing under a topic.
    pub fn new(topic: Topic, payload: Value) -> Self {
        Self {
            id: MessageId::new(),
            topic,
            payload,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn topics_are_validated() {
        assert!(Topic::parse("workflow.completed").is_ok());
        assert!(Topic::parse("agent:started").is_ok());
        assert!(Topic::parse("").is_err());
        assert!(Topic::parse("has space").is_err());
    }

    #[test]
    fn envelopes_carry_identity_and_timestamp() {
        let topic = Topic::parse("agent.started").unwrap();
        let a = Envelope::new(topic.clone(), json!({"agent": "alpha"}));
        let b = Envelope::new(topic, json!({"agent": "alpha"}));

        assert_ne!(a.id, b.id);
        assert_eq!(a.payload["agent"], "alpha");
    }

    #[test]
    fn envelope_serializes_round_trip() {
        let envelope = Envelope::new(
            Topic::parse("workflow.completed").unwrap(),
            json!({"steps": 3}),
        );
        let text = serde_json::to_string(&envelope).unwrap();
        let back: Envelope = serde_json::from_str(&text).unwrap();
        assert_eq!(envelope, back);
    }
}
