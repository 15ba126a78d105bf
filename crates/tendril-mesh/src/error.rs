//! Error types for bus operations

use thiserror::Error;

/// Result type for bus operations
pub type BusResult<T> = Result<T, BusError>;

/// Errors that can occur during message bus operations
#[derive(Error, Debug)]
pub enum BusError {
    /// Topic name failed identifier validation
    #[error("Invalid topic: {0}")]
    InvalidTopic(String),

    /// A subscriber's handler failed while processing a message
    #[error("Handler failed for message {message_id} on '{topic}': {cause}")]
    HandlerFailed {
        topic: String,
        message_id: String,
        cause: String,
    },

    /// Payload serialization failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Subscription handle was already consumed
    #[error("Subscription already cancelled for topic '{0}'")]
    AlreadyUnsubscribed(String),
}

impl From<serde_json::Error> for BusError {
    fn from(err: serde_json::Error) -> Self {
        BusError::SerializationFailed(err.to_string())
    }
}
