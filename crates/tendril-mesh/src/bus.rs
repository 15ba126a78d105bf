//! Type-keyed in-process message bus.
//!
//! Handlers are keyed by topic. Publishing dispatches to every handler
//! for the topic concurrently and joins them all-or-nothing: the first
//! handler failure aborts the join and fails the publish.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use futures::future;
use serde_json::Value;

use crate::error::{BusError, BusResult};
use crate::message::{Envelope, MessageId, Topic};

/// Boxed error type produced by message handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// A subscriber's reaction to messages on one topic.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, envelope: &Envelope) -> Result<(), HandlerError>;
}

type BoxedHandlerFn = Box<
    dyn for<'a> Fn(&'a Envelope) -> Pin<Box<dyn Future<Output = Result<(), HandlerError>> + Send + 'a>>
        + Send
        + Sync,
>;

struct FnMessageHandler {
    func: BoxedHandlerFn,
}

#[async_trait]
impl MessageHandler for FnMessageHandler {
    async fn handle(&self, envelope: &Envelope) -> Result<(), HandlerError> {
        (self.func)(envelope).await
    }
}

#[derive(Clone)]
struct SubscriberEntry {
    id: u64,
    handler: Arc<dyn MessageHandler>,
}

type SubscriberMap = HashMap<Topic, Vec<SubscriberEntry>>;

/// In-process publish/subscribe bus keyed by validated topic.
///
/// Plain value, cheap to clone; clones share the same subscriber table.
#[derive(Clone, Default)]
pub struct MessageBus {
    subscribers: Arc<RwLock<SubscriberMap>>,
    next_id: Arc<AtomicU64>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Register a handler for a topic.
    ///
    /// The returned [`Subscription`] is the detach handle; dropping it
    /// without calling `unsubscribe` leaves the handler registered.
    pub fn subscribe(
        &self,
        topic: &str,
        handler: Arc<dyn MessageHandler>,
    ) -> BusResult<Subscription> {
        let topic = Topic::parse(topic).map_err(|err| BusError::InvalidTopic(err.to_string()))?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        let mut subscribers = self.subscribers.write().expect("subscriber lock");
        subscribers
            .entry(topic.clone())
            .or_default()
            .push(SubscriberEntry { id, handler });
        drop(subscribers);

        tracing::debug!(topic = %topic, subscriber = id, "Subscribed");
        Ok(Subscription {
            subscribers: Arc::clone(&self.subscribers),
            topic,
            id,
        })
    }

    /// Register an async closure as a handler for a topic.
    pub fn subscribe_fn<F, Fut>(&self, topic: &str, func: F) -> BusResult<Subscription>
    where
        F: Fn(Envelope) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        let handler = FnMessageHandler {
            func: Box::new(move |envelope| {
                let owned = envelope.clone();
                Box::pin(func(owned))
            }),
        };
        self.subscribe(topic, Arc::new(handler))
    }

    /// Publish a payload to every handler registered for a topic.
    ///
    /// No handlers is a warning, not an error. Handlers run concurrently;
    /// the first failure is wrapped, logged with the message identity,
    /// and fails the publish, dropping any still-pending siblings.
    pub async fn publish(&self, topic: &str, payload: Value) -> BusResult<MessageId> {
        let topic = Topic::parse(topic).map_err(|err| BusError::InvalidTopic(err.to_string()))?;

        let handlers: Vec<Arc<dyn MessageHandler>> = {
            let subscribers = self.subscribers.read().expect("subscriber lock");
            subscribers
                .get(&topic)
                .map(|entries| entries.iter().map(|e| Arc::clone(&e.handler)).collect())
                .unwrap_or_default()
        };

        let envelope = Envelope::new(topic.clone(), payload);
        if handlers.is_empty() {
            tracing::warn!(topic = %topic, message_id = %envelope.id, "Published with no subscribers");
            return Ok(envelope.id);
        }

        tracing::debug!(
            topic = %topic,
            message_id = %envelope.id,
            handlers = handlers.len(),
            "Publishing"
        );

        let dispatch = handlers.iter().map(|handler| {
            let envelope = &envelope;
            async move {
                handler
                    .handle(envelope)
                    .await
                    .map_err(|cause| BusError::HandlerFailed {
                        topic: envelope.topic.as_str().to_string(),
                        message_id: envelope.id.to_string(),
                        cause: cause.to_string(),
                    })
            }
        });

        if let Err(err) = future::try_join_all(dispatch).await {
            tracing::error!(
                topic = %topic,
                message_id = %envelope.id,
                "Handler failed: {}",
                err
            );
            return Err(err);
        }
        Ok(envelope.id)
    }

    /// Number of handlers registered for a topic.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        let Ok(topic) = Topic::parse(topic) else {
            return 0;
        };
        let subscribers = self.subscribers.read().expect("subscriber lock");
        subscribers.get(&topic).map_or(0, Vec::len)
    }
}

/// Detach handle for one registered handler.
pub struct Subscription {
    subscribers: Arc<RwLock<SubscriberMap>>,
    topic: Topic,
    id: u64,
}

impl Subscription {
    /// The topic this subscription listens on.
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Remove the handler from the bus.
    pub fn unsubscribe(self) {
        let mut subscribers = self.subscribers.write().expect("subscriber lock");
        if let Some(entries) = subscribers.get_mut(&self.topic) {
            entries.retain(|entry| entry.id != self.id);
            if entries.is_empty() {
                subscribers.remove(&self.topic);
            }
        }
        tracing::debug!(topic = %self.topic, subscriber = self.id, "Unsubscribed");
    }
}
