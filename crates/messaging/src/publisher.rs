use std::sync::Arc;

use async_trait::async_trait;
use domain::DomainEvent;

use crate::{PublishError, Result};

/// A serialized event ready for transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Event type name, e.g. `"SaleCreated"`.
    pub event_type: String,

    /// JSON body of the event.
    pub body: String,
}

/// Transport capability for publishing messages to a topic.
///
/// Implementations only move bytes; validation and serialization happen in
/// [`EventPublisherExt::publish`]. All implementations must be thread-safe.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Sends a message to the named topic.
    async fn send(&self, topic: &str, message: OutboundMessage) -> Result<()>;
}

#[async_trait]
impl<T: EventPublisher + ?Sized> EventPublisher for Arc<T> {
    async fn send(&self, topic: &str, message: OutboundMessage) -> Result<()> {
        (**self).send(topic, message).await
    }
}

/// Extension trait providing event-level publishing on top of any transport.
#[async_trait]
pub trait EventPublisherExt: EventPublisher {
    /// Serializes an event to JSON and sends it to `topic`.
    ///
    /// Fails with `EmptyTopic` before touching the transport if the topic is
    /// empty or blank.
    async fn publish<E: DomainEvent>(&self, event: &E, topic: &str) -> Result<()> {
        if topic.trim().is_empty() {
            return Err(PublishError::EmptyTopic);
        }

        let message = OutboundMessage {
            event_type: event.event_type().to_string(),
            body: serde_json::to_string(event)?,
        };

        tracing::debug!(topic, event_type = %message.event_type, "publishing event");
        self.send(topic, message).await
    }
}

// Blanket implementation for all EventPublisher implementations
impl<T: EventPublisher + ?Sized> EventPublisherExt for T {}
