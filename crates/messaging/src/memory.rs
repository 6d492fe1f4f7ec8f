//! In-memory publisher for tests and local runs.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::{EventPublisher, OutboundMessage, PublishError, Result};

/// A message captured by [`InMemoryEventPublisher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic: String,
    pub event_type: String,
    pub body: String,
}

impl PublishedMessage {
    /// Parses the JSON body.
    pub fn payload<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.body)
    }
}

#[derive(Debug, Default)]
struct InMemoryPublisherState {
    messages: Vec<PublishedMessage>,
    fail_on_publish: bool,
}

/// In-memory publisher that records every message it is given.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventPublisher {
    state: Arc<RwLock<InMemoryPublisherState>>,
}

impl InMemoryEventPublisher {
    /// Creates a new in-memory publisher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the publisher to fail on every send.
    pub fn set_fail_on_publish(&self, fail: bool) {
        self.state.write().unwrap().fail_on_publish = fail;
    }

    /// Returns all messages sent so far, oldest first.
    pub fn messages(&self) -> Vec<PublishedMessage> {
        self.state.read().unwrap().messages.clone()
    }

    /// Returns the messages sent to one topic.
    pub fn messages_for(&self, topic: &str) -> Vec<PublishedMessage> {
        self.state
            .read()
            .unwrap()
            .messages
            .iter()
            .filter(|m| m.topic == topic)
            .cloned()
            .collect()
    }

    /// Returns the number of messages sent.
    pub fn published_count(&self) -> usize {
        self.state.read().unwrap().messages.len()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    async fn send(&self, topic: &str, message: OutboundMessage) -> Result<()> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_publish {
            return Err(PublishError::Transport("broker unavailable".to_string()));
        }

        state.messages.push(PublishedMessage {
            topic: topic.to_string(),
            event_type: message.event_type,
            body: message.body,
        });
        Ok(())
    }
}
