//! Publishing of domain events to message topics.
//!
//! [`EventPublisher`] is the transport seam; [`EventPublisherExt::publish`]
//! validates the topic and serializes the event before handing it over.

pub mod error;
pub mod memory;
pub mod publisher;
pub mod redis_pubsub;

pub use error::{PublishError, Result};
pub use memory::{InMemoryEventPublisher, PublishedMessage};
pub use publisher::{EventPublisher, EventPublisherExt, OutboundMessage};
pub use redis_pubsub::RedisEventPublisher;
