//! Redis pub/sub transport.
//!
//! Pub/sub is not durable: messages published while no subscriber is
//! listening are dropped by the broker. The topic name is used as the
//! channel name.

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;

use crate::{EventPublisher, OutboundMessage, Result};

/// Publisher that sends JSON bodies to Redis channels.
#[derive(Clone)]
pub struct RedisEventPublisher {
    connection: MultiplexedConnection,
}

impl RedisEventPublisher {
    /// Opens a multiplexed connection to the broker at `redis_url`.
    pub async fn connect(redis_url: impl AsRef<str>) -> Result<Self> {
        let client = redis::Client::open(redis_url.as_ref())?;
        let connection = client.get_multiplexed_async_connection().await?;
        Ok(Self { connection })
    }
}

#[async_trait]
impl EventPublisher for RedisEventPublisher {
    async fn send(&self, topic: &str, message: OutboundMessage) -> Result<()> {
        let mut connection = self.connection.clone();
        let receivers: i64 = connection.publish(topic, message.body).await?;

        tracing::debug!(
            topic,
            event_type = %message.event_type,
            receivers,
            "event sent to redis"
        );
        Ok(())
    }
}
