use thiserror::Error;

/// Errors that can occur while publishing an event.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The topic name is empty.
    #[error("Topic name must not be empty")]
    EmptyTopic,

    /// The event could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The message broker rejected the message or could not be reached.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Any other transport failure.
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result type for publish operations.
pub type Result<T> = std::result::Result<T, PublishError>;
