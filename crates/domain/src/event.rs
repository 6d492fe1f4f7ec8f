//! Domain event abstraction.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Trait for domain events.
///
/// Domain events are facts of record emitted after a state change has been
/// persisted. They must be serializable for transport.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Returns the event type name.
    ///
    /// Travels next to the serialized body so consumers can route on it.
    fn event_type(&self) -> &'static str;
}
