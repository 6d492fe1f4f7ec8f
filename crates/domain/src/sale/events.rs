//! Sale domain events.
//!
//! The three payloads are deliberately not symmetric: only the created event
//! carries the item list, and removal of a sale is announced as a
//! cancellation.

use chrono::{DateTime, Utc};
use common::SaleId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::event::DomainEvent;

use super::{LineItemDto, Sale};

/// Events published after a sale has been persisted.
///
/// Serialized untagged, so the message body is exactly the payload object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SaleEvent {
    /// A sale was created.
    SaleCreated(SaleCreatedData),

    /// A sale was replaced by an update.
    SaleChanged(SaleChangedData),

    /// A sale was removed.
    SaleCancelled(SaleCancelledData),
}

impl DomainEvent for SaleEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SaleEvent::SaleCreated(_) => "SaleCreated",
            SaleEvent::SaleChanged(_) => "SaleChanged",
            SaleEvent::SaleCancelled(_) => "SaleCancelled",
        }
    }
}

/// Data for SaleCreated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleCreatedData {
    pub sale_id: SaleId,

    pub created_at: DateTime<Utc>,

    pub client: String,

    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_value: Decimal,

    pub items: Vec<LineItemDto>,
}

/// Data for SaleChanged event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleChangedData {
    pub sale_id: SaleId,

    pub changed_at: DateTime<Utc>,

    pub client: String,

    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_value: Decimal,
}

/// Data for SaleCancelled event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleCancelledData {
    pub sale_id: SaleId,

    pub cancelled_at: DateTime<Utc>,
}

// Event constructors
impl SaleEvent {
    /// Creates a SaleCreated event stamped with the current time.
    pub fn created(sale: &Sale) -> Self {
        SaleEvent::SaleCreated(SaleCreatedData {
            sale_id: sale.id(),
            created_at: Utc::now(),
            client: sale.client().to_string(),
            total_value: sale.total_value(),
            items: sale.items().iter().map(LineItemDto::from).collect(),
        })
    }

    /// Creates a SaleChanged event stamped with the current time.
    pub fn changed(sale: &Sale) -> Self {
        SaleEvent::SaleChanged(SaleChangedData {
            sale_id: sale.id(),
            changed_at: Utc::now(),
            client: sale.client().to_string(),
            total_value: sale.total_value(),
        })
    }

    /// Creates a SaleCancelled event stamped with the current time.
    pub fn cancelled(sale_id: SaleId) -> Self {
        SaleEvent::SaleCancelled(SaleCancelledData {
            sale_id,
            cancelled_at: Utc::now(),
        })
    }

    /// Returns the ID of the sale the event is about.
    pub fn sale_id(&self) -> SaleId {
        match self {
            SaleEvent::SaleCreated(data) => data.sale_id,
            SaleEvent::SaleChanged(data) => data.sale_id,
            SaleEvent::SaleCancelled(data) => data.sale_id,
        }
    }
}
