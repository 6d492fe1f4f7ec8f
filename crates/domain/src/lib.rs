//! Domain layer for the sales service.
//!
//! This crate provides:
//! - The `Sale` aggregate root and its owned `LineItem`s, with derived totals
//! - The transfer representation (`SaleDto`) used at the system boundary
//! - The domain events published after a sale is created, changed or removed

pub mod event;
pub mod sale;

pub use common::{ItemId, SaleId};
pub use event::DomainEvent;
pub use sale::{
    LineItem, LineItemDto, Sale, SaleCancelledData, SaleChangedData, SaleCreatedData, SaleDto,
    SaleError, SaleEvent,
};
