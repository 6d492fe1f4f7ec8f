//! Sale orchestration service.
//!
//! Sequences persistence of the sale aggregate with publication of the
//! corresponding domain event. Within one operation the write always precedes
//! the publish; a publish failure is reported to the caller but does not undo
//! the write.

pub mod error;
pub mod service;

pub use error::{Result, ServiceError};
pub use service::{DEFAULT_SALES_TOPIC, RemoveOutcome, SaleService};
