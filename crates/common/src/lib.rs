//! Shared identifier types for the sales service.

mod types;

pub use types::{ItemId, SaleId};
