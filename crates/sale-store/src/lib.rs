//! Persistence for the sale aggregate.
//!
//! [`SaleRepository`] is the port the orchestration layer consumes. Two
//! adapters are provided: an in-memory one for tests and local runs, and a
//! PostgreSQL one backed by `sqlx`.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod repository;

pub use error::{Result, StoreError};
pub use memory::InMemorySaleRepository;
pub use postgres::PostgresSaleRepository;
pub use repository::SaleRepository;
