use common::{ItemId, SaleId};
use domain::SaleError;
use thiserror::Error;

/// Errors that can occur when interacting with the sale store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A sale with the same ID is already stored.
    #[error("Sale already exists: {0}")]
    DuplicateSale(SaleId),

    /// The sale to update does not exist.
    #[error("Sale not found: {0}")]
    SaleNotFound(SaleId),

    /// Two line items of the sale share an ID.
    #[error("Sale {sale_id} has duplicate line item: {item_id}")]
    DuplicateItem { sale_id: SaleId, item_id: ItemId },

    /// A stored row no longer satisfies the aggregate invariants.
    #[error("Stored sale {sale_id} is invalid: {source}")]
    InvalidRow {
        sale_id: SaleId,
        #[source]
        source: SaleError,
    },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The store could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for sale store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
