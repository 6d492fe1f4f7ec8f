//! Orchestration error types.

use domain::SaleError;
use messaging::PublishError;
use sale_store::StoreError;
use thiserror::Error;

/// Errors that can occur during sale operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The input was rejected before any I/O happened.
    #[error("Validation error: {0}")]
    Validation(#[from] SaleError),

    /// The store failed. Nothing was published.
    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),

    /// The event could not be published. The preceding write, if any, stands.
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),
}

impl ServiceError {
    /// Short label used as a metrics outcome.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "validation",
            ServiceError::Persistence(_) => "persistence",
            ServiceError::Publish(_) => "publish",
        }
    }
}

/// Convenience type alias for service results.
pub type Result<T> = std::result::Result<T, ServiceError>;
