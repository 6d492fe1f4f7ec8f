use std::sync::Arc;

use async_trait::async_trait;
use common::SaleId;
use domain::Sale;

use crate::Result;

/// Storage capability for sale aggregates.
///
/// Sales are always loaded together with their items. All implementations must
/// be thread-safe (Send + Sync).
#[async_trait]
pub trait SaleRepository: Send + Sync {
    /// Loads a sale by ID.
    ///
    /// Returns None if the sale doesn't exist.
    async fn find_by_id(&self, id: SaleId) -> Result<Option<Sale>>;

    /// Loads every stored sale. Order is defined by the implementation.
    async fn find_all(&self) -> Result<Vec<Sale>>;

    /// Stores a new sale and its items.
    ///
    /// Fails with `DuplicateSale` if the ID is already taken.
    async fn insert(&self, sale: &Sale) -> Result<()>;

    /// Replaces a stored sale, including its whole item list.
    ///
    /// Fails with `SaleNotFound` if the ID is unknown.
    async fn update(&self, sale: &Sale) -> Result<()>;

    /// Physically deletes a sale and its items. A no-op if the ID is unknown.
    async fn delete(&self, id: SaleId) -> Result<()>;
}

#[async_trait]
impl<T: SaleRepository + ?Sized> SaleRepository for Arc<T> {
    async fn find_by_id(&self, id: SaleId) -> Result<Option<Sale>> {
        (**self).find_by_id(id).await
    }

    async fn find_all(&self) -> Result<Vec<Sale>> {
        (**self).find_all().await
    }

    async fn insert(&self, sale: &Sale) -> Result<()> {
        (**self).insert(sale).await
    }

    async fn update(&self, sale: &Sale) -> Result<()> {
        (**self).update(sale).await
    }

    async fn delete(&self, id: SaleId) -> Result<()> {
        (**self).delete(id).await
    }
}
