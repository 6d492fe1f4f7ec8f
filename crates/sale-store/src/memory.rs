use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use common::SaleId;
use domain::Sale;
use tokio::sync::RwLock;

use crate::{Result, SaleRepository, StoreError};

/// In-memory sale store for testing and local runs.
///
/// Sales are kept in insertion order. Reads and writes can be made to fail on
/// demand to exercise error paths.
#[derive(Clone, Default)]
pub struct InMemorySaleRepository {
    sales: Arc<RwLock<Vec<Sale>>>,
    fail_on_read: Arc<AtomicBool>,
    fail_on_write: Arc<AtomicBool>,
    deletes: Arc<AtomicUsize>,
}

impl InMemorySaleRepository {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored sales.
    pub async fn sale_count(&self) -> usize {
        self.sales.read().await.len()
    }

    /// Returns how many sales were physically deleted.
    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    /// Configures every read to fail.
    pub fn set_fail_on_read(&self, fail: bool) {
        self.fail_on_read.store(fail, Ordering::SeqCst);
    }

    /// Configures every write to fail.
    pub fn set_fail_on_write(&self, fail: bool) {
        self.fail_on_write.store(fail, Ordering::SeqCst);
    }

    /// Removes all stored sales.
    pub async fn clear(&self) {
        self.sales.write().await.clear();
    }

    fn check_read(&self) -> Result<()> {
        if self.fail_on_read.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("read failure injected".to_string()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<()> {
        if self.fail_on_write.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("write failure injected".to_string()));
        }
        Ok(())
    }

    fn check_items(sale: &Sale) -> Result<()> {
        match sale.duplicate_item_id() {
            Some(item_id) => Err(StoreError::DuplicateItem {
                sale_id: sale.id(),
                item_id,
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SaleRepository for InMemorySaleRepository {
    async fn find_by_id(&self, id: SaleId) -> Result<Option<Sale>> {
        self.check_read()?;
        let sales = self.sales.read().await;
        Ok(sales.iter().find(|s| s.id() == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Sale>> {
        self.check_read()?;
        Ok(self.sales.read().await.clone())
    }

    async fn insert(&self, sale: &Sale) -> Result<()> {
        self.check_write()?;
        Self::check_items(sale)?;
        let mut sales = self.sales.write().await;

        if sales.iter().any(|s| s.id() == sale.id()) {
            return Err(StoreError::DuplicateSale(sale.id()));
        }

        sales.push(sale.clone());
        Ok(())
    }

    async fn update(&self, sale: &Sale) -> Result<()> {
        self.check_write()?;
        Self::check_items(sale)?;
        let mut sales = self.sales.write().await;

        let stored = sales
            .iter_mut()
            .find(|s| s.id() == sale.id())
            .ok_or(StoreError::SaleNotFound(sale.id()))?;
        *stored = sale.clone();

        Ok(())
    }

    async fn delete(&self, id: SaleId) -> Result<()> {
        self.check_write()?;
        let mut sales = self.sales.write().await;

        if let Some(index) = sales.iter().position(|s| s.id() == id) {
            sales.remove(index);
            self.deletes.fetch_add(1, Ordering::SeqCst);
        }

        Ok(())
    }
}
