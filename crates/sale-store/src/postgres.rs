use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{ItemId, SaleId};
use domain::{LineItem, Sale};
use rust_decimal::{Decimal, RoundingStrategy};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use crate::{Result, SaleRepository, StoreError};

const SELECT_SALES: &str = "SELECT id, sale_date, client, branch, cancelled FROM sales";

const SELECT_ITEMS: &str =
    "SELECT id, sale_id, product, quantity, unit_price, discount FROM sale_items";

/// PostgreSQL-backed sale store.
///
/// Every write runs in a single transaction covering the header and its items.
#[derive(Clone)]
pub struct PostgresSaleRepository {
    pool: PgPool,
}

impl PostgresSaleRepository {
    /// Creates a new PostgreSQL sale store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database at `url` with a bounded pool.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_sale(row: &PgRow) -> Result<Sale> {
        let cancelled: bool = row.try_get("cancelled")?;
        let mut sale = Sale::new(
            SaleId::from_uuid(row.try_get::<Uuid, _>("id")?),
            row.try_get::<DateTime<Utc>, _>("sale_date")?,
            row.try_get::<String, _>("client")?,
            row.try_get::<String, _>("branch")?,
        );
        if cancelled {
            sale.cancel();
        }
        Ok(sale)
    }

    fn row_to_item(row: &PgRow) -> Result<LineItem> {
        let sale_id = SaleId::from_uuid(row.try_get::<Uuid, _>("sale_id")?);

        LineItem::new(
            ItemId::from_uuid(row.try_get::<Uuid, _>("id")?),
            row.try_get::<String, _>("product")?,
            row.try_get::<i32, _>("quantity")?,
            row.try_get::<Decimal, _>("unit_price")?,
            row.try_get::<Decimal, _>("discount")?,
        )
        .map_err(|source| StoreError::InvalidRow { sale_id, source })
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

    async fn insert_items(conn: &mut PgConnection, sale: &Sale) -> Result<()> {
        for (position, item) in sale.items().iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO sale_items (id, sale_id, position, product, quantity, unit_price, discount)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(item.id().as_uuid())
            .bind(sale.id().as_uuid())
            .bind(position as i32)
            .bind(item.product())
            .bind(item.quantity())
            .bind(storage_amount(item.unit_price()))
            .bind(storage_amount(item.discount()))
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.constraint() == Some("sale_items_pkey")
                {
                    return StoreError::DuplicateItem {
                        sale_id: sale.id(),
                        item_id: item.id(),
                    };
                }
                StoreError::Database(e)
            })?;
        }
        Ok(())
    }
}

/// Rounds an amount to the two decimal places of the `NUMERIC(18,2)` columns.
fn storage_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[async_trait]
impl SaleRepository for PostgresSaleRepository {
    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: SaleId) -> Result<Option<Sale>> {
        let Some(row) = sqlx::query(&format!("{SELECT_SALES} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let mut sale = Self::row_to_sale(&row)?;

        let item_rows = sqlx::query(&format!(
            "{SELECT_ITEMS} WHERE sale_id = $1 ORDER BY position ASC"
        ))
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        for item_row in &item_rows {
            sale.add_item(Self::row_to_item(item_row)?);
        }

        Ok(Some(sale))
    }

    #[tracing::instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<Sale>> {
        let sale_rows = sqlx::query(&format!("{SELECT_SALES} ORDER BY sale_date ASC, id ASC"))
            .fetch_all(&self.pool)
            .await?;

        let item_rows = sqlx::query(&format!(
            "{SELECT_ITEMS} ORDER BY sale_id ASC, position ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut items_by_sale: HashMap<Uuid, Vec<LineItem>> = HashMap::new();
        for row in &item_rows {
            let sale_id: Uuid = row.try_get("sale_id")?;
            items_by_sale
                .entry(sale_id)
                .or_default()
                .push(Self::row_to_item(row)?);
        }

        sale_rows
            .iter()
            .map(|row| -> Result<Sale> {
                let mut sale = Self::row_to_sale(row)?;
                for item in items_by_sale.remove(&sale.id().as_uuid()).unwrap_or_default() {
                    sale.add_item(item);
                }
                Ok(sale)
            })
            .collect()
    }

    #[tracing::instrument(skip(self, sale), fields(sale_id = %sale.id()))]
    async fn insert(&self, sale: &Sale) -> Result<()> {
        Self::check_items(sale)?;
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales (id, sale_date, client, branch, cancelled)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(sale.id().as_uuid())
        .bind(sale.sale_date())
        .bind(sale.client())
        .bind(sale.branch())
        .bind(sale.is_cancelled())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("sales_pkey")
            {
                return StoreError::DuplicateSale(sale.id());
            }
            StoreError::Database(e)
        })?;

        Self::insert_items(&mut tx, sale).await?;

        tx.commit().await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, sale), fields(sale_id = %sale.id()))]
    async fn update(&self, sale: &Sale) -> Result<()> {
        Self::check_items(sale)?;
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE sales
            SET sale_date = $2, client = $3, branch = $4, cancelled = $5
            WHERE id = $1
            "#,
        )
        .bind(sale.id().as_uuid())
        .bind(sale.sale_date())
        .bind(sale.client())
        .bind(sale.branch())
        .bind(sale.is_cancelled())
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(StoreError::SaleNotFound(sale.id()));
        }

        sqlx::query("DELETE FROM sale_items WHERE sale_id = $1")
            .bind(sale.id().as_uuid())
            .execute(&mut *tx)
            .await?;

        Self::insert_items(&mut tx, sale).await?;

        tx.commit().await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: SaleId) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // Items first: the foreign key does not cascade.
        sqlx::query("DELETE FROM sale_items WHERE sale_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM sales WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
