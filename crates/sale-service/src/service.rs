//! Sale orchestration.

use std::future::Future;
use std::time::Instant;

use common::SaleId;
use domain::{DomainEvent, Sale, SaleDto, SaleEvent};
use messaging::{EventPublisher, EventPublisherExt};
use sale_store::SaleRepository;

use crate::error::Result;

/// Topic used when none is configured.
pub const DEFAULT_SALES_TOPIC: &str = "sales";

/// Result of a remove request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The sale existed, was deleted and a SaleCancelled event was published.
    Removed,
    /// No sale had the given ID. Nothing was deleted or published.
    NotFound,
}

/// Coordinates the sale store and the event publisher.
///
/// Every mutating operation writes first and publishes second. Operations are
/// logged on failure and recorded in `sale_operations_total` and
/// `sale_operation_duration_seconds`, labelled by operation.
pub struct SaleService<R, P>
where
    R: SaleRepository,
    P: EventPublisher,
{
    repository: R,
    publisher: P,
    topic: String,
}

impl<R, P> SaleService<R, P>
where
    R: SaleRepository,
    P: EventPublisher,
{
    /// Creates a new service publishing to `topic`.
    pub fn new(repository: R, publisher: P, topic: impl Into<String>) -> Self {
        Self {
            repository,
            publisher,
            topic: topic.into(),
        }
    }

    /// Creates a new service publishing to [`DEFAULT_SALES_TOPIC`].
    pub fn with_default_topic(repository: R, publisher: P) -> Self {
        Self::new(repository, publisher, DEFAULT_SALES_TOPIC)
    }

    /// The topic events are published to.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Loads a sale by ID.
    #[tracing::instrument(skip(self), err)]
    pub async fn get_by_id(&self, id: SaleId) -> Result<Option<SaleDto>> {
        observe("get_by_id", async {
            let sale = self.repository.find_by_id(id).await?;
            Ok(sale.as_ref().map(SaleDto::from))
        })
        .await
    }

    /// Loads every sale.
    #[tracing::instrument(skip(self), err)]
    pub async fn get_all(&self) -> Result<Vec<SaleDto>> {
        observe("get_all", async {
            let sales = self.repository.find_all().await?;
            Ok(sales.iter().map(SaleDto::from).collect())
        })
        .await
    }

    /// Validates and stores a new sale, then publishes SaleCreated.
    ///
    /// Returns the stored sale with its derived totals.
    #[tracing::instrument(skip(self, sale), fields(sale_id = %sale.id), err)]
    pub async fn create(&self, sale: SaleDto) -> Result<SaleDto> {
        observe("create", async {
            let sale = Sale::try_from(sale)?;
            self.repository.insert(&sale).await?;

            tracing::info!(
                total_value = %sale.total_value(),
                items = sale.item_count(),
                "sale created"
            );

            self.publish(SaleEvent::created(&sale)).await?;
            Ok(SaleDto::from(&sale))
        })
        .await
    }

    /// Replaces a stored sale, then publishes SaleChanged.
    ///
    /// The event carries the new total but not the item list.
    #[tracing::instrument(skip(self, sale), fields(sale_id = %sale.id), err)]
    pub async fn update(&self, sale: SaleDto) -> Result<()> {
        observe("update", async {
            let sale = Sale::try_from(sale)?;
            self.repository.update(&sale).await?;

            tracing::info!(total_value = %sale.total_value(), "sale updated");

            self.publish(SaleEvent::changed(&sale)).await
        })
        .await
    }

    /// Deletes a sale, then publishes SaleCancelled.
    ///
    /// A missing sale is not an error: a warning is logged and nothing else
    /// happens.
    #[tracing::instrument(skip(self), err)]
    pub async fn remove(&self, id: SaleId) -> Result<RemoveOutcome> {
        observe("remove", async {
            if self.repository.find_by_id(id).await?.is_none() {
                tracing::warn!(sale_id = %id, "sale not found, nothing removed");
                return Ok(RemoveOutcome::NotFound);
            }

            self.repository.delete(id).await?;
            tracing::info!(sale_id = %id, "sale removed");

            self.publish(SaleEvent::cancelled(id)).await?;
            Ok(RemoveOutcome::Removed)
        })
        .await
    }

    async fn publish(&self, event: SaleEvent) -> Result<()> {
        self.publisher.publish(&event, &self.topic).await?;
        metrics::counter!("sale_events_published_total", "event_type" => event.event_type())
            .increment(1);
        Ok(())
    }
}

/// Runs one operation and records its outcome and duration.
async fn observe<T, F>(operation: &'static str, operation_future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let started = Instant::now();
    let result = operation_future.await;

    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    metrics::counter!(
        "sale_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("sale_operation_duration_seconds", "operation" => operation)
        .record(started.elapsed().as_secs_f64());

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use domain::{LineItemDto, SaleError};
    use messaging::{InMemoryEventPublisher, PublishError};
    use rust_decimal_macros::dec;
    use sale_store::{InMemorySaleRepository, StoreError};

    type TestService = SaleService<InMemorySaleRepository, InMemoryEventPublisher>;

    fn service() -> TestService {
        SaleService::with_default_topic(
            InMemorySaleRepository::new(),
            InMemoryEventPublisher::new(),
        )
    }

    fn widget_sale() -> SaleDto {
        SaleDto::new("ACME", "Downtown")
            .with_item(LineItemDto::new("Widget", 2, dec!(100.00), dec!(10.00)))
    }

    #[tokio::test]
    async fn create_stores_and_publishes() {
        let service = service();

        let created = service.create(widget_sale()).await.unwrap();

        assert_eq!(created.total_value, dec!(180.00));
        assert_eq!(service.repository().sale_count().await, 1);

        let messages = service.publisher().messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].topic, DEFAULT_SALES_TOPIC);
        assert_eq!(messages[0].event_type, "SaleCreated");
    }

    #[tokio::test]
    async fn invalid_input_touches_nothing() {
        let service = service();
        let dto = SaleDto::new("ACME", "Downtown")
            .with_item(LineItemDto::new("Widget", 0, dec!(1), dec!(0)));

        let result = service.create(dto).await;

        assert!(matches!(
            result,
            Err(ServiceError::Validation(SaleError::InvalidQuantity { quantity: 0 }))
        ));
        assert_eq!(service.repository().sale_count().await, 0);
        assert_eq!(service.publisher().published_count(), 0);
    }

    #[tokio::test]
    async fn store_failure_skips_publish() {
        let service = service();
        service.repository().set_fail_on_write(true);

        let result = service.create(widget_sale()).await;

        assert!(matches!(
            result,
            Err(ServiceError::Persistence(StoreError::Unavailable(_)))
        ));
        assert_eq!(service.publisher().published_count(), 0);
    }

    #[tokio::test]
    async fn publish_failure_keeps_the_write() {
        let service = service();
        service.publisher().set_fail_on_publish(true);

        let result = service.create(widget_sale()).await;

        assert!(matches!(
            result,
            Err(ServiceError::Publish(PublishError::Transport(_)))
        ));
        assert_eq!(service.repository().sale_count().await, 1);
    }

    #[tokio::test]
    async fn blank_topic_is_a_publish_error() {
        let service = SaleService::new(
            InMemorySaleRepository::new(),
            InMemoryEventPublisher::new(),
            " ",
        );

        let result = service.create(widget_sale()).await;

        assert!(matches!(
            result,
            Err(ServiceError::Publish(PublishError::EmptyTopic))
        ));
        assert_eq!(service.repository().sale_count().await, 1);
    }

    #[tokio::test]
    async fn remove_missing_sale_is_a_no_op() {
        let service = service();

        let outcome = service.remove(SaleId::new()).await.unwrap();

        assert_eq!(outcome, RemoveOutcome::NotFound);
        assert_eq!(service.repository().delete_count(), 0);
        assert_eq!(service.publisher().published_count(), 0);
    }

    #[test]
    fn error_kinds_are_stable_labels() {
        let validation = ServiceError::from(SaleError::MissingField { field: "client" });
        let publish = ServiceError::from(PublishError::EmptyTopic);
        assert_eq!(validation.kind(), "validation");
        assert_eq!(publish.kind(), "publish");
    }
}
