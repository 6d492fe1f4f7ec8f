//! HTTP API server for the sale service.
//!
//! Exposes sale CRUD over REST, with structured logging (tracing) and
//! Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use messaging::{EventPublisher, InMemoryEventPublisher};
use metrics_exporter_prometheus::PrometheusHandle;
use sale_service::{DEFAULT_SALES_TOPIC, SaleService};
use sale_store::{InMemorySaleRepository, SaleRepository};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::sales::AppState;

/// State used by the binary: adapters are picked at startup.
pub type DynAppState = AppState<Arc<dyn SaleRepository>, Arc<dyn EventPublisher>>;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<R, P>(state: Arc<AppState<R, P>>, metrics_handle: PrometheusHandle) -> Router
where
    R: SaleRepository + 'static,
    P: EventPublisher + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/sales",
            get(routes::sales::list::<R, P>).post(routes::sales::create::<R, P>),
        )
        .route(
            "/sales/{id}",
            get(routes::sales::get::<R, P>)
                .put(routes::sales::update::<R, P>)
                .delete(routes::sales::remove::<R, P>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state backed by the in-memory store and publisher.
pub fn create_in_memory_state() -> Arc<AppState<InMemorySaleRepository, InMemoryEventPublisher>> {
    let service = SaleService::new(
        InMemorySaleRepository::new(),
        InMemoryEventPublisher::new(),
        DEFAULT_SALES_TOPIC,
    );
    Arc::new(AppState::new(service))
}
