//! API server entry point.

use std::sync::Arc;

use api::DynAppState;
use api::config::{Config, LogFormat};
use api::routes::sales::AppState;
use messaging::{EventPublisher, InMemoryEventPublisher, RedisEventPublisher};
use sale_service::SaleService;
use sale_store::{InMemorySaleRepository, PostgresSaleRepository, SaleRepository};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn sale_repository(config: &Config) -> Arc<dyn SaleRepository> {
    let Some(url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set, sales are kept in memory");
        return Arc::new(InMemorySaleRepository::new());
    };

    let repository = PostgresSaleRepository::connect(url, config.database_max_connections)
        .await
        .expect("failed to connect to PostgreSQL");
    repository
        .run_migrations()
        .await
        .expect("failed to run migrations");
    tracing::info!("using PostgreSQL sale store");

    Arc::new(repository)
}

async fn event_publisher(config: &Config) -> Arc<dyn EventPublisher> {
    let Some(url) = config.redis_url.as_deref() else {
        tracing::warn!("REDIS_URL not set, events are only recorded in memory");
        return Arc::new(InMemoryEventPublisher::new());
    };

    let publisher = RedisEventPublisher::connect(url)
        .await
        .expect("failed to connect to Redis");
    tracing::info!("publishing sale events to Redis");

    Arc::new(publisher)
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    init_tracing(&config);

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Wire adapters into the service
    let repository = sale_repository(&config).await;
    let publisher = event_publisher(&config).await;
    let service = SaleService::new(repository, publisher, config.sales_topic.clone());
    tracing::info!(topic = service.topic(), "sale service ready");

    let state: Arc<DynAppState> = Arc::new(AppState::new(service));

    // 4. Build the application
    let app = api::create_app(state, metrics_handle);

    // 5. Start server
    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
