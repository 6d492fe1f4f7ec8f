//! Sale CRUD endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::SaleId;
use domain::SaleDto;
use messaging::EventPublisher;
use sale_service::SaleService;
use sale_store::SaleRepository;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<R: SaleRepository, P: EventPublisher> {
    pub sales: SaleService<R, P>,
}

impl<R: SaleRepository, P: EventPublisher> AppState<R, P> {
    pub fn new(sales: SaleService<R, P>) -> Self {
        Self { sales }
    }
}

/// GET /sales — list every sale.
#[tracing::instrument(skip(state))]
pub async fn list<R, P>(
    State(state): State<Arc<AppState<R, P>>>,
) -> Result<Json<Vec<SaleDto>>, ApiError>
where
    R: SaleRepository + 'static,
    P: EventPublisher + 'static,
{
    Ok(Json(state.sales.get_all().await?))
}

/// GET /sales/{id} — load one sale.
#[tracing::instrument(skip(state))]
pub async fn get<R, P>(
    State(state): State<Arc<AppState<R, P>>>,
    Path(id): Path<String>,
) -> Result<Json<SaleDto>, ApiError>
where
    R: SaleRepository + 'static,
    P: EventPublisher + 'static,
{
    let sale_id = parse_sale_id(&id)?;
    state
        .sales
        .get_by_id(sale_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Sale {sale_id} not found")))
}

/// POST /sales — create a sale and return it with its totals.
#[tracing::instrument(skip(state, sale))]
pub async fn create<R, P>(
    State(state): State<Arc<AppState<R, P>>>,
    Json(sale): Json<SaleDto>,
) -> Result<(StatusCode, Json<SaleDto>), ApiError>
where
    R: SaleRepository + 'static,
    P: EventPublisher + 'static,
{
    let created = state.sales.create(sale).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /sales/{id} — replace a sale. The ID in the path wins over the body.
#[tracing::instrument(skip(state, sale))]
pub async fn update<R, P>(
    State(state): State<Arc<AppState<R, P>>>,
    Path(id): Path<String>,
    Json(mut sale): Json<SaleDto>,
) -> Result<StatusCode, ApiError>
where
    R: SaleRepository + 'static,
    P: EventPublisher + 'static,
{
    sale.id = parse_sale_id(&id)?;
    state.sales.update(sale).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /sales/{id} — remove a sale. Removing an unknown sale is not an error.
#[tracing::instrument(skip(state))]
pub async fn remove<R, P>(
    State(state): State<Arc<AppState<R, P>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    R: SaleRepository + 'static,
    P: EventPublisher + 'static,
{
    let sale_id = parse_sale_id(&id)?;
    let outcome = state.sales.remove(sale_id).await?;
    tracing::debug!(?outcome, "remove handled");
    Ok(StatusCode::NO_CONTENT)
}

fn parse_sale_id(id: &str) -> Result<SaleId, ApiError> {
    id.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid sale ID: {e}")))
}
