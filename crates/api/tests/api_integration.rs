//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use api::routes::sales::AppState;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use domain::{SaleCancelledData, SaleCreatedData};
use messaging::InMemoryEventPublisher;
use metrics_exporter_prometheus::PrometheusHandle;
use sale_store::InMemorySaleRepository;
use tower::ServiceExt;

type TestState = Arc<AppState<InMemorySaleRepository, InMemoryEventPublisher>>;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> (axum::Router, TestState) {
    let state = api::create_in_memory_state();
    let app = api::create_app(state.clone(), get_metrics_handle());
    (app, state)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn widget_sale() -> serde_json::Value {
    serde_json::json!({
        "client": "ACME",
        "branch": "Downtown",
        "items": [{
            "product": "Widget",
            "quantity": 2,
            "unitPrice": 100.00,
            "discount": 10.00
        }]
    })
}

async fn create_sale(app: &axum::Router) -> String {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/sales", widget_sale()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup();

    let response = app.oneshot(empty_request("GET", "/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_create_sale_returns_totals() {
    let (app, state) = setup();

    let response = app
        .oneshot(json_request("POST", "/sales", widget_sale()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["client"], "ACME");
    assert_eq!(json["totalValue"].as_f64(), Some(180.0));
    assert_eq!(json["totalDiscount"].as_f64(), Some(10.0));
    assert_eq!(json["items"][0]["lineTotal"].as_f64(), Some(180.0));

    let messages = state.sales.publisher().messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].event_type, "SaleCreated");
    let payload: SaleCreatedData = messages[0].payload().unwrap();
    assert_eq!(payload.sale_id.to_string(), json["id"].as_str().unwrap());
}

#[tokio::test]
async fn test_create_and_get_sale() {
    let (app, _) = setup();
    let id = create_sale(&app).await;

    let response = app
        .oneshot(empty_request("GET", &format!("/sales/{id}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["id"], id.as_str());
    assert_eq!(json["branch"], "Downtown");
    assert_eq!(json["totalValue"].as_f64(), Some(180.0));
}

#[tokio::test]
async fn test_list_sales() {
    let (app, _) = setup();
    create_sale(&app).await;
    create_sale(&app).await;

    let response = app.oneshot(empty_request("GET", "/sales")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_get_unknown_sale_is_404() {
    let (app, _) = setup();
    let id = common::SaleId::new();

    let response = app
        .oneshot(empty_request("GET", &format!("/sales/{id}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_invalid_sale_id_is_400() {
    let (app, _) = setup();

    let response = app
        .oneshot(empty_request("GET", "/sales/not-a-uuid"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_quantity_is_400_and_nothing_is_stored() {
    let (app, state) = setup();
    let mut sale = widget_sale();
    sale["items"][0]["quantity"] = serde_json::json!(0);

    let response = app
        .oneshot(json_request("POST", "/sales", sale))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().is_some());
    assert_eq!(state.sales.repository().sale_count().await, 0);
    assert_eq!(state.sales.publisher().published_count(), 0);
}

#[tokio::test]
async fn test_blank_client_is_400() {
    let (app, _) = setup();
    let mut sale = widget_sale();
    sale["client"] = serde_json::json!("   ");

    let response = app
        .oneshot(json_request("POST", "/sales", sale))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_repeated_item_id_is_400() {
    let (app, state) = setup();
    let item_id = common::ItemId::new();
    let sale = serde_json::json!({
        "client": "ACME",
        "branch": "Downtown",
        "items": [
            { "id": item_id, "product": "Widget", "quantity": 1, "unitPrice": 1.5 },
            { "id": item_id, "product": "Gadget", "quantity": 2, "unitPrice": 3.0 }
        ]
    });

    let response = app
        .oneshot(json_request("POST", "/sales", sale))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("Duplicate line item"));
    assert_eq!(state.sales.repository().sale_count().await, 0);
}

#[tokio::test]
async fn test_sixteen_digit_price_is_returned_exactly() {
    let (app, state) = setup();
    let body = r#"{
        "client": "ACME",
        "branch": "Downtown",
        "items": [{ "product": "Widget", "quantity": 1, "unitPrice": 1234567890123456.78 }]
    }"#;
    let request = Request::builder()
        .method("POST")
        .uri("/sales")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains(r#""totalValue":1234567890123456.78"#));

    let messages = state.sales.publisher().messages();
    let payload: SaleCreatedData = messages[0].payload().unwrap();
    assert_eq!(payload.total_value.to_string(), "1234567890123456.78");
}

#[tokio::test]
async fn test_duplicate_id_is_409() {
    let (app, _) = setup();
    let id = create_sale(&app).await;
    let mut sale = widget_sale();
    sale["id"] = serde_json::json!(id);

    let response = app
        .oneshot(json_request("POST", "/sales", sale))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_update_sale_uses_path_id() {
    let (app, state) = setup();
    let id = create_sale(&app).await;

    let replacement = serde_json::json!({
        "id": common::SaleId::new(),
        "client": "ACME",
        "branch": "Uptown",
        "items": [{ "product": "Gadget", "quantity": 3, "unitPrice": 5.0 }]
    });
    let response = app
        .clone()
        .oneshot(json_request("PUT", &format!("/sales/{id}"), replacement))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(empty_request("GET", &format!("/sales/{id}")))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["branch"], "Uptown");
    assert_eq!(json["totalValue"].as_f64(), Some(15.0));
    assert_eq!(state.sales.repository().sale_count().await, 1);

    let messages = state.sales.publisher().messages();
    assert_eq!(messages.last().unwrap().event_type, "SaleChanged");
}

#[tokio::test]
async fn test_update_unknown_sale_is_404() {
    let (app, state) = setup();
    let id = common::SaleId::new();

    let response = app
        .oneshot(json_request("PUT", &format!("/sales/{id}"), widget_sale()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(state.sales.publisher().published_count(), 0);
}

#[tokio::test]
async fn test_delete_sale_publishes_cancellation() {
    let (app, state) = setup();
    let id = create_sale(&app).await;

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/sales/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(empty_request("GET", &format!("/sales/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let messages = state.sales.publisher().messages();
    let last = messages.last().unwrap();
    assert_eq!(last.event_type, "SaleCancelled");
    let payload: SaleCancelledData = last.payload().unwrap();
    assert_eq!(payload.sale_id.to_string(), id);
}

#[tokio::test]
async fn test_delete_unknown_sale_is_silent() {
    let (app, state) = setup();
    let id = common::SaleId::new();

    let response = app
        .oneshot(empty_request("DELETE", &format!("/sales/{id}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(state.sales.repository().delete_count(), 0);
    assert_eq!(state.sales.publisher().published_count(), 0);
}

#[tokio::test]
async fn test_store_failure_is_500_without_details() {
    let (app, state) = setup();
    state.sales.repository().set_fail_on_read(true);

    let response = app.oneshot(empty_request("GET", "/sales")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "internal server error");
}

#[tokio::test]
async fn test_publish_failure_is_500_but_sale_is_kept() {
    let (app, state) = setup();
    state.sales.publisher().set_fail_on_publish(true);

    let response = app
        .oneshot(json_request("POST", "/sales", widget_sale()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(state.sales.repository().sale_count().await, 1);
}

#[tokio::test]
async fn test_metrics_endpoint_reports_sale_operations() {
    let (app, _) = setup();
    create_sale(&app).await;

    let response = app.oneshot(empty_request("GET", "/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("sale_operations_total"));
    assert!(text.contains("sale_events_published_total"));
}
