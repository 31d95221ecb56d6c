use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::Service;

use structured_errors::{ErrorMap, Errors, WireEntity, WireFormat};

// Helper to create test app
fn create_test_app(default_format: WireFormat) -> axum::Router {
    use structured_errors::api;
    use std::sync::Arc;

    let state = Arc::new(
        api::handlers::AppStateInner::new(default_format, "test-instance")
            .with_inventory([("apple", 3), ("pear", 1)]),
    );

    api::routes::create_router(state)
}

// Helper to send request and return status, content type and raw body
async fn send_request(
    app: &mut axum::Router,
    method: &str,
    uri: &str,
    accept: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, String, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(accept) = accept {
        builder = builder.header(header::ACCEPT, accept);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.call(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_health_endpoint() {
    let mut app = create_test_app(WireFormat::Json);
    let (status, _, body) = send_request(&mut app, "GET", "/health", None, None).await;
    let body: Value = serde_json::from_str(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["instance_id"], "test-instance");
    assert_eq!(body["default_format"], "json");
}

#[tokio::test]
async fn test_create_user_reports_every_invalid_field() {
    let mut app = create_test_app(WireFormat::Json);
    let (status, content_type, body) = send_request(
        &mut app,
        "POST",
        "/users",
        None,
        Some(json!({ "name": "", "email": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(content_type, "application/json");

    let errors = Errors::decode(WireFormat::Json, &body).unwrap();
    let mut expected = Errors::new(400);
    expected
        .add_at("field.required", "", "name")
        .unwrap()
        .add_at("field.required", "", "email")
        .unwrap();
    assert_eq!(errors, expected);
}

#[tokio::test]
async fn test_create_user_then_conflict() {
    let mut app = create_test_app(WireFormat::Json);
    let user = json!({ "name": "Ada", "email": "ada@example.com" });

    let (status, _, body) =
        send_request(&mut app, "POST", "/users", None, Some(user.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let created: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(created["id"], 1);

    let (status, _, body) = send_request(&mut app, "POST", "/users", None, Some(user)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["code"], 409);
    assert_eq!(body["error"][0]["key"], "email.taken");
}

#[tokio::test]
async fn test_malformed_body_is_structured_bad_request() {
    let mut app = create_test_app(WireFormat::Json);
    let (status, _, body) =
        send_request(&mut app, "POST", "/users", None, Some(json!(["not", "an", "object"]))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors = Errors::decode(WireFormat::Json, &body).unwrap();
    assert_eq!(errors.as_slice()[0].key(), "body.invalid");
}

#[tokio::test]
async fn test_get_user_not_found_negotiates_xml() {
    let mut app = create_test_app(WireFormat::Json);
    let (status, content_type, body) =
        send_request(&mut app, "GET", "/users/42", Some("application/xml"), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(content_type, "application/xml");
    assert!(body.starts_with(r#"<errors code="404">"#));

    let errors = Errors::decode(WireFormat::Xml, &body).unwrap();
    assert_eq!(errors.as_slice()[0].key(), "user.missing");
    assert_eq!(errors.as_slice()[0].description(), Some("user 42 does not exist"));
}

#[tokio::test]
async fn test_batch_orders_reports_per_order() {
    let mut app = create_test_app(WireFormat::Json);
    let (status, _, body) = send_request(
        &mut app,
        "POST",
        "/orders/batch",
        Some("application/json"),
        Some(json!({
            "orders": [
                { "id": "order-1", "sku": "apple", "quantity": 5 },
                { "id": "order-2", "sku": "pear", "quantity": 1 },
                { "id": "order-3", "sku": "kiwi", "quantity": 1 }
            ]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    let map = ErrorMap::decode(WireFormat::Json, &body).unwrap();
    assert_eq!(map.get("order-1").map(|e| e.key()), Some("stock.unavailable"));
    assert!(map.get("order-2").is_none());
    assert_eq!(map.get("order-3").map(|e| e.location()), Some(Some("sku")));
}

#[tokio::test]
async fn test_batch_orders_accepts_valid_batch() {
    let mut app = create_test_app(WireFormat::Json);
    let (status, _, body) = send_request(
        &mut app,
        "POST",
        "/orders/batch",
        None,
        Some(json!({ "orders": [{ "id": "order-1", "sku": "apple", "quantity": 3 }] })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["accepted"], json!(["order-1"]));
}

#[tokio::test]
async fn test_configured_default_format_applies_to_wildcard() {
    let mut app = create_test_app(WireFormat::Xml);
    let (status, content_type, body) =
        send_request(&mut app, "GET", "/errors/sample", Some("*/*"), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(content_type, "application/xml");
    assert_eq!(
        Errors::decode(WireFormat::Xml, &body).unwrap(),
        Errors::single_at(400, "field.required", "name is required", "name").unwrap()
    );
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let mut app = create_test_app(WireFormat::Json);
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn test_metrics_endpoint_counts_error_responses() {
    let mut app = create_test_app(WireFormat::Json);
    send_request(&mut app, "GET", "/users/7", None, None).await;

    let (status, _, body) = send_request(&mut app, "GET", "/metrics", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("error_responses_total"));
    assert!(body.contains(r#"status="404""#));
}
