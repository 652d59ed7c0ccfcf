//! Router-level tests: requests go through routing, extraction and error
//! rendering exactly as they would over the wire.

use super::*;
use crate::config::ValidationConfig;
use crate::store::TradeStore;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use serde_json::{Value, json};
use tempfile::TempDir;
use std::time::Duration;
use tower::ServiceExt; // for oneshot

async fn test_router() -> (TempDir, Router) {
    let dir = TempDir::new().unwrap();
    let store = TradeStore::open(dir.path().join("trades")).await.unwrap();
    let state = Arc::new(AppState::new(store, ValidationConfig::default()));
    (dir, create_router(state))
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<&str>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let request = builder
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap();
    router.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

const AAPL: &str = r#"{"symbol":"AAPL","quantity":100,"price":150.25,"side":"BUY"}"#;

#[tokio::test]
async fn test_health_route() {
    let (_dir, router) = test_router().await;

    let response = send(&router, Method::GET, "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_full_lifecycle_scenario() {
    let (_dir, router) = test_router().await;

    let created = send(&router, Method::POST, "/trades", Some(AAPL)).await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let created = body_json(created).await;
    let trade_id = created["trade_id"].as_str().unwrap().to_string();
    assert_eq!(created["trade_data"]["trade_id"], trade_id.as_str());

    let listed = body_json(send(&router, Method::GET, "/trades", None).await).await;
    assert_eq!(listed["count"], 1);
    assert_eq!(listed["trades"].as_array().unwrap().len(), 1);

    let path = format!("/trades/{trade_id}");
    let deleted = send(&router, Method::DELETE, &path, None).await;
    assert_eq!(deleted.status(), StatusCode::OK);
    let deleted = body_json(deleted).await;
    assert_eq!(deleted["trade_id"], trade_id.as_str());
    assert_eq!(deleted["message"], "Trade deleted successfully");

    let gone = send(&router, Method::GET, &path, None).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(gone).await["error"], "Trade not found");

    let again = send(&router, Method::DELETE, &path, None).await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_fields_scenario() {
    let (_dir, router) = test_router().await;

    let response = send(&router, Method::POST, "/trades", Some(r#"{"symbol":"AAPL"}"#)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Missing required fields");
    assert_eq!(body["missing_fields"], json!(["quantity", "price", "side"]));
    assert_eq!(
        body["required_fields"],
        json!(["symbol", "quantity", "price", "side"])
    );
}

#[tokio::test]
async fn test_empty_object_lists_every_missing_field() {
    let (_dir, router) = test_router().await;

    let response = send(&router, Method::POST, "/trades", Some("{}")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Missing required fields");
    assert_eq!(
        body["missing_fields"],
        json!(["symbol", "quantity", "price", "side"])
    );
    assert_eq!(body["required_fields"], body["missing_fields"]);

    let listed = body_json(send(&router, Method::GET, "/trades", None).await).await;
    assert_eq!(listed["count"], 0);
}

#[tokio::test]
async fn test_update_with_empty_object_keeps_only_identity() {
    let (_dir, router) = test_router().await;
    let created = body_json(send(&router, Method::POST, "/trades", Some(AAPL)).await).await;
    let trade_id = created["trade_id"].as_str().unwrap();
    let path = format!("/trades/{trade_id}");

    let response = send(&router, Method::PUT, &path, Some("{}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let fetched = body_json(send(&router, Method::GET, &path, None).await).await;
    let data = fetched["trade_data"].as_object().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data["trade_id"], trade_id);
    assert!(data["updated_timestamp"].is_string());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (_dir, router) = test_router().await;

    let response = send(&router, Method::POST, "/trades", Some("invalid json")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid JSON format");
}

#[tokio::test]
async fn test_missing_body_is_bad_request() {
    let (_dir, router) = test_router().await;

    let response = send(&router, Method::POST, "/trades", None).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No JSON data provided");
}

#[tokio::test]
async fn test_update_round_trip() {
    let (_dir, router) = test_router().await;
    let created = body_json(send(&router, Method::POST, "/trades", Some(AAPL)).await).await;
    let trade_id = created["trade_id"].as_str().unwrap();
    let path = format!("/trades/{trade_id}");

    let update = r#"{"symbol":"AAPL","quantity":125,"price":151.0,"side":"BUY"}"#;
    let response = send(&router, Method::PUT, &path, Some(update)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["message"], "Trade updated successfully");
    assert_eq!(updated["trade_id"], trade_id);

    let fetched = body_json(send(&router, Method::GET, &path, None).await).await;
    let data = fetched["trade_data"].as_object().unwrap();
    assert_eq!(data["quantity"], 125);
    assert_eq!(data["trade_id"], trade_id);
    assert!(data["updated_timestamp"].is_string());
    assert!(!data.contains_key("timestamp"));
    assert_eq!(data.len(), 6);
}

#[tokio::test]
async fn test_update_unknown_is_not_found() {
    let (_dir, router) = test_router().await;

    let response = send(&router, Method::PUT, "/trades/unknown-id", Some(AAPL)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let listed = body_json(send(&router, Method::GET, "/trades", None).await).await;
    assert_eq!(listed["count"], 0);
}

#[tokio::test]
async fn test_api_prefix_serves_same_store() {
    let (_dir, router) = test_router().await;

    let created = send(&router, Method::POST, "/api/trades", Some(AAPL)).await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let trade_id = body_json(created).await["trade_id"]
        .as_str()
        .unwrap()
        .to_string();

    let fetched = send(&router, Method::GET, &format!("/trades/{trade_id}"), None).await;
    assert_eq!(fetched.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_structured_404() {
    let (_dir, router) = test_router().await;

    let response = send(&router, Method::GET, "/nope", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Endpoint not found");
    assert_eq!(body["message"], "The requested endpoint does not exist");
}

#[tokio::test]
async fn test_wrong_method_is_structured_405() {
    let (_dir, router) = test_router().await;

    for (method, uri) in [
        (Method::DELETE, "/trades"),
        (Method::POST, "/trades/some-id"),
        (Method::POST, "/health"),
    ] {
        let response = send(&router, method, uri, None).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{uri}");
        assert_eq!(body_json(response).await["error"], "Method not allowed");
    }
}

#[tokio::test]
async fn test_slow_request_times_out_with_error_body() {
    let slow = Router::new().route(
        "/slow",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "done"
        }),
    );
    let router = with_request_timeout(slow, Duration::from_millis(50));

    let response = send(&router, Method::GET, "/slow", None).await;

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Request timeout");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_timeout_layer_passes_fast_requests() {
    let (_dir, router) = test_router().await;
    let router = with_request_timeout(router, Duration::from_secs(5));

    let response = send(&router, Method::GET, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&router, Method::GET, "/nope", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
