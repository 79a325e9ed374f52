//! End-to-end tests for the catalog endpoints and their change notifications.

use axum::{body::Body, http::Request, Router};
use herald_node::{create_router, AppState, NodeConfig};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::broadcast;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    state: AppState,
    events: broadcast::Receiver<String>,
}

fn create_test_app() -> TestApp {
    let (state, _task) = AppState::from_config(&NodeConfig::default());
    let events = state.hub.subscribe_events();
    TestApp {
        router: create_router(state.clone()),
        state,
        events,
    }
}

impl TestApp {
    async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (u16, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status().as_u16();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    /// Next text broadcast to clients.
    async fn next_event(&mut self) -> String {
        tokio::time::timeout(Duration::from_secs(2), self.events.recv())
            .await
            .expect("no broadcast")
            .unwrap()
    }
}

#[tokio::test]
async fn test_health() {
    let app = create_test_app();

    let (status, body) = app.request("GET", "/health", None).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_create_category_announces() {
    let mut app = create_test_app();

    let (status, body) = app
        .request("POST", "/categories", Some(json!({"name": "Books"})))
        .await;
    assert_eq!(status, 201);
    assert_eq!(body["id"], 1);
    assert_eq!(body["name"], "Books");

    assert_eq!(app.next_event().await, "Category added: Books");
}

#[tokio::test]
async fn test_category_lifecycle() {
    let mut app = create_test_app();

    app.request("POST", "/categories", Some(json!({"name": "Books"})))
        .await;
    assert_eq!(app.next_event().await, "Category added: Books");

    let (status, body) = app
        .request("PATCH", "/categories/1", Some(json!({"name": "Novels"})))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["name"], "Novels");
    assert_eq!(app.next_event().await, "Category updated: Novels");

    let (status, body) = app.request("GET", "/categories/1", None).await;
    assert_eq!(status, 200);
    assert_eq!(body["name"], "Novels");

    let (status, _) = app.request("DELETE", "/categories/1", None).await;
    assert_eq!(status, 200);
    assert_eq!(app.next_event().await, "Category deleted: ID 1");

    let (status, body) = app.request("GET", "/categories/1", None).await;
    assert_eq!(status, 404);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_item_lifecycle() {
    let mut app = create_test_app();

    app.request("POST", "/categories", Some(json!({"name": "Office"})))
        .await;
    app.next_event().await;

    let (status, body) = app
        .request(
            "POST",
            "/items",
            Some(json!({"name": "Pen", "category_id": 1})),
        )
        .await;
    assert_eq!(status, 201);
    assert_eq!(body["category_id"], 1);
    assert_eq!(app.next_event().await, "Item added: Pen");

    let (status, _) = app
        .request("PATCH", "/items/1", Some(json!({"name": "Fountain Pen"})))
        .await;
    assert_eq!(status, 200);
    assert_eq!(app.next_event().await, "Item updated: Fountain Pen");

    let (status, _) = app.request("DELETE", "/items/1", None).await;
    assert_eq!(status, 200);
    assert_eq!(app.next_event().await, "Item deleted: ID 1");
}

#[tokio::test]
async fn test_failed_delete_announces_nothing() {
    let mut app = create_test_app();

    let (status, body) = app.request("DELETE", "/items/42", None).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "item not found: 42");

    // The next broadcast is the one from the later successful change
    app.request("POST", "/categories", Some(json!({"name": "Books"})))
        .await;
    assert_eq!(app.next_event().await, "Category added: Books");
    assert_eq!(app.state.hub.stats().total_broadcasts, 1);
}

#[tokio::test]
async fn test_duplicate_category_conflict() {
    let mut app = create_test_app();

    app.request("POST", "/categories", Some(json!({"name": "Books"})))
        .await;
    app.next_event().await;

    let (status, body) = app
        .request("POST", "/categories", Some(json!({"name": "Books"})))
        .await;
    assert_eq!(status, 409);
    assert!(body["error"].as_str().unwrap().contains("Books"));
    assert_eq!(app.state.catalog.category_count(), 1);
    assert_eq!(app.state.hub.stats().total_broadcasts, 1);
}

#[tokio::test]
async fn test_item_requires_existing_category() {
    let app = create_test_app();

    let (status, body) = app
        .request(
            "POST",
            "/items",
            Some(json!({"name": "Ghost", "category_id": 99})),
        )
        .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "category not found: 99");
    assert_eq!(app.state.catalog.item_count(), 0);
}

#[tokio::test]
async fn test_invalid_names_rejected() {
    let app = create_test_app();

    let (status, body) = app
        .request("POST", "/categories", Some(json!({"name": ""})))
        .await;
    assert_eq!(status, 422);
    assert_eq!(body["error"], "validation_error");

    // Passes the length rule but is blank once trimmed
    let (status, body) = app
        .request("POST", "/categories", Some(json!({"name": "   "})))
        .await;
    assert_eq!(status, 400);
    assert!(body["error"].is_string());

    assert_eq!(app.state.hub.stats().total_broadcasts, 0);
}

#[tokio::test]
async fn test_list_pagination() {
    let app = create_test_app();

    for i in 0..12 {
        let (status, _) = app
            .request(
                "POST",
                "/categories",
                Some(json!({"name": format!("cat-{}", i)})),
            )
            .await;
        assert_eq!(status, 201);
    }

    let (status, body) = app.request("GET", "/categories", None).await;
    assert_eq!(status, 200);
    assert_eq!(body.as_array().unwrap().len(), 10);

    let (_, body) = app
        .request("GET", "/categories?skip=10&limit=5", None)
        .await;
    let page = body.as_array().unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0]["name"], "cat-10");
}

#[tokio::test]
async fn test_request_id_header() {
    let app = create_test_app();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "req-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-1");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let mut app = create_test_app();

    app.request("POST", "/categories", Some(json!({"name": "Books"})))
        .await;
    app.next_event().await;

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("herald_notifications"));
}
