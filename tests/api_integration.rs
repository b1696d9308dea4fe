//! End-to-end tests for the HTTP surface
//!
//! The router is driven with `tower::ServiceExt::oneshot`; the client
//! address normally supplied by the connected socket is injected as a
//! request extension, the same way the server's connect-info layer would.

use anyhow::anyhow;
use async_trait::async_trait;
use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, StatusCode},
    Router,
};
use footfall::api;
use footfall::config::VisitorsFormat;
use footfall::models::Visitor;
use footfall::storage::{MemoryStore, StoreError, StoreResult, VisitorStore};
use footfall::tracker::VisitTracker;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;

/// Store stand-in for a database that cannot be reached
struct UnavailableStore;

#[async_trait]
impl VisitorStore for UnavailableStore {
    async fn init(&self) -> anyhow::Result<()> {
        Err(anyhow!("connection refused"))
    }

    async fn record_if_new(&self, _ip: &str, _seen_at: i64) -> StoreResult<bool> {
        Err(StoreError::Unavailable(anyhow!("connection refused")))
    }

    async fn list_all(&self) -> StoreResult<Vec<Visitor>> {
        Err(StoreError::ReadFailed(anyhow!("connection refused")))
    }
}

/// Helper to build an app over a fresh in-memory store
fn create_test_app(format: VisitorsFormat) -> Router {
    let tracker = Arc::new(VisitTracker::new(Arc::new(MemoryStore::new())));
    api::create_router(tracker, format)
}

/// Issue a GET as if `client` were the connected peer
async fn get_as(app: &Router, path: &str, client: &str) -> axum::response::Response {
    let addr: SocketAddr = format!("{}:40000", client).parse().unwrap();

    let mut request = Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .unwrap();
    // Insert test ConnectInfo extension
    request.extensions_mut().insert(ConnectInfo(addr));

    app.clone().oneshot(request).await.unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_ping_returns_pong() {
    let app = create_test_app(VisitorsFormat::Text);

    let response = get_as(&app, "/ping", "10.0.0.1").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "pong");
}

#[tokio::test]
async fn test_visits_returns_decimal_count() {
    let app = create_test_app(VisitorsFormat::Text);

    let response = get_as(&app, "/visits", "10.0.0.1").await;
    assert_eq!(body_string(response).await, "0");

    get_as(&app, "/ping", "10.0.0.1").await;
    get_as(&app, "/ping", "10.0.0.2").await;
    get_as(&app, "/ping", "10.0.0.1").await;

    let response = get_as(&app, "/visits", "10.0.0.1").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "3");
}

#[tokio::test]
async fn test_visitors_text_lists_ips_in_first_seen_order() {
    let app = create_test_app(VisitorsFormat::Text);

    get_as(&app, "/ping", "1.1.1.1").await;
    get_as(&app, "/ping", "2.2.2.2").await;
    get_as(&app, "/ping", "3.3.3.3").await;
    // Repeat visit must not duplicate or reorder
    get_as(&app, "/ping", "1.1.1.1").await;

    let response = get_as(&app, "/visitors", "9.9.9.9").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "1.1.1.1\n2.2.2.2\n3.3.3.3\n");
}

#[tokio::test]
async fn test_visitors_json_shape() {
    let app = create_test_app(VisitorsFormat::Json);

    get_as(&app, "/ping", "10.0.0.1").await;
    get_as(&app, "/ping", "10.0.0.2").await;

    let response = get_as(&app, "/visitors", "9.9.9.9").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
    let users = json["users"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["id"], 1);
    assert_eq!(users[0]["ip"], "10.0.0.1");
    assert_eq!(users[1]["id"], 2);
    assert_eq!(users[1]["ip"], "10.0.0.2");
}

#[tokio::test]
async fn test_visitors_json_empty_listing() {
    let app = create_test_app(VisitorsFormat::Json);

    let response = get_as(&app, "/visitors", "9.9.9.9").await;
    let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["users"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_unrecognized_paths_get_empty_404() {
    let app = create_test_app(VisitorsFormat::Text);

    for path in ["/", "/nope", "/ping/extra"] {
        let response = get_as(&app, path, "10.0.0.1").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "path {}", path);
        assert_eq!(body_string(response).await, "");
    }
}

#[tokio::test]
async fn test_store_failure_maps_to_server_error() {
    let tracker = Arc::new(VisitTracker::new(Arc::new(UnavailableStore)));
    let app = api::create_router(tracker, VisitorsFormat::Text);

    let response = get_as(&app, "/ping", "10.0.0.1").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_string(response).await, "visitor store unavailable");

    let response = get_as(&app, "/visitors", "10.0.0.1").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_string(response).await, "failed to list visitors");

    // Counter reads keep working in degraded mode, and failed pings
    // never counted
    let response = get_as(&app, "/visits", "10.0.0.1").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "0");
}

#[tokio::test]
async fn test_end_to_end_scenario() {
    let app = create_test_app(VisitorsFormat::Text);

    let response = get_as(&app, "/ping", "10.0.0.1").await;
    assert_eq!(body_string(response).await, "pong");
    assert_eq!(body_string(get_as(&app, "/visits", "127.0.0.1").await).await, "1");

    get_as(&app, "/ping", "10.0.0.1").await;
    assert_eq!(body_string(get_as(&app, "/visits", "127.0.0.1").await).await, "2");

    get_as(&app, "/ping", "10.0.0.2").await;
    assert_eq!(body_string(get_as(&app, "/visits", "127.0.0.1").await).await, "3");

    let response = get_as(&app, "/visitors", "127.0.0.1").await;
    assert_eq!(body_string(response).await, "10.0.0.1\n10.0.0.2\n");
}

#[tokio::test]
async fn test_concurrent_pings_over_http() {
    let app = create_test_app(VisitorsFormat::Text);

    let mut handles = vec![];
    for _ in 0..25 {
        let app_clone = app.clone();
        handles.push(tokio::spawn(async move {
            let addr: SocketAddr = "198.51.100.4:40000".parse().unwrap();
            let mut request = Request::builder()
                .method("GET")
                .uri("/ping")
                .body(Body::empty())
                .unwrap();
            request.extensions_mut().insert(ConnectInfo(addr));
            app_clone.oneshot(request).await.unwrap()
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap().status(), StatusCode::OK);
    }

    assert_eq!(body_string(get_as(&app, "/visits", "127.0.0.1").await).await, "25");
    assert_eq!(
        body_string(get_as(&app, "/visitors", "127.0.0.1").await).await,
        "198.51.100.4\n"
    );
}
