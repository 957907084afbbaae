//! Integration tests for the HTTP routes.
//!
//! The websocket session loop is covered by unit tests in `services::web`;
//! these check routing, static files and status codes.

#![cfg(feature = "web")]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use rs_rover::hal::MockBus;
use rs_rover::services::{build_router, SharedRobotState, WebServerConfig};
use rs_rover::RobotController;

fn create_test_app(config: &WebServerConfig) -> (axum::Router, Arc<SharedRobotState<MockBus>>) {
    let controller = RobotController::new(MockBus::new());
    let state = Arc::new(SharedRobotState::new(controller));
    let router = build_router(Arc::clone(&state), config);
    (router, state)
}

fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn static_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("rs-rover-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

// ============================================================================
// Index
// ============================================================================

#[tokio::test]
async fn test_index_served() {
    let (app, _state) = create_test_app(&WebServerConfig::default());

    let response = app.oneshot(request("GET", "/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response.headers()["content-type"].to_str().unwrap().to_owned();
    assert!(content_type.starts_with("text/html"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("/ws"));
}

#[tokio::test]
async fn test_index_wrong_method() {
    let (app, _state) = create_test_app(&WebServerConfig::default());

    let response = app.oneshot(request("POST", "/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// ============================================================================
// Static Files
// ============================================================================

#[tokio::test]
async fn test_static_file_served() {
    let dir = static_dir("static-ok");
    std::fs::write(dir.join("app.js"), "console.log('rover');").unwrap();

    let config = WebServerConfig::default().static_dir(&dir);
    let (app, _state) = create_test_app(&config);

    let response = app.oneshot(request("GET", "/static/app.js")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"console.log('rover');");

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn test_static_file_missing() {
    let dir = static_dir("static-missing");
    let config = WebServerConfig::default().static_dir(&dir);
    let (app, _state) = create_test_app(&config);

    let response = app.oneshot(request("GET", "/static/nope.css")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    std::fs::remove_dir_all(dir).ok();
}

// ============================================================================
// Control Channel
// ============================================================================

#[tokio::test]
async fn test_ws_requires_get() {
    let (app, _state) = create_test_app(&WebServerConfig::default());

    let response = app.oneshot(request("POST", "/ws")).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_ws_without_upgrade_rejected() {
    let (app, state) = create_test_app(&WebServerConfig::default());

    let response = app.oneshot(request("GET", "/ws")).await.unwrap();
    assert!(response.status().is_client_error());

    // No session was started
    assert_eq!(state.next_session_id(), 1);
}

// ============================================================================
// Fallback
// ============================================================================

#[tokio::test]
async fn test_unknown_route() {
    let (app, _state) = create_test_app(&WebServerConfig::default());

    let response = app.oneshot(request("GET", "/api/state")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_header_when_permissive() {
    let config = WebServerConfig::default().cors(true);
    let (app, _state) = create_test_app(&config);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/")
                .header("Origin", "http://example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}
