mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn test_health_endpoint_success() {
    let app = common::TestApp::new();
    let server = app.server();

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["database"]["status"], "ok");
    assert_eq!(json["checks"]["visit_queue"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["message"], "memory connected");
}

#[tokio::test]
async fn test_health_endpoint_structure() {
    let app = common::TestApp::new();
    let server = app.server();

    let response = server.get("/health").await;

    let json = response.json::<serde_json::Value>();

    assert!(json.get("status").is_some());
    assert!(json.get("version").is_some());
    assert!(json.get("checks").is_some());
    assert!(json["checks"].get("database").is_some());
    assert!(json["checks"].get("visit_queue").is_some());
    assert!(json["checks"].get("cache").is_some());
}

#[tokio::test]
async fn test_health_degraded_when_worker_gone() {
    let app = common::TestApp::new();
    let server = app.server();

    let worker = app.worker;
    worker.abort();
    let _ = worker.await;

    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["visit_queue"]["status"], "error");
}
