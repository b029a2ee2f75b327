mod common;

use axum::http::StatusCode;
use serde_json::json;
use snaplink::infrastructure::cache::CacheService;

async fn shorten(server: &axum_test::TestServer, url: &str) -> String {
    server
        .post("/api/shorten")
        .json(&json!({ "original_url": url }))
        .await
        .json::<serde_json::Value>()["short_code"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_redirect_success() {
    let app = common::TestApp::new();
    let server = app.server();

    let code = shorten(&server, "https://example.com/target").await;

    let response = server.get(&format!("/{code}")).await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header("location"), "https://example.com/target");
}

#[tokio::test]
async fn test_redirect_not_found() {
    let app = common::TestApp::new();
    let server = app.server();

    let response = server.get("/nope42").await;

    response.assert_status_not_found();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_redirect_populates_cache() {
    let app = common::TestApp::new();
    let server = app.server();

    let code = shorten(&server, "https://example.com/cached").await;
    assert_eq!(app.cache.get_url(&code).await.unwrap(), None);

    server
        .get(&format!("/{code}"))
        .await
        .assert_status(StatusCode::TEMPORARY_REDIRECT);

    assert_eq!(
        app.cache.get_url(&code).await.unwrap().as_deref(),
        Some("https://example.com/cached")
    );
}

#[tokio::test]
async fn test_redirect_counts_every_visit() {
    let app = common::TestApp::new();
    let server = app.server();

    let code = shorten(&server, "https://example.com/counted").await;

    for _ in 0..3 {
        server
            .get(&format!("/{code}"))
            .await
            .assert_status(StatusCode::TEMPORARY_REDIRECT);
    }

    // First visit is a miss counted inline, the other two go through the worker.
    let visits = common::wait_for_visits(app.repository.as_ref(), &code, 3).await;
    assert_eq!(visits, 3);
}

#[tokio::test]
async fn test_redirect_after_record_removed() {
    let app = common::TestApp::new();
    let server = app.server();

    let code = shorten(&server, "https://example.com/expiring").await;
    app.repository.remove(&code);

    server.get(&format!("/{code}")).await.assert_status_not_found();
}

#[tokio::test]
async fn test_redirect_json_lookup() {
    let app = common::TestApp::new();
    let server = app.server();

    let code = shorten(&server, "https://example.com/json").await;

    let response = server
        .get(&format!("/{code}"))
        .add_header("Accept", "application/json")
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<serde_json::Value>(),
        json!({ "original_url": "https://example.com/json" })
    );

    let visits = common::wait_for_visits(app.repository.as_ref(), &code, 1).await;
    assert_eq!(visits, 1);
}
