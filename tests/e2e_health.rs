//! E2E tests for health check and basic server functionality

mod common;

use common::TestServer;

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    yatter::metrics::init_metrics();
    let server = TestServer::new().await;
    server.create_account("metrics_user").await;

    let response = server
        .client
        .get(server.url("/metrics"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("yatter_accounts_created_total"));
}

#[tokio::test]
async fn test_cors_headers() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/health"))
        .header("Origin", "https://test.example.com")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|value| value.to_str().ok()),
        Some("https://test.example.com")
    );
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/v1/does-not-exist"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
}
