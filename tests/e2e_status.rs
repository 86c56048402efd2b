//! E2E tests for status endpoints

mod common;

use common::{TestServer, auth};
use serde_json::{Value, json};
use yatter::auth::AUTHENTICATION_HEADER;

#[tokio::test]
async fn test_create_and_get_status() {
    let server = TestServer::new().await;
    server.create_account("john").await;

    let response = server
        .client
        .post(server.url("/v1/statuses"))
        .header(AUTHENTICATION_HEADER, auth("john"))
        .json(&json!({ "status": "Hello, world!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["content"], "Hello, world!");
    assert_eq!(created["account"]["username"], "john");
    assert_eq!(created["media_attachments"], json!([]));

    let id = created["id"].as_i64().unwrap();
    let response = server
        .client
        .get(server.url(&format!("/v1/statuses/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let fetched: Value = response.json().await.unwrap();
    assert_eq!(fetched["id"], id);
    assert_eq!(fetched["content"], "Hello, world!");
}

#[tokio::test]
async fn test_create_status_requires_auth() {
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/v1/statuses"))
        .json(&json!({ "status": "anonymous" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_create_empty_status() {
    let server = TestServer::new().await;
    server.create_account("john").await;

    let response = server
        .client
        .post(server.url("/v1/statuses"))
        .header(AUTHENTICATION_HEADER, auth("john"))
        .json(&json!({ "status": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_get_missing_status() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/v1/statuses/12345"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_status_read_is_public_but_delete_is_not() {
    let server = TestServer::new().await;
    server.create_account("john").await;
    let id = server.post_status("john", "public read").await;

    let response = server
        .client
        .get(server.url(&format!("/v1/statuses/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = server
        .client
        .delete(server.url(&format!("/v1/statuses/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    // Still there
    let response = server
        .client
        .get(server.url(&format!("/v1/statuses/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_delete_status() {
    let server = TestServer::new().await;
    server.create_account("john").await;
    server.create_account("jane").await;
    let id = server.post_status("john", "to be deleted").await;

    // Someone else's status
    let response = server
        .client
        .delete(server.url(&format!("/v1/statuses/{id}")))
        .header(AUTHENTICATION_HEADER, auth("jane"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let response = server
        .client
        .delete(server.url(&format!("/v1/statuses/{id}")))
        .header(AUTHENTICATION_HEADER, auth("john"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let response = server
        .client
        .get(server.url(&format!("/v1/statuses/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let response = server
        .client
        .delete(server.url(&format!("/v1/statuses/{id}")))
        .header(AUTHENTICATION_HEADER, auth("john"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}
