//! E2E tests for follow relations

mod common;

use common::{TestServer, auth};
use serde_json::Value;
use yatter::auth::AUTHENTICATION_HEADER;

#[tokio::test]
async fn test_follow_returns_relationship() {
    let server = TestServer::new().await;
    server.create_account("john").await;
    let jane = server.create_account("jane").await;

    let json = server.follow("john", "jane").await;
    assert_eq!(json["id"], jane["id"]);
    assert_eq!(json["username"], "jane");
    assert_eq!(json["following"], true);
    assert_eq!(json["followed_by"], false);
}

#[tokio::test]
async fn test_follow_twice_creates_one_edge() {
    let server = TestServer::new().await;
    server.create_account("john").await;
    server.create_account("jane").await;

    server.follow("john", "jane").await;
    server.follow("john", "jane").await;

    let json: Value = server
        .client
        .get(server.url("/v1/accounts/jane"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["followers_count"], 1);

    let json: Value = server
        .client
        .get(server.url("/v1/accounts/john"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["following_count"], 1);
}

#[tokio::test]
async fn test_unfollow() {
    let server = TestServer::new().await;
    server.create_account("john").await;
    server.create_account("jane").await;
    server.follow("john", "jane").await;

    for _ in 0..2 {
        let response = server
            .client
            .post(server.url("/v1/accounts/jane/unfollow"))
            .header(AUTHENTICATION_HEADER, auth("john"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let json: Value = response.json().await.unwrap();
        assert_eq!(json["following"], false);
    }
}

#[tokio::test]
async fn test_follow_errors() {
    let server = TestServer::new().await;
    server.create_account("john").await;

    // Unknown target
    let response = server
        .client
        .post(server.url("/v1/accounts/nobody/follow"))
        .header(AUTHENTICATION_HEADER, auth("john"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    // Self follow
    let response = server
        .client
        .post(server.url("/v1/accounts/john/follow"))
        .header(AUTHENTICATION_HEADER, auth("john"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // No authentication
    let response = server
        .client
        .post(server.url("/v1/accounts/john/follow"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_following_and_followers_lists() {
    let server = TestServer::new().await;
    for name in ["john", "jane", "bob"] {
        server.create_account(name).await;
    }
    server.follow("john", "bob").await;
    server.follow("john", "jane").await;
    server.follow("jane", "bob").await;

    let json: Value = server
        .client
        .get(server.url("/v1/accounts/john/following"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|account| account["username"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["bob", "jane"]);

    let json: Value = server
        .client
        .get(server.url("/v1/accounts/bob/followers?limit=1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|account| account["username"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["john"]);

    let response = server
        .client
        .get(server.url("/v1/accounts/bob/followers?limit=81"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_relationships() {
    let server = TestServer::new().await;
    for name in ["john", "jane", "bob"] {
        server.create_account(name).await;
    }
    server.follow("john", "jane").await;
    server.follow("bob", "john").await;

    let response = server
        .client
        .get(server.url("/v1/accounts/relationships?username=jane,bob,nobody"))
        .header(AUTHENTICATION_HEADER, auth("john"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let json: Value = response.json().await.unwrap();
    let relations = json.as_array().unwrap();
    assert_eq!(relations.len(), 2);
    assert_eq!(relations[0]["username"], "jane");
    assert_eq!(relations[0]["following"], true);
    assert_eq!(relations[0]["followed_by"], false);
    assert_eq!(relations[1]["username"], "bob");
    assert_eq!(relations[1]["following"], false);
    assert_eq!(relations[1]["followed_by"], true);
}
