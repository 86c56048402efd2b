//! Common test utilities for E2E tests

#![allow(dead_code)]

use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::net::TcpListener;
use yatter::{AppState, config};

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        Self::with_timeline(config::TimelineConfig::default()).await
    }

    /// Create a test server with custom timeline settings
    pub async fn with_timeline(timeline: config::TimelineConfig) -> Self {
        // Create temporary directory for test database and media
        let temp_dir = TempDir::new().unwrap();

        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
                domain: "test.example.com".to_string(),
                protocol: "https".to_string(),
            },
            database: config::DatabaseConfig {
                path: temp_dir.path().join("test.db"),
            },
            storage: config::StorageConfig {
                media: config::MediaStorageConfig {
                    root: temp_dir.path().join("media"),
                    public_url: "https://media.test.example.com".to_string(),
                },
            },
            timeline,
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        let state = AppState::new(config).await.unwrap();

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        let app = yatter::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Create an account through the API
    pub async fn create_account(&self, username: &str) -> Value {
        let response = self
            .client
            .post(self.url("/v1/accounts"))
            .json(&json!({ "username": username, "password": "P@ssw0rd" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201, "creating {username}");
        response.json().await.unwrap()
    }

    /// Post a status as `username` and return its id
    pub async fn post_status(&self, username: &str, content: &str) -> i64 {
        let response = self
            .client
            .post(self.url("/v1/statuses"))
            .header(yatter::auth::AUTHENTICATION_HEADER, auth(username))
            .json(&json!({ "status": content }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);
        let json: Value = response.json().await.unwrap();
        json["id"].as_i64().unwrap()
    }

    /// Make `follower` follow `target`
    pub async fn follow(&self, follower: &str, target: &str) -> Value {
        let response = self
            .client
            .post(self.url(&format!("/v1/accounts/{target}/follow")))
            .header(yatter::auth::AUTHENTICATION_HEADER, auth(follower))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        response.json().await.unwrap()
    }
}

/// `Authentication` header value for `username`
pub fn auth(username: &str) -> String {
    format!("username {username}")
}

/// Status ids of a timeline response, in order
pub fn status_ids(json: &Value) -> Vec<i64> {
    json.as_array()
        .unwrap()
        .iter()
        .map(|status| status["id"].as_i64().unwrap())
        .collect()
}
