//! Common test utilities for E2E tests

#![allow(dead_code)]

use glimpse::{AppState, config};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

/// A registered user and the session cookie issued for them
pub struct TestUser {
    pub id: String,
    pub username: String,
    pub cookie: String,
}

impl TestServer {
    /// Start a server on a random port backed by a temporary directory
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();

        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                domain: "localhost".to_string(),
                protocol: "http".to_string(),
                client_origin: Some("http://localhost:5173".to_string()),
                max_body_bytes: 5 * 1024 * 1024,
            },
            database: config::DatabaseConfig {
                path: temp_dir.path().join("test.db"),
            },
            storage: config::StorageConfig {
                media: config::MediaStorageConfig {
                    path: temp_dir.path().join("media"),
                    public_url: "/media".to_string(),
                },
            },
            auth: config::AuthConfig {
                session_secret: "test-secret-key-that-is-32-bytes-long".to_string(),
                session_max_age: 604800,
            },
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

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = glimpse::build_router(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr: format!("http://{}", addr),
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Register a user through the API and keep its session cookie
    pub async fn register(&self, username: &str) -> TestUser {
        let response = self
            .client
            .post(self.url("/api/user/register"))
            .json(&json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": "password123",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);

        let cookie = session_cookie(&response).expect("register sets a session cookie");
        let body: Value = response.json().await.unwrap();

        TestUser {
            id: body["data"]["id"].as_str().unwrap().to_string(),
            username: username.to_string(),
            cookie,
        }
    }

    pub async fn get(&self, path: &str, user: &TestUser) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .header("Cookie", &user.cookie)
            .send()
            .await
            .unwrap()
    }

    pub async fn put(&self, path: &str, user: &TestUser, body: Value) -> reqwest::Response {
        self.client
            .put(self.url(path))
            .header("Cookie", &user.cookie)
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    pub async fn post_json(&self, path: &str, user: &TestUser, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .header("Cookie", &user.cookie)
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    pub async fn delete(&self, path: &str, user: &TestUser) -> reqwest::Response {
        self.client
            .delete(self.url(path))
            .header("Cookie", &user.cookie)
            .send()
            .await
            .unwrap()
    }

    /// Create a post with a small PNG through the multipart endpoint
    pub async fn create_post(&self, user: &TestUser, caption: &str) -> Value {
        let image = reqwest::multipart::Part::bytes(png_bytes())
            .file_name("photo.png")
            .mime_str("image/png")
            .unwrap();
        let form = reqwest::multipart::Form::new()
            .text("caption", caption.to_string())
            .part("image", image);

        let response = self
            .client
            .post(self.url("/api/post/new"))
            .header("Cookie", &user.cookie)
            .multipart(form)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);

        let body: Value = response.json().await.unwrap();
        body["data"].clone()
    }
}

/// `name=value` pair of the session cookie set on a response
pub fn session_cookie(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("session="))
        .and_then(|v| v.split(';').next())
        .map(ToString::to_string)
}

/// PNG signature followed by filler, enough for content sniffing
pub fn png_bytes() -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&[0u8; 32]);
    bytes
}
