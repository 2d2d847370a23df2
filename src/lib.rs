//! Glimpse - a social media backend
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 API Layer (Axum, /api + /socket)            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                           │
//! │  - load → validate → authorize → mutate → notify            │
//! └─────────────────────────────────────────────────────────────┘
//!             │                                   │
//! ┌───────────────────────────┐   ┌─────────────────────────────┐
//! │  Data Layer (SQLite)      │   │  Realtime (registry, fan-out)│
//! │  Media store (filesystem) │   └─────────────────────────────┘
//! └───────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers and response envelopes
//! - `service`: Business logic layer
//! - `realtime`: Connection registry, notification fan-out, WebSocket endpoint
//! - `client`: Client-side notification inbox
//! - `data`: Database layer
//! - `storage`: Media storage
//! - `auth`: Passwords and sessions
//! - `config`: Configuration management
//! - `error`: Error types

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod realtime;
pub mod service;
pub mod storage;

use std::sync::Arc;

/// Application state shared across all handlers
///
/// Cloned for each request; every field is a shared handle.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Database connection pool
    pub db: Arc<data::Database>,

    /// Media storage (local filesystem)
    pub storage: Arc<storage::MediaStorage>,

    /// Live real-time connections
    pub connections: Arc<realtime::ConnectionRegistry>,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Steps
    /// 1. Connect to SQLite database
    /// 2. Prepare media storage
    /// 3. Create the connection registry
    ///
    /// # Errors
    /// Returns error if any initialization step fails
    pub async fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        let db = data::Database::connect(&config.database.path).await?;
        tracing::info!("Database connected");

        let storage = storage::MediaStorage::new(&config.storage.media).await?;
        tracing::info!(path = %config.storage.media.path.display(), "Media storage initialized");

        tracing::info!("Application state initialized successfully");

        Ok(Self {
            config: Arc::new(config),
            db: Arc::new(db),
            storage: Arc::new(storage),
            connections: Arc::new(realtime::ConnectionRegistry::new()),
        })
    }

    pub fn notifier(&self) -> realtime::Notifier {
        realtime::Notifier::new(self.connections.clone())
    }

    pub fn user_service(&self) -> service::UserService {
        service::UserService::new(self.db.clone(), self.storage.clone(), self.notifier())
    }

    pub fn post_service(&self) -> service::PostService {
        service::PostService::new(self.db.clone(), self.storage.clone(), self.notifier())
    }

    pub fn comment_service(&self) -> service::CommentService {
        service::CommentService::new(self.db.clone(), self.notifier())
    }

    pub fn reply_service(&self) -> service::ReplyService {
        service::ReplyService::new(self.db.clone(), self.notifier())
    }

    pub fn message_service(&self) -> service::MessageService {
        service::MessageService::new(self.db.clone(), self.notifier())
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::{Router, extract::DefaultBodyLimit, routing::get};
    use tower_http::{
        compression::CompressionLayer, limit::RequestBodyLimitLayer, services::ServeDir,
        trace::TraceLayer,
    };

    let cors_layer = build_cors_layer(&state.config);
    let max_body = state.config.server.max_body_bytes;
    let media_dir = ServeDir::new(state.storage.root());

    Router::new()
        .route("/health", get(health_check))
        .route("/socket", get(realtime::socket_handler))
        .nest("/api", api::api_router())
        .nest_service("/media", media_dir)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
        .merge(api::metrics_router())
}

fn build_cors_layer(config: &config::AppConfig) -> tower_http::cors::CorsLayer {
    use axum::http::{HeaderValue, Method, header};
    use tower_http::cors::CorsLayer;

    let allowed_origin = config.allowed_origin();
    match HeaderValue::from_str(&allowed_origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin([origin])
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true),
        Err(error) => {
            tracing::error!(
                %error,
                origin = %allowed_origin,
                "Failed to parse CORS origin; denying cross-origin requests"
            );
            CorsLayer::new()
        }
    }
}

async fn health_check() -> &'static str {
    "OK"
}
