//! Shared fixtures for service tests

use std::sync::Arc;

use chrono::Utc;
use tempfile::TempDir;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::config::MediaStorageConfig;
use crate::data::{Database, EntityId, Post, User};
use crate::realtime::{ConnectionRegistry, Notifier, ServerEvent};
use crate::storage::{MediaStorage, Upload};

pub(crate) struct Fixture {
    pub db: Arc<Database>,
    pub storage: Arc<MediaStorage>,
    pub registry: Arc<ConnectionRegistry>,
    pub notifier: Notifier,
    _temp_dir: TempDir,
}

impl Fixture {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::connect(&temp_dir.path().join("service.db"))
            .await
            .unwrap();
        let storage = MediaStorage::new(&MediaStorageConfig {
            path: temp_dir.path().join("media"),
            public_url: "/media".to_string(),
        })
        .await
        .unwrap();
        let registry = Arc::new(ConnectionRegistry::new());

        Self {
            db: Arc::new(db),
            storage: Arc::new(storage),
            notifier: Notifier::new(registry.clone()),
            registry,
            _temp_dir: temp_dir,
        }
    }

    pub async fn user(&self, username: &str) -> User {
        let now = Utc::now();
        let user = User {
            id: EntityId::new().0,
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: crate::auth::hash_password("password").unwrap(),
            bio: String::new(),
            gender: None,
            profile_picture_id: None,
            profile_picture_url: None,
            created_at: now,
            updated_at: now,
        };
        self.db.insert_user(&user).await.unwrap();
        user
    }

    pub async fn post(&self, author: &User) -> Post {
        crate::service::PostService::new(self.db.clone(), self.storage.clone(), self.notifier.clone())
            .create(&author.id, Some("caption".to_string()), Some(image()))
            .await
            .unwrap()
    }

    /// Register an online connection for `user` and discard the
    /// initial online-users broadcast
    pub async fn connect(&self, user: &User) -> UnboundedReceiver<ServerEvent> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        self.registry.connect(Some(user.id.clone()), tx).await;
        drain(&mut rx);
        rx
    }
}

pub(crate) fn image() -> Upload {
    Upload {
        bytes: b"\x89PNG fake".to_vec(),
        content_type: Some("image/png".to_string()),
    }
}

/// Notifications queued on a connection, in order
pub(crate) fn notifications(
    rx: &mut UnboundedReceiver<ServerEvent>,
) -> Vec<crate::realtime::NotificationEvent> {
    drain(rx)
        .into_iter()
        .filter_map(|event| match event {
            ServerEvent::Notification(event) => Some(event),
            _ => None,
        })
        .collect()
}

pub(crate) fn drain(rx: &mut UnboundedReceiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
