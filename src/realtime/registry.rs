//! Connection registry
//!
//! Process-wide table of open real-time connections and the user each
//! one belongs to. A user maps to at most one connection: the newest.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{RwLock, mpsc::UnboundedSender};

use super::events::ServerEvent;
use crate::metrics::{CONNECTIONS_ACTIVE, ONLINE_USERS};

/// Identifier of one open connection
pub type ConnectionId = u64;

/// Queue feeding a connection's writer task
pub type ConnectionSender = UnboundedSender<ServerEvent>;

struct Connection {
    user_id: Option<String>,
    sender: ConnectionSender,
}

#[derive(Default)]
struct Inner {
    connections: HashMap<ConnectionId, Connection>,
    users: HashMap<String, ConnectionId>,
}

impl Inner {
    fn online_users(&self) -> Vec<String> {
        let mut users: Vec<String> = self.users.keys().cloned().collect();
        users.sort();
        users
    }

    fn broadcast_online_users(&self) {
        let online = self.online_users();
        ONLINE_USERS.set(online.len() as i64);
        CONNECTIONS_ACTIVE.set(self.connections.len() as i64);

        for connection in self.connections.values() {
            let _ = connection
                .sender
                .send(ServerEvent::GetOnlineUsers(online.clone()));
        }
    }
}

/// Registry of live connections
///
/// Owned by the application state and shared by handle.
#[derive(Default)]
pub struct ConnectionRegistry {
    inner: RwLock<Inner>,
    next_id: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection, optionally on behalf of a user
    ///
    /// A user that connects again is re-pointed at the new connection.
    /// Every open connection then receives the online user list.
    pub async fn connect(&self, user_id: Option<String>, sender: ConnectionSender) -> ConnectionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut inner = self.inner.write().await;

        if let Some(user_id) = &user_id {
            inner.users.insert(user_id.clone(), id);
        }
        inner.connections.insert(
            id,
            Connection {
                user_id: user_id.clone(),
                sender,
            },
        );
        tracing::info!(connection_id = id, user_id = ?user_id, "Connection registered");

        inner.broadcast_online_users();
        id
    }

    /// Remove a connection and broadcast the new online user list
    ///
    /// The user mapping is dropped only if it still points at this
    /// connection.
    pub async fn disconnect(&self, id: ConnectionId) {
        let mut inner = self.inner.write().await;
        let Some(connection) = inner.connections.remove(&id) else {
            return;
        };

        if let Some(user_id) = &connection.user_id {
            if inner.users.get(user_id) == Some(&id) {
                inner.users.remove(user_id);
            }
        }
        tracing::info!(connection_id = id, user_id = ?connection.user_id, "Connection closed");

        inner.broadcast_online_users();
    }

    /// Sender of the user's current connection, if they are online
    pub async fn lookup(&self, user_id: &str) -> Option<ConnectionSender> {
        let inner = self.inner.read().await;
        inner
            .users
            .get(user_id)
            .and_then(|id| inner.connections.get(id))
            .map(|connection| connection.sender.clone())
    }

    /// Ids of users with a registered connection, sorted
    pub async fn online_users(&self) -> Vec<String> {
        self.inner.read().await.online_users()
    }
}
