//! WebSocket endpoint
//!
//! `GET /socket?userId=<id>` upgrades to a duplex channel. Client frames
//! are ignored apart from close; server events are written by a
//! per-connection task draining the registry queue.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use super::registry::ConnectionRegistry;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SocketParams {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// Handle the upgrade for the `/socket` endpoint
pub async fn socket_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<SocketParams>,
    State(state): State<AppState>,
) -> Response {
    let user_id = params.user_id.filter(|id| !id.trim().is_empty());
    let registry = state.connections.clone();
    ws.on_upgrade(move |socket| serve_connection(socket, user_id, registry))
}

async fn serve_connection(
    socket: WebSocket,
    user_id: Option<String>,
    registry: Arc<ConnectionRegistry>,
) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let connection_id = registry.connect(user_id, tx).await;

    let writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to encode server event");
                    continue;
                }
            };
            if sink.send(WsMessage::Text(text)).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(WsMessage::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }

    registry.disconnect(connection_id).await;
    writer.abort();
}
