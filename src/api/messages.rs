//! Direct message endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    response::Response,
    routing::{get, post},
};

use super::dto::{ApiResponse, MessageRequest};
use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;

pub fn message_router() -> Router<AppState> {
    Router::new()
        .route("/message/send/:id", post(send_message))
        .route("/message/all/:id", get(get_conversation))
}

/// POST /api/message/send/:id
async fn send_message(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(receiver_id): Path<String>,
    Json(request): Json<MessageRequest>,
) -> Result<Response, AppError> {
    let message = state
        .message_service()
        .send(&session.user_id, &receiver_id, request.message)
        .await?;
    Ok(ApiResponse::created("Message sent", message))
}

/// GET /api/message/all/:id
async fn get_conversation(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(other_id): Path<String>,
) -> Result<Response, AppError> {
    let messages = state
        .message_service()
        .conversation(&session.user_id, &other_id)
        .await?;
    Ok(ApiResponse::ok("Conversation fetched successfully", messages))
}
