//! Reply endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    response::Response,
    routing::{delete, get, post, put},
};

use super::converters::{replies_to_response, reply_to_response};
use super::dto::{ApiResponse, TextRequest, message_only};
use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;

pub fn reply_router() -> Router<AppState> {
    Router::new()
        .route("/post/comment/:id/reply/all", get(comment_replies))
        .route("/post/comment/:id/reply", post(add_reply))
        .route("/post/comment/reply/:id/update", put(update_reply))
        .route("/post/comment/reply/:id/delete", delete(delete_reply))
        .route("/post/comment/reply/:id/like", put(like_reply))
        .route("/post/comment/reply/:id/dislike", put(dislike_reply))
}

async fn comment_replies(
    State(state): State<AppState>,
    CurrentUser(_session): CurrentUser,
    Path(comment_id): Path<String>,
) -> Result<Response, AppError> {
    let replies = state.reply_service().of_comment(&comment_id).await?;
    let body = replies_to_response(&state.db, &replies).await?;
    Ok(ApiResponse::ok("Replies fetched successfully", body))
}

async fn add_reply(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(comment_id): Path<String>,
    Json(request): Json<TextRequest>,
) -> Result<Response, AppError> {
    let reply = state
        .reply_service()
        .add(&session.user_id, &comment_id, request.text)
        .await?;
    let body = reply_to_response(&state.db, &reply).await?;
    Ok(ApiResponse::created("Reply Added", body))
}

async fn update_reply(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<TextRequest>,
) -> Result<Response, AppError> {
    let reply = state
        .reply_service()
        .update(&session.user_id, &id, request.text)
        .await?;
    let body = reply_to_response(&state.db, &reply).await?;
    Ok(ApiResponse::ok("Reply updated successfully", body))
}

async fn delete_reply(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    state.reply_service().delete(&session.user_id, &id).await?;
    Ok(message_only("Reply deleted successfully"))
}

async fn like_reply(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    state.reply_service().like(&session.user_id, &id).await?;
    Ok(message_only("Reply liked"))
}

async fn dislike_reply(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    state.reply_service().dislike(&session.user_id, &id).await?;
    Ok(message_only("Reply disliked"))
}
