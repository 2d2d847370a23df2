//! Comment endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    response::Response,
    routing::{delete, get, post, put},
};

use super::converters::{comment_to_response, comments_to_response};
use super::dto::{ApiResponse, TextRequest, message_only};
use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;

pub fn comment_router() -> Router<AppState> {
    Router::new()
        .route("/post/:id/comment/all", get(post_comments))
        .route("/post/:id/comment", post(add_comment))
        .route("/post/comment/:id/update", put(update_comment))
        .route("/post/comment/:id/delete", delete(delete_comment))
        .route("/post/comment/:id/like", put(like_comment))
        .route("/post/comment/:id/dislike", put(dislike_comment))
}

/// GET /api/post/:id/comment/all
async fn post_comments(
    State(state): State<AppState>,
    CurrentUser(_session): CurrentUser,
    Path(post_id): Path<String>,
) -> Result<Response, AppError> {
    let comments = state.comment_service().of_post(&post_id).await?;
    let body = comments_to_response(&state.db, &comments).await?;
    Ok(ApiResponse::ok("Comments fetched successfully", body))
}

/// POST /api/post/:id/comment
async fn add_comment(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(post_id): Path<String>,
    Json(request): Json<TextRequest>,
) -> Result<Response, AppError> {
    let comment = state
        .comment_service()
        .add(&session.user_id, &post_id, request.text)
        .await?;
    let body = comment_to_response(&state.db, &comment).await?;
    Ok(ApiResponse::created("Comment Added", body))
}

/// PUT /api/post/comment/:id/update
async fn update_comment(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<TextRequest>,
) -> Result<Response, AppError> {
    let comment = state
        .comment_service()
        .update(&session.user_id, &id, request.text)
        .await?;
    let body = comment_to_response(&state.db, &comment).await?;
    Ok(ApiResponse::ok("Comment updated successfully", body))
}

/// DELETE /api/post/comment/:id/delete
async fn delete_comment(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    state.comment_service().delete(&session.user_id, &id).await?;
    Ok(message_only("Comment deleted successfully"))
}

/// PUT /api/post/comment/:id/like
async fn like_comment(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    state.comment_service().like(&session.user_id, &id).await?;
    Ok(message_only("Comment liked"))
}

/// PUT /api/post/comment/:id/dislike
async fn dislike_comment(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    state.comment_service().dislike(&session.user_id, &id).await?;
    Ok(message_only("Comment disliked"))
}
