//! Post endpoints

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    response::Response,
    routing::{delete, get, post, put},
};

use super::converters::{post_to_response, posts_to_response};
use super::dto::{ApiResponse, BookmarkResponse, CaptionRequest, message_only};
use super::form::MultipartForm;
use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::service::BookmarkChange;

pub fn post_router() -> Router<AppState> {
    Router::new()
        .route("/post/all", get(all_posts))
        .route("/post/all/user", get(user_posts))
        .route("/post/new", post(create_post))
        .route("/post/:id/update", put(update_post))
        .route("/post/:id/delete", delete(delete_post))
        .route("/post/:id/like", put(like_post))
        .route("/post/:id/dislike", put(dislike_post))
        .route("/post/:id/bookmark", get(bookmark_post))
        .route("/post/:id/share", post(share_post))
}

/// GET /api/post/all
async fn all_posts(
    State(state): State<AppState>,
    CurrentUser(_session): CurrentUser,
) -> Result<Response, AppError> {
    let posts = state.post_service().all().await?;
    let body = posts_to_response(&state.db, &posts).await?;
    Ok(ApiResponse::ok("All posts fetched successfully", body))
}

/// GET /api/post/all/user
async fn user_posts(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<Response, AppError> {
    let posts = state.post_service().by_author(&session.user_id).await?;
    let body = posts_to_response(&state.db, &posts).await?;
    Ok(ApiResponse::ok("All posts of user fetched successfully", body))
}

/// POST /api/post/new
///
/// Multipart fields: `caption`, `image`.
async fn create_post(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut form = MultipartForm::read(multipart).await?;
    let post = state
        .post_service()
        .create(&session.user_id, form.text("caption"), form.file("image"))
        .await?;
    let body = post_to_response(&state.db, &post).await?;
    Ok(ApiResponse::created("Post created successfully", body))
}

/// PUT /api/post/:id/update
async fn update_post(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<CaptionRequest>,
) -> Result<Response, AppError> {
    let post = state
        .post_service()
        .update(&session.user_id, &id, request.caption)
        .await?;
    let body = post_to_response(&state.db, &post).await?;
    Ok(ApiResponse::ok("Post updated successfully", body))
}

/// DELETE /api/post/:id/delete
async fn delete_post(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    state.post_service().delete(&session.user_id, &id).await?;
    Ok(message_only("Post deleted successfully"))
}

/// PUT /api/post/:id/like
async fn like_post(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    state.post_service().like(&session.user_id, &id).await?;
    Ok(message_only("Post liked"))
}

/// PUT /api/post/:id/dislike
async fn dislike_post(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    state.post_service().dislike(&session.user_id, &id).await?;
    Ok(message_only("Post disliked"))
}

/// GET /api/post/:id/bookmark
async fn bookmark_post(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let change = state
        .post_service()
        .toggle_bookmark(&session.user_id, &id)
        .await?;
    let message = match change {
        BookmarkChange::Saved => "Post bookmarked",
        BookmarkChange::Unsaved => "Post removed from bookmark",
    };
    Ok(ApiResponse::ok(
        message,
        BookmarkResponse {
            kind: change.as_str().to_string(),
        },
    ))
}

/// POST /api/post/:id/share
async fn share_post(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let share = state.post_service().share(&session.user_id, &id).await?;
    let body = post_to_response(&state.db, &share).await?;
    Ok(ApiResponse::created("Post shared successfully", body))
}
