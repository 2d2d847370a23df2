//! API request and response DTOs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::ImageRef;
use crate::realtime::UserSummary;

// =============================================================================
// Envelope
// =============================================================================

/// Success envelope shared by every endpoint
///
/// Errors use the `{success: false, message}` shape rendered by `AppError`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Response {
        Self::with_status(StatusCode::OK, message, Some(data))
    }

    pub fn created(message: impl Into<String>, data: T) -> Response {
        Self::with_status(StatusCode::CREATED, message, Some(data))
    }

    fn with_status(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Response {
        let body = ApiResponse {
            success: true,
            message: message.into(),
            data,
        };
        (status, Json(body)).into_response()
    }
}

/// Envelope without a payload, for pure deletes and likes
pub fn message_only(message: impl Into<String>) -> Response {
    ApiResponse::<()>::with_status(StatusCode::OK, message, None)
}

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CaptionRequest {
    pub caption: Option<String>,
}

/// Body of comment and reply create/update
#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub message: Option<String>,
}

// =============================================================================
// Responses
// =============================================================================

/// A user with relation id lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub bio: String,
    pub gender: Option<String>,
    pub profile_picture: Option<ImageRef>,
    pub posts: Vec<String>,
    pub bookmarks: Vec<String>,
    pub followers: Vec<String>,
    pub following: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user profile with populated posts, bookmarks and follow lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: String,
    pub username: String,
    pub bio: String,
    pub gender: Option<String>,
    pub profile_picture: Option<ImageRef>,
    pub posts: Vec<PostResponse>,
    pub bookmarks: Vec<PostResponse>,
    pub followers: Vec<UserSummary>,
    pub following: Vec<UserSummary>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: String,
    pub caption: String,
    pub image: Vec<ImageRef>,
    pub author: UserSummary,
    pub likes: Vec<String>,
    pub comments: Vec<CommentResponse>,
    pub shares: Vec<String>,
    pub original_post: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: String,
    pub text: String,
    pub author: UserSummary,
    pub post: String,
    pub likes: Vec<String>,
    pub replies: Vec<ReplyResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyResponse {
    pub id: String,
    pub text: String,
    pub author: UserSummary,
    pub comment: String,
    pub likes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of a bookmark toggle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarkResponse {
    #[serde(rename = "type")]
    pub kind: String,
}
