//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Every action follows the same order: required fields, existence,
//! ownership, mutation, then at most one notification to the owner.

mod comment;
mod message;
mod post;
mod reply;
mod user;

#[cfg(test)]
pub(crate) mod test_support;

pub use comment::CommentService;
pub use message::MessageService;
pub use post::{BookmarkChange, PostService};
pub use reply::ReplyService;
pub use user::{ProfileUpdate, UserService};

use crate::data::{Database, User};
use crate::error::AppError;

/// Trimmed value of a required text field
fn required(value: Option<String>, message: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(message.to_string()))
}

/// Load a user or fail with 404
async fn load_user(db: &Database, id: &str) -> Result<User, AppError> {
    db.get_user(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Fail with 403 unless the actor authored the entity
fn ensure_author(actor_id: &str, author_id: &str, message: &str) -> Result<(), AppError> {
    if actor_id != author_id {
        return Err(AppError::Forbidden(message.to_string()));
    }
    Ok(())
}
