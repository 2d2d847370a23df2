//! API layer
//!
//! HTTP handlers for users, posts, comments, replies and direct messages,
//! plus the Prometheus scrape endpoint.

mod comments;
mod converters;
mod dto;
mod form;
mod messages;
pub mod metrics;
mod posts;
mod replies;
mod users;

use axum::Router;

use crate::AppState;

pub use converters::*;
pub use dto::*;
pub use metrics::metrics_router;

/// Routes mounted under `/api`
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(users::user_router())
        .merge(posts::post_router())
        .merge(comments::comment_router())
        .merge(replies::reply_router())
        .merge(messages::message_router())
}
