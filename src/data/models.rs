//! Data models
//!
//! Rust structs representing database entities.
//! All models use ULID for IDs and chrono for timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// ID Types
// =============================================================================

/// Entity ID wrapper (ULID format, 26 characters)
///
/// Example: "01ARZ3NDEKTSV4RRFFQ69G5FAV"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Media references
// =============================================================================

/// Reference to a stored image
///
/// `public_id` is the media store key, `url` is what clients load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub public_id: String,
    pub url: String,
}

// =============================================================================
// User
// =============================================================================

/// A registered user
///
/// Follow, bookmark and post lists live in relation tables and are
/// loaded separately.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub bio: String,
    pub gender: Option<String>,
    pub profile_picture_id: Option<String>,
    pub profile_picture_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Current profile picture, if one was uploaded
    pub fn profile_picture(&self) -> Option<ImageRef> {
        match (&self.profile_picture_id, &self.profile_picture_url) {
            (Some(public_id), Some(url)) => Some(ImageRef {
                public_id: public_id.clone(),
                url: url.clone(),
            }),
            _ => None,
        }
    }
}

// =============================================================================
// Post / Comment / Reply
// =============================================================================

/// A post
///
/// `original_post_id` is set when the post is a share of another post.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: String,
    pub caption: String,
    pub author_id: String,
    pub original_post_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A comment on a post
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: String,
    pub text: String,
    pub author_id: String,
    pub post_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A reply to a comment
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reply {
    pub id: String,
    pub text: String,
    pub author_id: String,
    pub comment_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Direct messages
// =============================================================================

/// Conversation between an unordered pair of users
///
/// Participants are stored normalized: `participant_a <= participant_b`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Conversation {
    pub id: String,
    pub participant_a: String,
    pub participant_b: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Normalize a participant pair into storage order
    pub fn participant_key<'a>(first: &'a str, second: &'a str) -> (&'a str, &'a str) {
        if first <= second {
            (first, second)
        } else {
            (second, first)
        }
    }
}

/// A direct message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Relation outcomes
// =============================================================================

/// Which branch a follow toggle took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowChange {
    Followed,
    Unfollowed,
}

/// Rows removed by a post delete cascade
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeSummary {
    pub comments: u64,
    pub replies: u64,
}
