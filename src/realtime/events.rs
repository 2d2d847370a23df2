//! Wire-level event definitions for the real-time channel.
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}`.

use serde::{Deserialize, Serialize};

use crate::data::{Comment, ImageRef, Message, Post, Reply, User};

/// Frame pushed from the server to a connected client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Ids of every user with a registered connection
    GetOnlineUsers(Vec<String>),
    /// A direct message addressed to the receiving user
    NewMessage(Message),
    /// A social notification
    Notification(NotificationEvent),
}

/// Kinds of social notifications
///
/// `DeleteMessage` is never emitted by the server; clients accept it
/// as the cancellation of `Message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Like,
    Dislike,
    Comment,
    DeleteComment,
    Reply,
    DeleteReply,
    LikeComment,
    DislikeComment,
    LikeReply,
    DislikeReply,
    Follow,
    Unfollow,
    Message,
    DeleteMessage,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Dislike => "dislike",
            Self::Comment => "comment",
            Self::DeleteComment => "delete_comment",
            Self::Reply => "reply",
            Self::DeleteReply => "delete_reply",
            Self::LikeComment => "like_comment",
            Self::DislikeComment => "dislike_comment",
            Self::LikeReply => "like_reply",
            Self::DislikeReply => "dislike_reply",
            Self::Follow => "follow",
            Self::Unfollow => "unfollow",
            Self::Message => "message",
            Self::DeleteMessage => "delete_message",
        }
    }

    /// The positive kind a cancellation undoes, or `None` for positive kinds
    pub fn cancels(&self) -> Option<NotificationKind> {
        match self {
            Self::Dislike => Some(Self::Like),
            Self::Unfollow => Some(Self::Follow),
            Self::DeleteComment => Some(Self::Comment),
            Self::DeleteReply => Some(Self::Reply),
            Self::DislikeComment => Some(Self::LikeComment),
            Self::DislikeReply => Some(Self::LikeReply),
            Self::DeleteMessage => Some(Self::Message),
            _ => None,
        }
    }

    fn describe(&self, username: &str) -> String {
        let action = match self {
            Self::Like => "liked your post.",
            Self::Dislike => "disliked your post.",
            Self::Comment => "commented on your post.",
            Self::DeleteComment => "deleted a comment from your post.",
            Self::Reply => "replied to your comment.",
            Self::DeleteReply => "deleted a reply from your comment.",
            Self::LikeComment => "liked your comment.",
            Self::DislikeComment => "disliked your comment.",
            Self::LikeReply => "liked your reply.",
            Self::DislikeReply => "disliked your reply.",
            Self::Follow => "started following you.",
            Self::Unfollow => "stopped following you.",
            Self::Message => "sent you a message.",
            Self::DeleteMessage => "deleted a message.",
        };
        format!("{} {}", username, action)
    }
}

/// Public projection of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub bio: String,
    pub profile_picture: Option<ImageRef>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            bio: user.bio.clone(),
            profile_picture: user.profile_picture(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: String,
    pub caption: String,
    pub image: Vec<ImageRef>,
}

impl PostSummary {
    pub fn new(post: &Post, image: Vec<ImageRef>) -> Self {
        Self {
            id: post.id.clone(),
            caption: post.caption.clone(),
            image,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentSummary {
    pub id: String,
    pub text: String,
}

impl From<&Comment> for CommentSummary {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id.clone(),
            text: comment.text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplySummary {
    pub id: String,
    pub text: String,
}

impl From<&Reply> for ReplySummary {
    fn from(reply: &Reply) -> Self {
        Self {
            id: reply.id.clone(),
            text: reply.text.clone(),
        }
    }
}

/// A notification as delivered to the owner of the touched entity
///
/// `user` is always the actor. Which of `post`, `comment` and `reply`
/// are present depends on the kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub user: UserSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<PostSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<CommentSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<ReplySummary>,
    pub message: String,
}

impl NotificationEvent {
    fn base(kind: NotificationKind, actor: &User) -> Self {
        Self {
            kind,
            user: UserSummary::from(actor),
            post: None,
            comment: None,
            reply: None,
            message: kind.describe(&actor.username),
        }
    }

    /// `like` / `dislike` of a post
    pub fn on_post(kind: NotificationKind, actor: &User, post: PostSummary) -> Self {
        Self {
            post: Some(post),
            ..Self::base(kind, actor)
        }
    }

    /// `comment` / `delete_comment` on a post
    pub fn on_comment(
        kind: NotificationKind,
        actor: &User,
        post: PostSummary,
        comment: &Comment,
    ) -> Self {
        Self {
            post: Some(post),
            comment: Some(comment.into()),
            ..Self::base(kind, actor)
        }
    }

    /// `reply` / `delete_reply` on a comment
    pub fn on_reply(kind: NotificationKind, actor: &User, comment: &Comment, reply: &Reply) -> Self {
        Self {
            comment: Some(comment.into()),
            reply: Some(reply.into()),
            ..Self::base(kind, actor)
        }
    }

    /// `like_comment` / `dislike_comment`
    pub fn comment_reaction(kind: NotificationKind, actor: &User, comment: &Comment) -> Self {
        Self {
            comment: Some(comment.into()),
            ..Self::base(kind, actor)
        }
    }

    /// `like_reply` / `dislike_reply`
    pub fn reply_reaction(kind: NotificationKind, actor: &User, reply: &Reply) -> Self {
        Self {
            reply: Some(reply.into()),
            ..Self::base(kind, actor)
        }
    }

    /// `follow` / `unfollow`, `message`
    pub fn from_actor(kind: NotificationKind, actor: &User) -> Self {
        Self::base(kind, actor)
    }
}
