//! Conversions from stored entities to API responses
//!
//! Relation lists live in their own tables, so each conversion loads
//! what it embeds.

use crate::data::{Comment, Database, Post, Reply, User};
use crate::error::AppError;
use crate::realtime::UserSummary;

use super::dto::{CommentResponse, PostResponse, ProfileResponse, ReplyResponse, UserResponse};

async fn author_summary(db: &Database, id: &str) -> Result<UserSummary, AppError> {
    db.get_user(id)
        .await?
        .map(|user| UserSummary::from(&user))
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

pub async fn user_to_response(db: &Database, user: &User) -> Result<UserResponse, AppError> {
    Ok(UserResponse {
        id: user.id.clone(),
        username: user.username.clone(),
        email: user.email.clone(),
        bio: user.bio.clone(),
        gender: user.gender.clone(),
        profile_picture: user.profile_picture(),
        posts: db.get_user_post_ids(&user.id).await?,
        bookmarks: db.get_bookmark_ids(&user.id).await?,
        followers: db.get_follower_ids(&user.id).await?,
        following: db.get_following_ids(&user.id).await?,
        created_at: user.created_at,
        updated_at: user.updated_at,
    })
}

pub async fn profile_to_response(db: &Database, user: &User) -> Result<ProfileResponse, AppError> {
    let posts = db.get_posts_by_author(&user.id).await?;

    let mut bookmarks = Vec::new();
    for id in db.get_bookmark_ids(&user.id).await? {
        if let Some(post) = db.get_post(&id).await? {
            bookmarks.push(post);
        }
    }

    let followers = db.get_users(&db.get_follower_ids(&user.id).await?).await?;
    let following = db.get_users(&db.get_following_ids(&user.id).await?).await?;

    Ok(ProfileResponse {
        id: user.id.clone(),
        username: user.username.clone(),
        bio: user.bio.clone(),
        gender: user.gender.clone(),
        profile_picture: user.profile_picture(),
        posts: posts_to_response(db, &posts).await?,
        bookmarks: posts_to_response(db, &bookmarks).await?,
        followers: followers.iter().map(UserSummary::from).collect(),
        following: following.iter().map(UserSummary::from).collect(),
        created_at: user.created_at,
    })
}

pub async fn reply_to_response(db: &Database, reply: &Reply) -> Result<ReplyResponse, AppError> {
    Ok(ReplyResponse {
        id: reply.id.clone(),
        text: reply.text.clone(),
        author: author_summary(db, &reply.author_id).await?,
        comment: reply.comment_id.clone(),
        likes: db.get_reply_like_ids(&reply.id).await?,
        created_at: reply.created_at,
        updated_at: reply.updated_at,
    })
}

pub async fn replies_to_response(
    db: &Database,
    replies: &[Reply],
) -> Result<Vec<ReplyResponse>, AppError> {
    let mut responses = Vec::with_capacity(replies.len());
    for reply in replies {
        responses.push(reply_to_response(db, reply).await?);
    }
    Ok(responses)
}

pub async fn comment_to_response(
    db: &Database,
    comment: &Comment,
) -> Result<CommentResponse, AppError> {
    let replies = db.get_replies_by_comment(&comment.id).await?;

    Ok(CommentResponse {
        id: comment.id.clone(),
        text: comment.text.clone(),
        author: author_summary(db, &comment.author_id).await?,
        post: comment.post_id.clone(),
        likes: db.get_comment_like_ids(&comment.id).await?,
        replies: replies_to_response(db, &replies).await?,
        created_at: comment.created_at,
        updated_at: comment.updated_at,
    })
}

pub async fn comments_to_response(
    db: &Database,
    comments: &[Comment],
) -> Result<Vec<CommentResponse>, AppError> {
    let mut responses = Vec::with_capacity(comments.len());
    for comment in comments {
        responses.push(comment_to_response(db, comment).await?);
    }
    Ok(responses)
}

pub async fn post_to_response(db: &Database, post: &Post) -> Result<PostResponse, AppError> {
    let comments = db.get_comments_by_post(&post.id).await?;

    Ok(PostResponse {
        id: post.id.clone(),
        caption: post.caption.clone(),
        image: db.get_post_images(&post.id).await?,
        author: author_summary(db, &post.author_id).await?,
        likes: db.get_post_like_ids(&post.id).await?,
        comments: comments_to_response(db, &comments).await?,
        shares: db.get_post_share_ids(&post.id).await?,
        original_post: post.original_post_id.clone(),
        created_at: post.created_at,
        updated_at: post.updated_at,
    })
}

pub async fn posts_to_response(db: &Database, posts: &[Post]) -> Result<Vec<PostResponse>, AppError> {
    let mut responses = Vec::with_capacity(posts.len());
    for post in posts {
        responses.push(post_to_response(db, post).await?);
    }
    Ok(responses)
}
