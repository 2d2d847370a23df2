//! Comment service

use std::sync::Arc;

use chrono::Utc;

use super::{ensure_author, load_user, required};
use crate::data::{Comment, Database, EntityId, Post};
use crate::error::AppError;
use crate::metrics::record_action;
use crate::realtime::{NotificationEvent, NotificationKind, Notifier, PostSummary};

/// Comment service
pub struct CommentService {
    db: Arc<Database>,
    notifier: Notifier,
}

impl CommentService {
    pub fn new(db: Arc<Database>, notifier: Notifier) -> Self {
        Self { db, notifier }
    }

    pub async fn get(&self, id: &str) -> Result<Comment, AppError> {
        self.db
            .get_comment(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))
    }

    async fn post(&self, id: &str) -> Result<Post, AppError> {
        self.db
            .get_post(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
    }

    /// Comments of a post, oldest first
    pub async fn of_post(&self, post_id: &str) -> Result<Vec<Comment>, AppError> {
        let post = self.post(post_id).await?;
        self.db.get_comments_by_post(&post.id).await
    }

    /// Comment on a post and notify the post author
    pub async fn add(
        &self,
        actor_id: &str,
        post_id: &str,
        text: Option<String>,
    ) -> Result<Comment, AppError> {
        let text = required(text, "Text is required")?;
        let post = self.post(post_id).await?;
        let actor = load_user(&self.db, actor_id).await?;

        let now = Utc::now();
        let comment = Comment {
            id: EntityId::new().0,
            text,
            author_id: actor.id.clone(),
            post_id: post.id.clone(),
            created_at: now,
            updated_at: now,
        };
        self.db.insert_comment(&comment).await?;

        tracing::info!(comment_id = %comment.id, post_id = %post.id, "Comment added");
        record_action("comment");
        let summary = PostSummary::new(&post, self.db.get_post_images(&post.id).await?);
        self.notifier
            .notify(
                &post.author_id,
                NotificationEvent::on_comment(NotificationKind::Comment, &actor, summary, &comment),
            )
            .await;
        Ok(comment)
    }

    pub async fn update(
        &self,
        actor_id: &str,
        id: &str,
        text: Option<String>,
    ) -> Result<Comment, AppError> {
        let text = required(text, "Text is required")?;
        let mut comment = self.get(id).await?;
        ensure_author(
            actor_id,
            &comment.author_id,
            "You are not authorized to update this comment",
        )?;

        comment.text = text;
        comment.updated_at = Utc::now();
        self.db
            .update_comment_text(&comment.id, &comment.text, comment.updated_at)
            .await?;

        record_action("update_comment");
        Ok(comment)
    }

    /// Delete a comment with its replies and notify the post author
    pub async fn delete(&self, actor_id: &str, id: &str) -> Result<u64, AppError> {
        let comment = self.get(id).await?;
        ensure_author(
            actor_id,
            &comment.author_id,
            "You are not authorized to delete this comment",
        )?;
        let actor = load_user(&self.db, actor_id).await?;

        let replies = self.db.delete_comment_cascade(&comment.id).await?;
        tracing::info!(comment_id = %comment.id, replies, "Comment deleted");
        record_action("delete_comment");

        if let Some(post) = self.db.get_post(&comment.post_id).await? {
            let summary = PostSummary::new(&post, self.db.get_post_images(&post.id).await?);
            self.notifier
                .notify(
                    &post.author_id,
                    NotificationEvent::on_comment(
                        NotificationKind::DeleteComment,
                        &actor,
                        summary,
                        &comment,
                    ),
                )
                .await;
        }
        Ok(replies)
    }

    pub async fn like(&self, actor_id: &str, id: &str) -> Result<(), AppError> {
        let comment = self.get(id).await?;
        let actor = load_user(&self.db, actor_id).await?;

        if !self.db.insert_comment_like(&comment.id, &actor.id).await? {
            return Err(AppError::Validation(
                "You have already liked this comment".to_string(),
            ));
        }

        record_action("like_comment");
        self.notifier
            .notify(
                &comment.author_id,
                NotificationEvent::comment_reaction(NotificationKind::LikeComment, &actor, &comment),
            )
            .await;
        Ok(())
    }

    pub async fn dislike(&self, actor_id: &str, id: &str) -> Result<(), AppError> {
        let comment = self.get(id).await?;
        let actor = load_user(&self.db, actor_id).await?;

        if !self.db.delete_comment_like(&comment.id, &actor.id).await? {
            return Err(AppError::Validation(
                "You haven't liked this comment yet".to_string(),
            ));
        }

        record_action("dislike_comment");
        self.notifier
            .notify(
                &comment.author_id,
                NotificationEvent::comment_reaction(
                    NotificationKind::DislikeComment,
                    &actor,
                    &comment,
                ),
            )
            .await;
        Ok(())
    }
}
