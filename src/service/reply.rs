//! Reply service

use std::sync::Arc;

use chrono::Utc;

use super::{ensure_author, load_user, required};
use crate::data::{Comment, Database, EntityId, Reply};
use crate::error::AppError;
use crate::metrics::record_action;
use crate::realtime::{NotificationEvent, NotificationKind, Notifier};

/// Reply service
pub struct ReplyService {
    db: Arc<Database>,
    notifier: Notifier,
}

impl ReplyService {
    pub fn new(db: Arc<Database>, notifier: Notifier) -> Self {
        Self { db, notifier }
    }

    pub async fn get(&self, id: &str) -> Result<Reply, AppError> {
        self.db
            .get_reply(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reply not found".to_string()))
    }

    async fn comment(&self, id: &str) -> Result<Comment, AppError> {
        self.db
            .get_comment(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))
    }

    /// Replies of a comment, oldest first
    pub async fn of_comment(&self, comment_id: &str) -> Result<Vec<Reply>, AppError> {
        let comment = self.comment(comment_id).await?;
        self.db.get_replies_by_comment(&comment.id).await
    }

    /// Reply to a comment and notify the comment author
    pub async fn add(
        &self,
        actor_id: &str,
        comment_id: &str,
        text: Option<String>,
    ) -> Result<Reply, AppError> {
        let text = required(text, "Text is required")?;
        let comment = self.comment(comment_id).await?;
        let actor = load_user(&self.db, actor_id).await?;

        let now = Utc::now();
        let reply = Reply {
            id: EntityId::new().0,
            text,
            author_id: actor.id.clone(),
            comment_id: comment.id.clone(),
            created_at: now,
            updated_at: now,
        };
        self.db.insert_reply(&reply).await?;

        tracing::info!(reply_id = %reply.id, comment_id = %comment.id, "Reply added");
        record_action("reply");
        self.notifier
            .notify(
                &comment.author_id,
                NotificationEvent::on_reply(NotificationKind::Reply, &actor, &comment, &reply),
            )
            .await;
        Ok(reply)
    }

    pub async fn update(
        &self,
        actor_id: &str,
        id: &str,
        text: Option<String>,
    ) -> Result<Reply, AppError> {
        let text = required(text, "Text is required")?;
        let mut reply = self.get(id).await?;
        ensure_author(
            actor_id,
            &reply.author_id,
            "You are not authorized to update this reply",
        )?;

        reply.text = text;
        reply.updated_at = Utc::now();
        self.db
            .update_reply_text(&reply.id, &reply.text, reply.updated_at)
            .await?;

        record_action("update_reply");
        Ok(reply)
    }

    /// Delete a reply and notify the comment author
    pub async fn delete(&self, actor_id: &str, id: &str) -> Result<(), AppError> {
        let reply = self.get(id).await?;
        ensure_author(
            actor_id,
            &reply.author_id,
            "You are not authorized to delete this reply",
        )?;
        let actor = load_user(&self.db, actor_id).await?;

        self.db.delete_reply(&reply.id).await?;
        tracing::info!(reply_id = %reply.id, "Reply deleted");
        record_action("delete_reply");

        if let Some(comment) = self.db.get_comment(&reply.comment_id).await? {
            self.notifier
                .notify(
                    &comment.author_id,
                    NotificationEvent::on_reply(
                        NotificationKind::DeleteReply,
                        &actor,
                        &comment,
                        &reply,
                    ),
                )
                .await;
        }
        Ok(())
    }

    /// Like a reply and notify the reply author
    pub async fn like(&self, actor_id: &str, id: &str) -> Result<(), AppError> {
        let reply = self.get(id).await?;
        let actor = load_user(&self.db, actor_id).await?;

        if !self.db.insert_reply_like(&reply.id, &actor.id).await? {
            return Err(AppError::Validation(
                "You have already liked this reply".to_string(),
            ));
        }

        record_action("like_reply");
        self.notifier
            .notify(
                &reply.author_id,
                NotificationEvent::reply_reaction(NotificationKind::LikeReply, &actor, &reply),
            )
            .await;
        Ok(())
    }

    pub async fn dislike(&self, actor_id: &str, id: &str) -> Result<(), AppError> {
        let reply = self.get(id).await?;
        let actor = load_user(&self.db, actor_id).await?;

        if !self.db.delete_reply_like(&reply.id, &actor.id).await? {
            return Err(AppError::Validation(
                "You haven't liked this reply yet".to_string(),
            ));
        }

        record_action("dislike_reply");
        self.notifier
            .notify(
                &reply.author_id,
                NotificationEvent::reply_reaction(NotificationKind::DislikeReply, &actor, &reply),
            )
            .await;
        Ok(())
    }
}
