//! Post service
//!
//! Handles post operations including create, update, delete (with the
//! comment/reply cascade), like, dislike, bookmark and share.

use std::sync::Arc;

use chrono::Utc;

use super::{ensure_author, load_user, required};
use crate::data::{CascadeSummary, Database, EntityId, Post};
use crate::error::AppError;
use crate::metrics::record_action;
use crate::realtime::{NotificationEvent, NotificationKind, Notifier, PostSummary};
use crate::storage::{MediaStorage, Upload};

/// Which branch a bookmark toggle took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkChange {
    Saved,
    Unsaved,
}

impl BookmarkChange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Saved => "saved",
            Self::Unsaved => "unsaved",
        }
    }
}

/// Post service
pub struct PostService {
    db: Arc<Database>,
    storage: Arc<MediaStorage>,
    notifier: Notifier,
}

impl PostService {
    /// Create new post service
    pub fn new(db: Arc<Database>, storage: Arc<MediaStorage>, notifier: Notifier) -> Self {
        Self {
            db,
            storage,
            notifier,
        }
    }

    /// Get post by ID
    pub async fn get(&self, id: &str) -> Result<Post, AppError> {
        self.db
            .get_post(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
    }

    /// Every post, newest first
    pub async fn all(&self) -> Result<Vec<Post>, AppError> {
        self.db.get_all_posts().await
    }

    /// The actor's own posts, newest first
    pub async fn by_author(&self, author_id: &str) -> Result<Vec<Post>, AppError> {
        self.db.get_posts_by_author(author_id).await
    }

    /// Create a post with one image
    ///
    /// # Errors
    /// - `Validation` if no image was uploaded
    /// - `Storage` if the image cannot be stored
    pub async fn create(
        &self,
        actor_id: &str,
        caption: Option<String>,
        image: Option<Upload>,
    ) -> Result<Post, AppError> {
        let image = image
            .filter(|file| !file.bytes.is_empty())
            .ok_or_else(|| AppError::Validation("Image required".to_string()))?;
        let author = load_user(&self.db, actor_id).await?;

        let image = self.storage.upload_post_image(&image).await?;
        let now = Utc::now();
        let post = Post {
            id: EntityId::new().0,
            caption: caption.map(|c| c.trim().to_string()).unwrap_or_default(),
            author_id: author.id,
            original_post_id: None,
            created_at: now,
            updated_at: now,
        };
        self.db.insert_post(&post, &[image]).await?;

        tracing::info!(post_id = %post.id, author = %post.author_id, "Post created");
        record_action("create_post");
        Ok(post)
    }

    /// Change a post's caption
    ///
    /// # Errors
    /// - `Validation` if the caption is missing
    /// - `NotFound` / `Forbidden` for a missing post or a non-author
    pub async fn update(
        &self,
        actor_id: &str,
        id: &str,
        caption: Option<String>,
    ) -> Result<Post, AppError> {
        let caption = required(caption, "Caption is required")?;
        let mut post = self.get(id).await?;
        ensure_author(
            actor_id,
            &post.author_id,
            "You are not authorized to update this post",
        )?;

        post.caption = caption;
        post.updated_at = Utc::now();
        self.db
            .update_post_caption(&post.id, &post.caption, post.updated_at)
            .await?;

        record_action("update_post");
        Ok(post)
    }

    /// Delete a post with its comments, their replies and its images
    ///
    /// Stored files go only after the rows are gone, and only when no
    /// other post references them.
    pub async fn delete(&self, actor_id: &str, id: &str) -> Result<CascadeSummary, AppError> {
        let post = self.get(id).await?;
        ensure_author(
            actor_id,
            &post.author_id,
            "You are not authorized to delete this post",
        )?;

        let images = self.db.get_post_images(&post.id).await?;
        let summary = self.db.delete_post_cascade(&post.id).await?;

        for image in images {
            if self.db.count_image_references(&image.public_id).await? == 0 {
                self.storage.delete(&image.public_id).await?;
            }
        }
        tracing::info!(
            post_id = %post.id,
            comments = summary.comments,
            replies = summary.replies,
            "Post deleted"
        );
        record_action("delete_post");
        Ok(summary)
    }

    /// Like a post and notify its author
    ///
    /// # Errors
    /// - `NotFound` if the post does not exist
    /// - `Validation` if the actor already likes it
    pub async fn like(&self, actor_id: &str, id: &str) -> Result<(), AppError> {
        let post = self.get(id).await?;
        let actor = load_user(&self.db, actor_id).await?;

        if !self.db.insert_post_like(&post.id, &actor.id).await? {
            return Err(AppError::Validation(
                "You have already liked this post".to_string(),
            ));
        }

        record_action("like_post");
        let summary = self.summary(&post).await?;
        self.notifier
            .notify(
                &post.author_id,
                NotificationEvent::on_post(NotificationKind::Like, &actor, summary),
            )
            .await;
        Ok(())
    }

    /// Remove a like and notify the author
    ///
    /// # Errors
    /// - `NotFound` if the post does not exist
    /// - `Validation` if the actor has not liked it
    pub async fn dislike(&self, actor_id: &str, id: &str) -> Result<(), AppError> {
        let post = self.get(id).await?;
        let actor = load_user(&self.db, actor_id).await?;

        if !self.db.delete_post_like(&post.id, &actor.id).await? {
            return Err(AppError::Validation(
                "You haven't liked this post yet".to_string(),
            ));
        }

        record_action("dislike_post");
        let summary = self.summary(&post).await?;
        self.notifier
            .notify(
                &post.author_id,
                NotificationEvent::on_post(NotificationKind::Dislike, &actor, summary),
            )
            .await;
        Ok(())
    }

    /// Add the post to the actor's bookmarks, or remove it if present
    pub async fn toggle_bookmark(&self, actor_id: &str, id: &str) -> Result<BookmarkChange, AppError> {
        let post = self.get(id).await?;

        let change = if self.db.is_bookmarked(actor_id, &post.id).await? {
            self.db.delete_bookmark(actor_id, &post.id).await?;
            BookmarkChange::Unsaved
        } else {
            self.db.insert_bookmark(actor_id, &post.id).await?;
            BookmarkChange::Saved
        };

        record_action(change.as_str());
        Ok(change)
    }

    /// Re-post another post under the actor's name
    ///
    /// The share copies caption and images and records the actor as a
    /// sharer of the original. Shares of shares point at the root post.
    pub async fn share(&self, actor_id: &str, id: &str) -> Result<Post, AppError> {
        let shared = self.get(id).await?;
        let actor = load_user(&self.db, actor_id).await?;

        let original = match shared.original_post_id.clone() {
            Some(root_id) => self.db.get_post(&root_id).await?.unwrap_or(shared),
            None => shared,
        };
        let images = self.db.get_post_images(&original.id).await?;

        let now = Utc::now();
        let share = Post {
            id: EntityId::new().0,
            caption: original.caption.clone(),
            author_id: actor.id,
            original_post_id: Some(original.id.clone()),
            created_at: now,
            updated_at: now,
        };
        self.db.insert_share(&share, &images, &original.id).await?;

        tracing::info!(post_id = %share.id, original = %original.id, "Post shared");
        record_action("share_post");
        Ok(share)
    }

    async fn summary(&self, post: &Post) -> Result<PostSummary, AppError> {
        Ok(PostSummary::new(post, self.db.get_post_images(&post.id).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Comment, Reply};
    use crate::service::test_support::{Fixture, image, notifications};

    fn service(fixture: &Fixture) -> PostService {
        PostService::new(
            fixture.db.clone(),
            fixture.storage.clone(),
            fixture.notifier.clone(),
        )
    }

    #[tokio::test]
    async fn create_requires_image() {
        let fixture = Fixture::new().await;
        let posts = service(&fixture);
        let alice = fixture.user("alice").await;

        let result = posts.create(&alice.id, Some("hi".to_string()), None).await;
        assert!(matches!(result, Err(AppError::Validation(m)) if m == "Image required"));

        let post = posts
            .create(&alice.id, Some(" hi ".to_string()), Some(image()))
            .await
            .unwrap();
        assert_eq!(post.caption, "hi");
        assert_eq!(fixture.db.get_user_post_ids(&alice.id).await.unwrap(), vec![post.id]);
    }

    #[tokio::test]
    async fn update_checks_caption_and_author() {
        let fixture = Fixture::new().await;
        let posts = service(&fixture);
        let alice = fixture.user("alice").await;
        let bob = fixture.user("bob").await;
        let post = fixture.post(&alice).await;

        let missing = posts.update(&alice.id, &post.id, None).await;
        assert!(matches!(missing, Err(AppError::Validation(_))));

        let foreign = posts
            .update(&bob.id, &post.id, Some("mine now".to_string()))
            .await;
        assert!(matches!(foreign, Err(AppError::Forbidden(_))));

        let absent = posts
            .update(&alice.id, "missing", Some("x".to_string()))
            .await;
        assert!(matches!(absent, Err(AppError::NotFound(_))));

        let updated = posts
            .update(&alice.id, &post.id, Some("edited".to_string()))
            .await
            .unwrap();
        assert_eq!(updated.caption, "edited");
        assert_eq!(posts.get(&post.id).await.unwrap().caption, "edited");
    }

    #[tokio::test]
    async fn like_and_dislike_are_guarded() {
        let fixture = Fixture::new().await;
        let posts = service(&fixture);
        let alice = fixture.user("alice").await;
        let bob = fixture.user("bob").await;
        let post = fixture.post(&alice).await;

        let early = posts.dislike(&bob.id, &post.id).await;
        assert!(matches!(early, Err(AppError::Validation(m)) if m == "You haven't liked this post yet"));
        assert!(fixture.db.get_post_like_ids(&post.id).await.unwrap().is_empty());

        posts.like(&bob.id, &post.id).await.unwrap();
        let twice = posts.like(&bob.id, &post.id).await;
        assert!(matches!(twice, Err(AppError::Validation(m)) if m == "You have already liked this post"));
        assert_eq!(fixture.db.get_post_like_ids(&post.id).await.unwrap(), vec![bob.id.clone()]);

        posts.dislike(&bob.id, &post.id).await.unwrap();
        assert!(fixture.db.get_post_like_ids(&post.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn like_notifies_author_but_not_self() {
        let fixture = Fixture::new().await;
        let posts = service(&fixture);
        let alice = fixture.user("alice").await;
        let bob = fixture.user("bob").await;
        let post = fixture.post(&alice).await;
        let mut alice_rx = fixture.connect(&alice).await;

        posts.like(&alice.id, &post.id).await.unwrap();
        assert!(notifications(&mut alice_rx).is_empty());

        posts.like(&bob.id, &post.id).await.unwrap();
        posts.dislike(&bob.id, &post.id).await.unwrap();
        let received = notifications(&mut alice_rx);
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].kind, NotificationKind::Like);
        assert_eq!(received[0].post.as_ref().unwrap().id, post.id);
        assert_eq!(received[1].kind, NotificationKind::Dislike);
    }

    #[tokio::test]
    async fn bookmark_toggles_only_actor_list() {
        let fixture = Fixture::new().await;
        let posts = service(&fixture);
        let alice = fixture.user("alice").await;
        let bob = fixture.user("bob").await;
        let post = fixture.post(&alice).await;

        assert_eq!(
            posts.toggle_bookmark(&bob.id, &post.id).await.unwrap(),
            BookmarkChange::Saved
        );
        assert_eq!(fixture.db.get_bookmark_ids(&bob.id).await.unwrap(), vec![post.id.clone()]);
        assert!(fixture.db.get_bookmark_ids(&alice.id).await.unwrap().is_empty());

        assert_eq!(
            posts.toggle_bookmark(&bob.id, &post.id).await.unwrap(),
            BookmarkChange::Unsaved
        );
        assert!(fixture.db.get_bookmark_ids(&bob.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_cascades_and_removes_image() {
        let fixture = Fixture::new().await;
        let posts = service(&fixture);
        let alice = fixture.user("alice").await;
        let bob = fixture.user("bob").await;
        let post = fixture.post(&alice).await;
        let image = fixture.db.get_post_images(&post.id).await.unwrap().remove(0);

        let now = Utc::now();
        let comment = Comment {
            id: EntityId::new().0,
            text: "nice".to_string(),
            author_id: bob.id.clone(),
            post_id: post.id.clone(),
            created_at: now,
            updated_at: now,
        };
        fixture.db.insert_comment(&comment).await.unwrap();
        let reply = Reply {
            id: EntityId::new().0,
            text: "thanks".to_string(),
            author_id: alice.id.clone(),
            comment_id: comment.id.clone(),
            created_at: now,
            updated_at: now,
        };
        fixture.db.insert_reply(&reply).await.unwrap();
        posts.toggle_bookmark(&bob.id, &post.id).await.unwrap();

        let foreign = posts.delete(&bob.id, &post.id).await;
        assert!(matches!(foreign, Err(AppError::Forbidden(_))));

        let summary = posts.delete(&alice.id, &post.id).await.unwrap();
        assert_eq!(summary, CascadeSummary { comments: 1, replies: 1 });
        assert!(fixture.db.get_post(&post.id).await.unwrap().is_none());
        assert!(fixture.db.get_comment(&comment.id).await.unwrap().is_none());
        assert!(fixture.db.get_reply(&reply.id).await.unwrap().is_none());
        assert!(fixture.db.get_bookmark_ids(&bob.id).await.unwrap().is_empty());
        assert!(!fixture.storage.root().join(&image.public_id).exists());
    }

    #[tokio::test]
    async fn share_copies_post_and_keeps_shared_image() {
        let fixture = Fixture::new().await;
        let posts = service(&fixture);
        let alice = fixture.user("alice").await;
        let bob = fixture.user("bob").await;
        let carol = fixture.user("carol").await;
        let post = fixture.post(&alice).await;

        let share = posts.share(&bob.id, &post.id).await.unwrap();
        assert_eq!(share.author_id, bob.id);
        assert_eq!(share.original_post_id.as_deref(), Some(post.id.as_str()));
        assert_eq!(
            fixture.db.get_post_share_ids(&post.id).await.unwrap(),
            vec![bob.id.clone()]
        );

        let reshare = posts.share(&carol.id, &share.id).await.unwrap();
        assert_eq!(reshare.original_post_id.as_deref(), Some(post.id.as_str()));

        let image = fixture.db.get_post_images(&post.id).await.unwrap().remove(0);
        posts.delete(&alice.id, &post.id).await.unwrap();
        assert!(fixture.storage.root().join(&image.public_id).exists());
        assert!(posts.get(&share.id).await.unwrap().original_post_id.is_none());
    }

    #[tokio::test]
    async fn deleting_share_removes_sharer_from_original() {
        let fixture = Fixture::new().await;
        let posts = service(&fixture);
        let alice = fixture.user("alice").await;
        let bob = fixture.user("bob").await;
        let post = fixture.post(&alice).await;
        let image = fixture.db.get_post_images(&post.id).await.unwrap().remove(0);

        let first = posts.share(&bob.id, &post.id).await.unwrap();
        let second = posts.share(&bob.id, &post.id).await.unwrap();
        assert_eq!(
            fixture.db.get_post_share_ids(&post.id).await.unwrap(),
            vec![bob.id.clone()]
        );

        posts.delete(&bob.id, &first.id).await.unwrap();
        assert_eq!(
            fixture.db.get_post_share_ids(&post.id).await.unwrap(),
            vec![bob.id.clone()]
        );

        posts.delete(&bob.id, &second.id).await.unwrap();
        assert!(fixture.db.get_post_share_ids(&post.id).await.unwrap().is_empty());
        assert!(fixture.storage.root().join(&image.public_id).exists());
    }

    #[tokio::test]
    async fn missing_post_is_not_found() {
        let fixture = Fixture::new().await;
        let posts = service(&fixture);
        let alice = fixture.user("alice").await;

        assert!(matches!(
            posts.like(&alice.id, "missing").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            posts.toggle_bookmark(&alice.id, "missing").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            posts.share(&alice.id, "missing").await,
            Err(AppError::NotFound(_))
        ));
    }
}
