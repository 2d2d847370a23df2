//! SQLite database operations
//!
//! All database access goes through this module.
//! Relation tables stand in for the id lists a document store would
//! embed: deleting a relation row removes the id from the parent list.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite, SqlitePool, Transaction};
use std::path::Path;

use super::models::*;
use crate::error::AppError;

/// Database connection pool wrapper
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Connect to SQLite database
    ///
    /// Creates the file (and its parent directory) when missing and runs
    /// pending migrations automatically.
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(e.into()))?;
        }

        let connection_string = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&connection_string).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!(path = %path.display(), "Database connected and migrated successfully");

        Ok(Self { pool })
    }

    async fn fetch_ids(&self, sql: &str, id: &str) -> Result<Vec<String>, AppError> {
        let ids = sqlx::query_scalar::<_, String>(sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Insert a new user
    ///
    /// A duplicate email surfaces as a database unique violation; callers
    /// check `get_user_by_email` first to report a conflict.
    pub async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, username, email, password_hash, bio, gender,
                profile_picture_id, profile_picture_url, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.bio)
        .bind(&user.gender)
        .bind(&user.profile_picture_id)
        .bind(&user.profile_picture_url)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Load several users, preserving the order of `ids`
    pub async fn get_users(&self, ids: &[String]) -> Result<Vec<User>, AppError> {
        let mut users = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(user) = self.get_user(id).await? {
                users.push(user);
            }
        }
        Ok(users)
    }

    /// Every user except `id`, oldest first
    pub async fn get_users_except(&self, id: &str) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE id <> ? ORDER BY created_at, rowid",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// Persist profile fields (bio, gender, picture)
    pub async fn update_user_profile(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE users
            SET bio = ?, gender = ?, profile_picture_id = ?, profile_picture_url = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.bio)
        .bind(&user.gender)
        .bind(&user.profile_picture_id)
        .bind(&user.profile_picture_url)
        .bind(user.updated_at)
        .bind(&user.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Ids of posts owned by a user, oldest first
    pub async fn get_user_post_ids(&self, user_id: &str) -> Result<Vec<String>, AppError> {
        self.fetch_ids(
            "SELECT id FROM posts WHERE author_id = ? ORDER BY created_at, rowid",
            user_id,
        )
        .await
    }

    /// Ids of posts bookmarked by a user, in bookmark order
    pub async fn get_bookmark_ids(&self, user_id: &str) -> Result<Vec<String>, AppError> {
        self.fetch_ids(
            "SELECT post_id FROM bookmarks WHERE user_id = ? ORDER BY created_at, rowid",
            user_id,
        )
        .await
    }

    pub async fn get_follower_ids(&self, user_id: &str) -> Result<Vec<String>, AppError> {
        self.fetch_ids(
            "SELECT follower_id FROM follows WHERE following_id = ? ORDER BY created_at, rowid",
            user_id,
        )
        .await
    }

    pub async fn get_following_ids(&self, user_id: &str) -> Result<Vec<String>, AppError> {
        self.fetch_ids(
            "SELECT following_id FROM follows WHERE follower_id = ? ORDER BY created_at, rowid",
            user_id,
        )
        .await
    }

    pub async fn is_following(&self, follower_id: &str, following_id: &str) -> Result<bool, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM follows WHERE follower_id = ? AND following_id = ?",
        )
        .bind(follower_id)
        .bind(following_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    /// Flip whether `follower_id` follows `following_id`
    ///
    /// Inspects the current edge and inserts or deletes it inside one
    /// transaction, so both users' lists always change together.
    pub async fn toggle_follow(
        &self,
        follower_id: &str,
        following_id: &str,
    ) -> Result<FollowChange, AppError> {
        let mut tx = self.pool.begin().await?;

        let existing: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM follows WHERE follower_id = ? AND following_id = ?",
        )
        .bind(follower_id)
        .bind(following_id)
        .fetch_one(&mut *tx)
        .await?;

        let change = if existing > 0 {
            sqlx::query("DELETE FROM follows WHERE follower_id = ? AND following_id = ?")
                .bind(follower_id)
                .bind(following_id)
                .execute(&mut *tx)
                .await?;
            FollowChange::Unfollowed
        } else {
            sqlx::query(
                "INSERT INTO follows (follower_id, following_id, created_at) VALUES (?, ?, ?)",
            )
            .bind(follower_id)
            .bind(following_id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
            FollowChange::Followed
        };

        tx.commit().await?;
        Ok(change)
    }

    // =========================================================================
    // Bookmarks
    // =========================================================================

    pub async fn is_bookmarked(&self, user_id: &str, post_id: &str) -> Result<bool, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM bookmarks WHERE user_id = ? AND post_id = ?")
                .bind(user_id)
                .bind(post_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    pub async fn insert_bookmark(&self, user_id: &str, post_id: &str) -> Result<(), AppError> {
        sqlx::query(
            "INSERT OR IGNORE INTO bookmarks (user_id, post_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(post_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete_bookmark(&self, user_id: &str, post_id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM bookmarks WHERE user_id = ? AND post_id = ?")
            .bind(user_id)
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // =========================================================================
    // Posts
    // =========================================================================

    /// Insert a post together with its images
    pub async fn insert_post(&self, post: &Post, images: &[ImageRef]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        insert_post_rows(&mut tx, post, images).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn get_post(&self, id: &str) -> Result<Option<Post>, AppError> {
        let post = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(post)
    }

    /// All posts, newest first
    pub async fn get_all_posts(&self) -> Result<Vec<Post>, AppError> {
        let posts =
            sqlx::query_as::<_, Post>("SELECT * FROM posts ORDER BY created_at DESC, rowid DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(posts)
    }

    /// Posts of one author, newest first
    pub async fn get_posts_by_author(&self, author_id: &str) -> Result<Vec<Post>, AppError> {
        let posts = sqlx::query_as::<_, Post>(
            "SELECT * FROM posts WHERE author_id = ? ORDER BY created_at DESC, rowid DESC",
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    pub async fn update_post_caption(
        &self,
        id: &str,
        caption: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE posts SET caption = ?, updated_at = ? WHERE id = ?")
            .bind(caption)
            .bind(updated_at)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn get_post_images(&self, post_id: &str) -> Result<Vec<ImageRef>, AppError> {
        let rows = sqlx::query_as::<_, (String, String)>(
            "SELECT public_id, url FROM post_images WHERE post_id = ? ORDER BY position",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(public_id, url)| ImageRef { public_id, url })
            .collect())
    }

    /// Number of posts whose images reference `public_id`
    ///
    /// Shares copy the original's image references, so a stored file
    /// may be referenced by more than one post.
    pub async fn count_image_references(&self, public_id: &str) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM post_images WHERE public_id = ?")
            .bind(public_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Delete a post and everything hanging off it
    ///
    /// Two-level cascade in one transaction: the post's comments, the
    /// replies of those comments, every like row on any of them, the
    /// post's images, shares and bookmarks. Shares of the post keep
    /// existing with `original_post_id` cleared. When the post is itself
    /// a share, its author leaves the original's sharer set unless
    /// another of their shares of it remains.
    pub async fn delete_post_cascade(&self, post_id: &str) -> Result<CascadeSummary, AppError> {
        let mut tx = self.pool.begin().await?;

        let shared_from: Option<(String, Option<String>)> =
            sqlx::query_as("SELECT author_id, original_post_id FROM posts WHERE id = ?")
                .bind(post_id)
                .fetch_optional(&mut *tx)
                .await?;

        sqlx::query(
            r#"
            DELETE FROM reply_likes WHERE reply_id IN (
                SELECT r.id FROM replies r
                JOIN comments c ON c.id = r.comment_id
                WHERE c.post_id = ?
            )
            "#,
        )
        .bind(post_id)
        .execute(&mut *tx)
        .await?;

        let replies = sqlx::query(
            "DELETE FROM replies WHERE comment_id IN (SELECT id FROM comments WHERE post_id = ?)",
        )
        .bind(post_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        sqlx::query(
            "DELETE FROM comment_likes WHERE comment_id IN (SELECT id FROM comments WHERE post_id = ?)",
        )
        .bind(post_id)
        .execute(&mut *tx)
        .await?;

        let comments = sqlx::query("DELETE FROM comments WHERE post_id = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        for table in ["post_likes", "post_shares", "post_images", "bookmarks"] {
            sqlx::query(&format!("DELETE FROM {table} WHERE post_id = ?"))
                .bind(post_id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("UPDATE posts SET original_post_id = NULL WHERE original_post_id = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        if let Some((author_id, Some(original_id))) = shared_from {
            sqlx::query(
                r#"
                DELETE FROM post_shares
                WHERE post_id = ? AND user_id = ?
                  AND NOT EXISTS (
                    SELECT 1 FROM posts WHERE author_id = ? AND original_post_id = ?
                  )
                "#,
            )
            .bind(&original_id)
            .bind(&author_id)
            .bind(&author_id)
            .bind(&original_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(CascadeSummary { comments, replies })
    }

    // =========================================================================
    // Post likes and shares
    // =========================================================================

    pub async fn get_post_like_ids(&self, post_id: &str) -> Result<Vec<String>, AppError> {
        self.fetch_ids(
            "SELECT user_id FROM post_likes WHERE post_id = ? ORDER BY created_at, rowid",
            post_id,
        )
        .await
    }

    /// Record a like
    ///
    /// # Returns
    /// `false` when the user had already liked the post.
    pub async fn insert_post_like(&self, post_id: &str, user_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO post_likes (post_id, user_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(post_id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Remove a like
    ///
    /// # Returns
    /// `false` when there was no like to remove.
    pub async fn delete_post_like(&self, post_id: &str, user_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM post_likes WHERE post_id = ? AND user_id = ?")
            .bind(post_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn get_post_share_ids(&self, post_id: &str) -> Result<Vec<String>, AppError> {
        self.fetch_ids(
            "SELECT user_id FROM post_shares WHERE post_id = ? ORDER BY created_at, rowid",
            post_id,
        )
        .await
    }

    /// Insert the share post and record the sharer on the original
    ///
    /// Both writes commit together.
    pub async fn insert_share(
        &self,
        share: &Post,
        images: &[ImageRef],
        original_post_id: &str,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        insert_post_rows(&mut tx, share, images).await?;

        sqlx::query(
            "INSERT OR IGNORE INTO post_shares (post_id, user_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(original_post_id)
        .bind(&share.author_id)
        .bind(share.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    // Comments
    // =========================================================================

    pub async fn insert_comment(&self, comment: &Comment) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, text, author_id, post_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&comment.id)
        .bind(&comment.text)
        .bind(&comment.author_id)
        .bind(&comment.post_id)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_comment(&self, id: &str) -> Result<Option<Comment>, AppError> {
        let comment = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(comment)
    }

    /// Comments of a post, oldest first
    pub async fn get_comments_by_post(&self, post_id: &str) -> Result<Vec<Comment>, AppError> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT * FROM comments WHERE post_id = ? ORDER BY created_at, rowid",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    pub async fn get_comment_ids_by_post(&self, post_id: &str) -> Result<Vec<String>, AppError> {
        self.fetch_ids(
            "SELECT id FROM comments WHERE post_id = ? ORDER BY created_at, rowid",
            post_id,
        )
        .await
    }

    pub async fn update_comment_text(
        &self,
        id: &str,
        text: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE comments SET text = ?, updated_at = ? WHERE id = ?")
            .bind(text)
            .bind(updated_at)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Delete a comment with its replies and all their like rows
    ///
    /// # Returns
    /// Number of replies removed.
    pub async fn delete_comment_cascade(&self, comment_id: &str) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM reply_likes WHERE reply_id IN (SELECT id FROM replies WHERE comment_id = ?)",
        )
        .bind(comment_id)
        .execute(&mut *tx)
        .await?;

        let replies = sqlx::query("DELETE FROM replies WHERE comment_id = ?")
            .bind(comment_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM comment_likes WHERE comment_id = ?")
            .bind(comment_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(comment_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(replies)
    }

    pub async fn get_comment_like_ids(&self, comment_id: &str) -> Result<Vec<String>, AppError> {
        self.fetch_ids(
            "SELECT user_id FROM comment_likes WHERE comment_id = ? ORDER BY created_at, rowid",
            comment_id,
        )
        .await
    }

    /// # Returns
    /// `false` when the user had already liked the comment.
    pub async fn insert_comment_like(
        &self,
        comment_id: &str,
        user_id: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO comment_likes (comment_id, user_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(comment_id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// # Returns
    /// `false` when there was no like to remove.
    pub async fn delete_comment_like(
        &self,
        comment_id: &str,
        user_id: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM comment_likes WHERE comment_id = ? AND user_id = ?")
            .bind(comment_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    // =========================================================================
    // Replies
    // =========================================================================

    pub async fn insert_reply(&self, reply: &Reply) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO replies (id, text, author_id, comment_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&reply.id)
        .bind(&reply.text)
        .bind(&reply.author_id)
        .bind(&reply.comment_id)
        .bind(reply.created_at)
        .bind(reply.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_reply(&self, id: &str) -> Result<Option<Reply>, AppError> {
        let reply = sqlx::query_as::<_, Reply>("SELECT * FROM replies WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(reply)
    }

    /// Replies of a comment, oldest first
    pub async fn get_replies_by_comment(&self, comment_id: &str) -> Result<Vec<Reply>, AppError> {
        let replies = sqlx::query_as::<_, Reply>(
            "SELECT * FROM replies WHERE comment_id = ? ORDER BY created_at, rowid",
        )
        .bind(comment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(replies)
    }

    pub async fn get_reply_ids_by_comment(&self, comment_id: &str) -> Result<Vec<String>, AppError> {
        self.fetch_ids(
            "SELECT id FROM replies WHERE comment_id = ? ORDER BY created_at, rowid",
            comment_id,
        )
        .await
    }

    pub async fn update_reply_text(
        &self,
        id: &str,
        text: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE replies SET text = ?, updated_at = ? WHERE id = ?")
            .bind(text)
            .bind(updated_at)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Delete a reply and its like rows
    pub async fn delete_reply(&self, reply_id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM reply_likes WHERE reply_id = ?")
            .bind(reply_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM replies WHERE id = ?")
            .bind(reply_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn get_reply_like_ids(&self, reply_id: &str) -> Result<Vec<String>, AppError> {
        self.fetch_ids(
            "SELECT user_id FROM reply_likes WHERE reply_id = ? ORDER BY created_at, rowid",
            reply_id,
        )
        .await
    }

    /// # Returns
    /// `false` when the user had already liked the reply.
    pub async fn insert_reply_like(&self, reply_id: &str, user_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO reply_likes (reply_id, user_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(reply_id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// # Returns
    /// `false` when there was no like to remove.
    pub async fn delete_reply_like(&self, reply_id: &str, user_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM reply_likes WHERE reply_id = ? AND user_id = ?")
            .bind(reply_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    // =========================================================================
    // Conversations and messages
    // =========================================================================

    /// Conversation between two users, in either order
    pub async fn get_conversation(
        &self,
        first: &str,
        second: &str,
    ) -> Result<Option<Conversation>, AppError> {
        let (a, b) = Conversation::participant_key(first, second);
        let conversation = sqlx::query_as::<_, Conversation>(
            "SELECT * FROM conversations WHERE participant_a = ? AND participant_b = ?",
        )
        .bind(a)
        .bind(b)
        .fetch_optional(&self.pool)
        .await?;
        Ok(conversation)
    }

    /// Store a message, creating the pair's conversation on first use
    ///
    /// The conversation upsert and the message insert commit together.
    pub async fn insert_message(
        &self,
        sender_id: &str,
        receiver_id: &str,
        text: &str,
    ) -> Result<Message, AppError> {
        let (a, b) = Conversation::participant_key(sender_id, receiver_id);
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO conversations (id, participant_a, participant_b, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(participant_a, participant_b) DO UPDATE SET updated_at = excluded.updated_at
            "#,
        )
        .bind(EntityId::new().0)
        .bind(a)
        .bind(b)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let conversation_id: String = sqlx::query_scalar(
            "SELECT id FROM conversations WHERE participant_a = ? AND participant_b = ?",
        )
        .bind(a)
        .bind(b)
        .fetch_one(&mut *tx)
        .await?;

        let message = Message {
            id: EntityId::new().0,
            conversation_id,
            sender_id: sender_id.to_string(),
            receiver_id: receiver_id.to_string(),
            message: text.to_string(),
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO messages (id, conversation_id, sender_id, receiver_id, message, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&message.id)
        .bind(&message.conversation_id)
        .bind(&message.sender_id)
        .bind(&message.receiver_id)
        .bind(&message.message)
        .bind(message.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(message)
    }

    /// Messages of a conversation, oldest first
    pub async fn get_messages(&self, conversation_id: &str) -> Result<Vec<Message>, AppError> {
        let messages = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages WHERE conversation_id = ? ORDER BY created_at, rowid",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }
}

async fn insert_post_rows(
    tx: &mut Transaction<'_, Sqlite>,
    post: &Post,
    images: &[ImageRef],
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO posts (id, caption, author_id, original_post_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&post.id)
    .bind(&post.caption)
    .bind(&post.author_id)
    .bind(&post.original_post_id)
    .bind(post.created_at)
    .bind(post.updated_at)
    .execute(&mut **tx)
    .await?;

    for (position, image) in images.iter().enumerate() {
        sqlx::query(
            "INSERT INTO post_images (post_id, position, public_id, url) VALUES (?, ?, ?, ?)",
        )
        .bind(&post.id)
        .bind(position as i64)
        .bind(&image.public_id)
        .bind(&image.url)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}
