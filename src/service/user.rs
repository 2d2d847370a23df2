//! User service
//!
//! Handles registration, login, profiles, suggestions and the
//! follow/unfollow toggle.

use std::sync::Arc;

use chrono::Utc;

use super::{load_user, required};
use crate::auth::{hash_password, verify_password};
use crate::data::{Database, EntityId, FollowChange, User};
use crate::error::AppError;
use crate::metrics::record_action;
use crate::realtime::{NotificationEvent, NotificationKind, Notifier};
use crate::storage::{MediaStorage, Upload};

/// Fields accepted by a profile edit; absent or blank fields are kept
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub bio: Option<String>,
    pub gender: Option<String>,
    pub profile_picture: Option<Upload>,
}

/// User service
pub struct UserService {
    db: Arc<Database>,
    storage: Arc<MediaStorage>,
    notifier: Notifier,
}

impl UserService {
    /// Create new user service
    pub fn new(db: Arc<Database>, storage: Arc<MediaStorage>, notifier: Notifier) -> Self {
        Self {
            db,
            storage,
            notifier,
        }
    }

    /// Register a new account
    ///
    /// # Errors
    /// - `Validation` if username, email or password is missing
    /// - `Conflict` if the email is already registered
    pub async fn register(
        &self,
        username: Option<String>,
        email: Option<String>,
        password: Option<String>,
    ) -> Result<User, AppError> {
        const MISSING: &str = "All required fields must be provided";
        let username = required(username, MISSING)?;
        let email = required(email, MISSING)?.to_lowercase();
        let password = password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::Validation(MISSING.to_string()))?;

        if self.db.get_user_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }

        let now = Utc::now();
        let user = User {
            id: EntityId::new().0,
            username,
            email,
            password_hash: hash_password(&password)?,
            bio: String::new(),
            gender: None,
            profile_picture_id: None,
            profile_picture_url: None,
            created_at: now,
            updated_at: now,
        };
        self.db.insert_user(&user).await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        record_action("register");
        Ok(user)
    }

    /// Check credentials
    ///
    /// # Errors
    /// - `Validation` if email or password is missing
    /// - `NotFound` for an unknown email or a wrong password
    pub async fn login(
        &self,
        email: Option<String>,
        password: Option<String>,
    ) -> Result<User, AppError> {
        const MISSING: &str = "Something is missing, please check!";
        const INVALID: &str = "Invalid Email or Password";
        let email = required(email, MISSING)?.to_lowercase();
        let password = password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::Validation(MISSING.to_string()))?;

        let user = self
            .db
            .get_user_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound(INVALID.to_string()))?;

        if !verify_password(&password, &user.password_hash)? {
            return Err(AppError::NotFound(INVALID.to_string()));
        }

        tracing::info!(user_id = %user.id, "User logged in");
        record_action("login");
        Ok(user)
    }

    /// Load a user by id
    pub async fn get(&self, id: &str) -> Result<User, AppError> {
        load_user(&self.db, id).await
    }

    /// Update bio, gender and profile picture
    ///
    /// A new picture replaces the previous stored file.
    pub async fn edit_profile(&self, actor_id: &str, update: ProfileUpdate) -> Result<User, AppError> {
        let mut user = load_user(&self.db, actor_id).await?;
        let previous_picture = user.profile_picture();

        if let Some(file) = &update.profile_picture {
            let picture = self.storage.upload_avatar(file).await?;
            user.profile_picture_id = Some(picture.public_id);
            user.profile_picture_url = Some(picture.url);
        }
        if let Some(bio) = update.bio.map(|b| b.trim().to_string()).filter(|b| !b.is_empty()) {
            user.bio = bio;
        }
        if let Some(gender) = update
            .gender
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
        {
            user.gender = Some(gender);
        }
        user.updated_at = Utc::now();
        self.db.update_user_profile(&user).await?;

        if update.profile_picture.is_some() {
            if let Some(previous) = previous_picture {
                self.storage.delete(&previous.public_id).await?;
            }
        }

        tracing::info!(user_id = %user.id, "Profile updated");
        record_action("edit_profile");
        Ok(user)
    }

    /// Every user except the actor
    pub async fn suggested(&self, actor_id: &str) -> Result<Vec<User>, AppError> {
        self.db.get_users_except(actor_id).await
    }

    /// Follow the target, or unfollow if already following
    ///
    /// Both users' lists change together and the target is notified.
    ///
    /// # Errors
    /// - `Validation` if the actor targets themselves
    /// - `NotFound` if either user does not exist
    pub async fn follow_or_unfollow(
        &self,
        actor_id: &str,
        target_id: &str,
    ) -> Result<FollowChange, AppError> {
        if actor_id == target_id {
            return Err(AppError::Validation(
                "You cannot follow or unfollow yourself".to_string(),
            ));
        }
        let actor = load_user(&self.db, actor_id).await?;
        let target = load_user(&self.db, target_id).await?;

        let change = self.db.toggle_follow(&actor.id, &target.id).await?;
        let kind = match change {
            FollowChange::Followed => NotificationKind::Follow,
            FollowChange::Unfollowed => NotificationKind::Unfollow,
        };

        tracing::info!(actor = %actor.id, target = %target.id, change = ?change, "Follow toggled");
        record_action(kind.as_str());
        self.notifier
            .notify(&target.id, NotificationEvent::from_actor(kind, &actor))
            .await;
        Ok(change)
    }
}
