//! Direct message service

use std::sync::Arc;

use super::{load_user, required};
use crate::data::{Database, Message};
use crate::error::AppError;
use crate::metrics::record_action;
use crate::realtime::{NotificationEvent, NotificationKind, Notifier};

/// Message service
pub struct MessageService {
    db: Arc<Database>,
    notifier: Notifier,
}

impl MessageService {
    pub fn new(db: Arc<Database>, notifier: Notifier) -> Self {
        Self { db, notifier }
    }

    /// Send a message, creating the conversation on first contact
    ///
    /// The receiver gets the message itself and a `message` notification.
    ///
    /// # Errors
    /// - `Validation` if the text is empty
    /// - `NotFound` if the receiver does not exist
    pub async fn send(
        &self,
        sender_id: &str,
        receiver_id: &str,
        text: Option<String>,
    ) -> Result<Message, AppError> {
        let text = required(text, "Message is required")?;
        let sender = load_user(&self.db, sender_id).await?;
        let receiver = load_user(&self.db, receiver_id).await?;

        let message = self.db.insert_message(&sender.id, &receiver.id, &text).await?;
        tracing::info!(
            message_id = %message.id,
            conversation_id = %message.conversation_id,
            "Message sent"
        );
        record_action("message");

        self.notifier
            .push_message(&receiver.id, message.clone())
            .await;
        self.notifier
            .notify(
                &receiver.id,
                NotificationEvent::from_actor(NotificationKind::Message, &sender),
            )
            .await;
        Ok(message)
    }

    /// Messages exchanged with another user, oldest first
    pub async fn conversation(&self, actor_id: &str, other_id: &str) -> Result<Vec<Message>, AppError> {
        match self.db.get_conversation(actor_id, other_id).await? {
            Some(conversation) => self.db.get_messages(&conversation.id).await,
            None => Ok(Vec::new()),
        }
    }
}
