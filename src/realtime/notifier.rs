//! Notification fan-out
//!
//! Best-effort, single-attempt delivery to a user's current connection.
//! Offline targets drop the event; there is no backlog.

use std::sync::Arc;

use super::events::{NotificationEvent, ServerEvent};
use super::registry::ConnectionRegistry;
use crate::data::Message;
use crate::metrics::NOTIFICATIONS_TOTAL;

/// Pushes events to connected users
#[derive(Clone)]
pub struct Notifier {
    registry: Arc<ConnectionRegistry>,
}

impl Notifier {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Deliver a notification to `target`
    ///
    /// Skipped when the target is the actor.
    ///
    /// # Returns
    /// `true` if the event was queued on a live connection
    pub async fn notify(&self, target: &str, event: NotificationEvent) -> bool {
        if event.user.id == target {
            return false;
        }

        let kind = event.kind.as_str();
        let delivered = self.push(target, ServerEvent::Notification(event)).await;
        let outcome = if delivered { "delivered" } else { "dropped" };

        NOTIFICATIONS_TOTAL.with_label_values(&[kind, outcome]).inc();
        tracing::debug!(target_user = %target, kind, outcome, "Notification fan-out");
        delivered
    }

    /// Deliver a direct message to its receiver
    pub async fn push_message(&self, target: &str, message: Message) -> bool {
        self.push(target, ServerEvent::NewMessage(message)).await
    }

    async fn push(&self, target: &str, event: ServerEvent) -> bool {
        match self.registry.lookup(target).await {
            Some(sender) => sender.send(event).is_ok(),
            None => false,
        }
    }
}
