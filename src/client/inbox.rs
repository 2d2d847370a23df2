//! Client-side notification inbox
//!
//! Applies notification events the way a connected client presents
//! them: positive events are stored newest first as unread entries,
//! cancellation events remove the matching entry and are never stored.

use std::collections::HashMap;

use serde::Serialize;

use crate::data::EntityId;
use crate::realtime::{NotificationEvent, NotificationKind, ServerEvent};

/// One stored notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InboxEntry {
    pub id: String,
    pub is_read: bool,
    #[serde(flatten)]
    pub event: NotificationEvent,
}

/// Identity shared by a positive event and the event cancelling it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CorrelationKey {
    kind: NotificationKind,
    actor: String,
    target: Vec<String>,
}

impl CorrelationKey {
    /// Key of `event` as if it were of the positive kind `base`
    fn new(base: NotificationKind, event: &NotificationEvent) -> Self {
        let post = event.post.as_ref().map(|p| p.id.clone());
        let comment = event.comment.as_ref().map(|c| c.id.clone());
        let reply = event.reply.as_ref().map(|r| r.id.clone());

        let target = match base {
            NotificationKind::Like => vec![post],
            NotificationKind::Comment => vec![post, comment],
            NotificationKind::Reply => vec![comment, reply],
            NotificationKind::LikeComment => vec![comment],
            NotificationKind::LikeReply => vec![reply],
            _ => Vec::new(),
        };

        Self {
            kind: base,
            actor: event.user.id.clone(),
            target: target.into_iter().map(Option::unwrap_or_default).collect(),
        }
    }
}

/// Result of applying one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    /// Stored under the given entry id
    Stored(String),
    /// Removed the entry with the given id
    Cancelled(String),
    /// A cancellation with nothing to cancel
    Ignored,
}

/// Ordered notification list with a derived unread count
#[derive(Debug, Default)]
pub struct NotificationInbox {
    /// Newest first
    entries: Vec<InboxEntry>,
    /// Live entry ids per correlation key, most recent last
    index: HashMap<CorrelationKey, Vec<String>>,
    unread: usize,
}

impl NotificationInbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[InboxEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn unread_count(&self) -> usize {
        self.unread
    }

    /// Apply a real-time frame; frames other than notifications are ignored
    pub fn apply(&mut self, frame: &ServerEvent) -> Received {
        match frame {
            ServerEvent::Notification(event) => self.receive(event.clone()),
            _ => Received::Ignored,
        }
    }

    /// Apply one notification event
    pub fn receive(&mut self, event: NotificationEvent) -> Received {
        let outcome = match event.kind.cancels() {
            Some(base) => self.cancel(CorrelationKey::new(base, &event)),
            None => {
                let id = EntityId::new().0;
                self.index
                    .entry(CorrelationKey::new(event.kind, &event))
                    .or_default()
                    .push(id.clone());
                self.entries.insert(
                    0,
                    InboxEntry {
                        id: id.clone(),
                        is_read: false,
                        event,
                    },
                );
                Received::Stored(id)
            }
        };
        self.recount();
        outcome
    }

    /// Mark one entry read
    ///
    /// # Returns
    /// `false` if no entry has that id
    pub fn mark_read(&mut self, id: &str) -> bool {
        let found = match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.is_read = true;
                true
            }
            None => false,
        };
        self.recount();
        found
    }

    pub fn mark_all_read(&mut self) {
        for entry in &mut self.entries {
            entry.is_read = true;
        }
        self.recount();
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.recount();
    }

    fn cancel(&mut self, key: CorrelationKey) -> Received {
        let Some(stack) = self.index.get_mut(&key) else {
            return Received::Ignored;
        };
        let removed = stack.pop();
        if stack.is_empty() {
            self.index.remove(&key);
        }

        match removed {
            Some(id) => {
                self.entries.retain(|entry| entry.id != id);
                Received::Cancelled(id)
            }
            None => Received::Ignored,
        }
    }

    fn recount(&mut self) {
        self.unread = self.entries.iter().filter(|entry| !entry.is_read).count();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::{CommentSummary, PostSummary, ReplySummary, UserSummary};

    fn actor(id: &str) -> UserSummary {
        UserSummary {
            id: id.to_string(),
            username: id.to_string(),
            bio: String::new(),
            profile_picture: None,
        }
    }

    fn post(id: &str) -> PostSummary {
        PostSummary {
            id: id.to_string(),
            caption: String::new(),
            image: Vec::new(),
        }
    }

    fn event(kind: NotificationKind, user: &str) -> NotificationEvent {
        NotificationEvent {
            kind,
            user: actor(user),
            post: None,
            comment: None,
            reply: None,
            message: String::new(),
        }
    }

    fn on_post(kind: NotificationKind, user: &str, post_id: &str) -> NotificationEvent {
        NotificationEvent {
            post: Some(post(post_id)),
            ..event(kind, user)
        }
    }

    #[test]
    fn like_then_dislike_leaves_inbox_empty() {
        let mut inbox = NotificationInbox::new();

        inbox.receive(on_post(NotificationKind::Like, "u1", "p1"));
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox.unread_count(), 1);

        let outcome = inbox.receive(on_post(NotificationKind::Dislike, "u1", "p1"));
        assert!(matches!(outcome, Received::Cancelled(_)));
        assert!(inbox.is_empty());
        assert_eq!(inbox.unread_count(), 0);
    }

    #[test]
    fn dislike_only_cancels_matching_actor_and_post() {
        let mut inbox = NotificationInbox::new();
        inbox.receive(on_post(NotificationKind::Like, "u1", "p1"));
        inbox.receive(on_post(NotificationKind::Like, "u2", "p1"));
        inbox.receive(on_post(NotificationKind::Like, "u1", "p2"));

        inbox.receive(on_post(NotificationKind::Dislike, "u1", "p1"));

        let remaining: Vec<(&str, &str)> = inbox
            .entries()
            .iter()
            .map(|e| (e.event.user.id.as_str(), e.event.post.as_ref().unwrap().id.as_str()))
            .collect();
        assert_eq!(remaining, vec![("u1", "p2"), ("u2", "p1")]);
    }

    #[test]
    fn cancellation_without_match_is_ignored() {
        let mut inbox = NotificationInbox::new();
        inbox.receive(event(NotificationKind::Follow, "u1"));

        let outcome = inbox.receive(event(NotificationKind::Unfollow, "u2"));
        assert_eq!(outcome, Received::Ignored);
        assert_eq!(inbox.len(), 1);
    }

    #[test]
    fn cancellation_removes_most_recent_match() {
        let mut inbox = NotificationInbox::new();
        let Received::Stored(older) = inbox.receive(event(NotificationKind::Message, "u1")) else {
            panic!("message should be stored");
        };
        inbox.receive(event(NotificationKind::Message, "u1"));

        inbox.receive(event(NotificationKind::DeleteMessage, "u1"));
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox.entries()[0].id, older);
    }

    #[test]
    fn comment_and_reply_pairs_correlate_on_targets() {
        let mut inbox = NotificationInbox::new();
        let comment = CommentSummary {
            id: "c1".to_string(),
            text: "hey".to_string(),
        };
        let reply = ReplySummary {
            id: "r1".to_string(),
            text: "yo".to_string(),
        };

        let commented = NotificationEvent {
            post: Some(post("p1")),
            comment: Some(comment.clone()),
            ..event(NotificationKind::Comment, "u1")
        };
        let replied = NotificationEvent {
            comment: Some(comment.clone()),
            reply: Some(reply.clone()),
            ..event(NotificationKind::Reply, "u1")
        };
        let liked_reply = NotificationEvent {
            reply: Some(reply.clone()),
            ..event(NotificationKind::LikeReply, "u1")
        };
        inbox.receive(commented.clone());
        inbox.receive(replied.clone());
        inbox.receive(liked_reply.clone());

        inbox.receive(NotificationEvent {
            kind: NotificationKind::DislikeReply,
            ..liked_reply
        });
        inbox.receive(NotificationEvent {
            kind: NotificationKind::DeleteReply,
            ..replied
        });
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox.entries()[0].event.kind, NotificationKind::Comment);

        inbox.receive(NotificationEvent {
            kind: NotificationKind::DeleteComment,
            ..commented
        });
        assert!(inbox.is_empty());
    }

    #[test]
    fn mark_read_and_mark_all_read_update_unread_count() {
        let mut inbox = NotificationInbox::new();
        let Received::Stored(first) = inbox.receive(event(NotificationKind::Follow, "u1")) else {
            panic!("follow should be stored");
        };
        inbox.receive(event(NotificationKind::Follow, "u2"));
        assert_eq!(inbox.unread_count(), 2);

        assert!(inbox.mark_read(&first));
        assert!(inbox.mark_read(&first));
        assert_eq!(inbox.unread_count(), 1);
        assert!(!inbox.mark_read("missing"));

        inbox.mark_all_read();
        assert_eq!(inbox.unread_count(), 0);
        assert_eq!(inbox.len(), 2);
    }

    #[test]
    fn clear_all_empties_inbox_and_index() {
        let mut inbox = NotificationInbox::new();
        inbox.receive(on_post(NotificationKind::Like, "u1", "p1"));
        inbox.clear_all();

        assert!(inbox.is_empty());
        assert_eq!(inbox.unread_count(), 0);
        assert_eq!(
            inbox.receive(on_post(NotificationKind::Dislike, "u1", "p1")),
            Received::Ignored
        );
    }

    #[test]
    fn newest_entries_come_first() {
        let mut inbox = NotificationInbox::new();
        inbox.receive(event(NotificationKind::Follow, "u1"));
        inbox.receive(event(NotificationKind::Follow, "u2"));

        assert_eq!(inbox.entries()[0].event.user.id, "u2");
    }

    #[test]
    fn non_notification_frames_are_ignored() {
        let mut inbox = NotificationInbox::new();
        let outcome = inbox.apply(&ServerEvent::GetOnlineUsers(vec!["u1".to_string()]));
        assert_eq!(outcome, Received::Ignored);
        assert!(inbox.is_empty());
    }
}
