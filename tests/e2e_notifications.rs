//! E2E tests for notification fan-out into the client inbox

mod common;

use common::TestServer;
use glimpse::client::{NotificationInbox, Received};
use glimpse::realtime::{NotificationKind, ServerEvent};
use serde_json::json;
use tokio::sync::mpsc;

/// Register a live connection for `user_id` and drop the presence broadcast
async fn listen(server: &TestServer, user_id: &str) -> mpsc::UnboundedReceiver<ServerEvent> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    server
        .state
        .connections
        .connect(Some(user_id.to_string()), tx)
        .await;
    while rx.try_recv().is_ok() {}
    rx
}

fn feed(inbox: &mut NotificationInbox, rx: &mut mpsc::UnboundedReceiver<ServerEvent>) -> Vec<Received> {
    let mut outcomes = Vec::new();
    while let Ok(event) = rx.try_recv() {
        outcomes.push(inbox.apply(&event));
    }
    outcomes
}

#[tokio::test]
async fn test_like_then_dislike_cancels_in_inbox() {
    let server = TestServer::new().await;
    let alice = server.register("alice").await;
    let bob = server.register("bob").await;
    let post = server.create_post(&alice, "caption").await;
    let id = post["id"].as_str().unwrap();
    let mut alice_rx = listen(&server, &alice.id).await;
    let mut inbox = NotificationInbox::new();

    server.put(&format!("/api/post/{}/like", id), &bob, json!({})).await;
    feed(&mut inbox, &mut alice_rx);
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox.unread_count(), 1);
    assert_eq!(inbox.entries()[0].event.kind, NotificationKind::Like);

    server.put(&format!("/api/post/{}/dislike", id), &bob, json!({})).await;
    let outcomes = feed(&mut inbox, &mut alice_rx);
    assert!(matches!(outcomes.as_slice(), [Received::Cancelled(_)]));
    assert!(inbox.is_empty());
    assert_eq!(inbox.unread_count(), 0);
}

#[tokio::test]
async fn test_own_actions_do_not_notify() {
    let server = TestServer::new().await;
    let alice = server.register("alice").await;
    let post = server.create_post(&alice, "caption").await;
    let id = post["id"].as_str().unwrap();
    let mut alice_rx = listen(&server, &alice.id).await;

    server.put(&format!("/api/post/{}/like", id), &alice, json!({})).await;
    server
        .post_json(&format!("/api/post/{}/comment", id), &alice, json!({ "text": "me" }))
        .await;

    assert!(alice_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_message_delivers_payload_and_notification() {
    let server = TestServer::new().await;
    let alice = server.register("alice").await;
    let bob = server.register("bob").await;
    let mut bob_rx = listen(&server, &bob.id).await;
    let mut inbox = NotificationInbox::new();

    server
        .post_json(
            &format!("/api/message/send/{}", bob.id),
            &alice,
            json!({ "message": "hello" }),
        )
        .await;

    let first = bob_rx.try_recv().unwrap();
    assert!(matches!(&first, ServerEvent::NewMessage(m) if m.message == "hello"));
    assert_eq!(inbox.apply(&first), Received::Ignored);

    let second = bob_rx.try_recv().unwrap();
    assert!(matches!(inbox.apply(&second), Received::Stored(_)));
    assert_eq!(inbox.entries()[0].event.kind, NotificationKind::Message);
    assert_eq!(inbox.entries()[0].event.user.id, alice.id);
}

#[tokio::test]
async fn test_follow_notification_reaches_followed_user() {
    let server = TestServer::new().await;
    let alice = server.register("alice").await;
    let bob = server.register("bob").await;
    let mut bob_rx = listen(&server, &bob.id).await;
    let mut inbox = NotificationInbox::new();

    server
        .post_json(&format!("/api/user/followorunfollow/{}", bob.id), &alice, json!({}))
        .await;
    feed(&mut inbox, &mut bob_rx);
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox.entries()[0].event.kind, NotificationKind::Follow);

    server
        .post_json(&format!("/api/user/followorunfollow/{}", bob.id), &alice, json!({}))
        .await;
    feed(&mut inbox, &mut bob_rx);
    assert!(inbox.is_empty());
}
