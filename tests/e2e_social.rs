//! E2E tests for profiles, follows, bookmarks, shares and messages

mod common;

use common::TestServer;
use serde_json::{Value, json};

#[tokio::test]
async fn test_follow_toggle_updates_both_sides() {
    let server = TestServer::new().await;
    let alice = server.register("alice").await;
    let bob = server.register("bob").await;
    let path = format!("/api/user/followorunfollow/{}", bob.id);

    let response = server.post_json(&path, &alice, json!({})).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Follow user successfully");

    let profile = server
        .get(&format!("/api/user/{}/profile", bob.id), &alice)
        .await;
    let body: Value = profile.json().await.unwrap();
    assert_eq!(body["data"]["followers"][0]["id"], alice.id.as_str());

    let response = server.post_json(&path, &alice, json!({})).await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Unfollow user successfully");

    let own = server
        .post_json(&format!("/api/user/followorunfollow/{}", alice.id), &alice, json!({}))
        .await;
    assert_eq!(own.status(), 400);
}

#[tokio::test]
async fn test_suggested_users_exclude_self() {
    let server = TestServer::new().await;
    let alice = server.register("alice").await;
    server.register("bob").await;

    let response = server.get("/api/user/suggested", &alice).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["bob"]);
}

#[tokio::test]
async fn test_bookmark_toggle() {
    let server = TestServer::new().await;
    let alice = server.register("alice").await;
    let bob = server.register("bob").await;
    let post = server.create_post(&alice, "caption").await;
    let path = format!("/api/post/{}/bookmark", post["id"].as_str().unwrap());

    let body: Value = server.get(&path, &bob).await.json().await.unwrap();
    assert_eq!(body["data"]["type"], "saved");
    let body: Value = server.get(&path, &bob).await.json().await.unwrap();
    assert_eq!(body["data"]["type"], "unsaved");
}

#[tokio::test]
async fn test_share_points_at_original() {
    let server = TestServer::new().await;
    let alice = server.register("alice").await;
    let bob = server.register("bob").await;
    let post = server.create_post(&alice, "caption").await;
    let id = post["id"].as_str().unwrap();

    let response = server
        .post_json(&format!("/api/post/{}/share", id), &bob, json!({}))
        .await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["original_post"], id);
    assert_eq!(body["data"]["author"]["id"], bob.id.as_str());
    assert_eq!(body["data"]["caption"], "caption");
}

#[tokio::test]
async fn test_messages_form_one_conversation() {
    let server = TestServer::new().await;
    let alice = server.register("alice").await;
    let bob = server.register("bob").await;

    let sent = server
        .post_json(
            &format!("/api/message/send/{}", bob.id),
            &alice,
            json!({ "message": "hi bob" }),
        )
        .await;
    assert_eq!(sent.status(), 201);
    server
        .post_json(
            &format!("/api/message/send/{}", alice.id),
            &bob,
            json!({ "message": "hi alice" }),
        )
        .await;

    let response = server
        .get(&format!("/api/message/all/{}", alice.id), &bob)
        .await;
    let body: Value = response.json().await.unwrap();
    let texts: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["message"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["hi bob", "hi alice"]);

    let empty = server
        .post_json(
            &format!("/api/message/send/{}", bob.id),
            &alice,
            json!({ "message": "" }),
        )
        .await;
    assert_eq!(empty.status(), 400);
}
