mod common;

use axum::http::{Method, StatusCode};
use common::{json_body, TestApp};
use murmur::{conversations::get_or_create_conversation, db::{self, MemberRole}, direct_messages::DELETED_CONTENT};
use serde_json::json;

async fn conversation_id(app: &TestApp, guild: &common::Guild) -> String {
    get_or_create_conversation(&app.db_pool, &guild.ada_member.id, &guild.bob_member.id)
        .await
        .unwrap()
        .unwrap()
        .id
}

#[tokio::test]
async fn send_then_list() {
    let app = TestApp::new().await;
    let guild = app.guild().await;
    let conversation_id = conversation_id(&app, &guild).await;
    let ada = app.cookie(&guild.ada).await;
    let bob = app.cookie(&guild.bob).await;

    let sent = app
        .request(
            Method::POST,
            &format!("/api/socket/direct-messages?conversationId={conversation_id}"),
            Some(&ada),
            Some(json!({ "content": "hello bob" })),
        )
        .await;
    assert_eq!(sent.status(), StatusCode::CREATED);
    let sent = json_body(sent).await;
    assert_eq!(sent["memberId"], guild.ada_member.id.as_str());
    assert_eq!(sent["authorName"], "ada");

    let listed = app
        .get(&format!("/api/direct-messages?conversationId={conversation_id}"), Some(&bob))
        .await;
    assert_eq!(listed.status(), StatusCode::OK);
    let listed = json_body(listed).await;
    assert_eq!(listed["items"][0]["content"], "hello bob");
    assert_eq!(listed["nextCursor"], serde_json::Value::Null);
}

#[tokio::test]
async fn api_refusals() {
    let app = TestApp::new().await;
    let guild = app.guild().await;
    let conversation_id = conversation_id(&app, &guild).await;
    let ada = app.cookie(&guild.ada).await;
    let stranger = app.profile("stranger").await;
    let stranger = app.cookie(&stranger).await;
    let list = format!("/api/direct-messages?conversationId={conversation_id}");

    assert_eq!(app.get(&list, None).await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.get("/api/direct-messages", Some(&ada)).await.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.get(&list, Some(&stranger)).await.status(), StatusCode::NOT_FOUND);

    let blank = app
        .request(
            Method::POST,
            &format!("/api/socket/direct-messages?conversationId={conversation_id}"),
            Some(&ada),
            Some(json!({ "content": "   " })),
        )
        .await;
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn only_the_author_edits() {
    let app = TestApp::new().await;
    let guild = app.guild().await;
    let conversation_id = conversation_id(&app, &guild).await;
    let ada = app.cookie(&guild.ada).await;
    let bob = app.cookie(&guild.bob).await;

    let sent = app
        .request(
            Method::POST,
            &format!("/api/socket/direct-messages?conversationId={conversation_id}"),
            Some(&bob),
            Some(json!({ "content": "typo" })),
        )
        .await;
    let message_id = json_body(sent).await["id"].as_str().unwrap().to_owned();
    let uri = format!("/api/socket/direct-messages/{message_id}?conversationId={conversation_id}");

    let by_ada = app.request(Method::PATCH, &uri, Some(&ada), Some(json!({ "content": "hijack" }))).await;
    assert_eq!(by_ada.status(), StatusCode::UNAUTHORIZED);

    let by_bob = app.request(Method::PATCH, &uri, Some(&bob), Some(json!({ "content": "fixed" }))).await;
    assert_eq!(by_bob.status(), StatusCode::OK);
    let edited = json_body(by_bob).await;
    assert_eq!(edited["content"], "fixed");
    assert_ne!(edited["createdAt"], edited["updatedAt"]);
}

#[tokio::test]
async fn moderators_and_authors_delete() {
    let app = TestApp::new().await;
    let guild = app.guild().await;
    let conversation_id = conversation_id(&app, &guild).await;
    let ada = app.cookie(&guild.ada).await;
    let bob = app.cookie(&guild.bob).await;
    let send = format!("/api/socket/direct-messages?conversationId={conversation_id}");

    let from_ada = app.request(Method::POST, &send, Some(&ada), Some(json!({ "content": "mine" }))).await;
    let ada_message = json_body(from_ada).await["id"].as_str().unwrap().to_owned();
    let from_bob = app.request(Method::POST, &send, Some(&bob), Some(json!({ "content": "rude" }))).await;
    let bob_message = json_body(from_bob).await["id"].as_str().unwrap().to_owned();

    // bob is a guest
    let response = app
        .request(
            Method::DELETE,
            &format!("/api/socket/direct-messages/{ada_message}?conversationId={conversation_id}"),
            Some(&bob),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // ada is the server admin
    let uri = format!("/api/socket/direct-messages/{bob_message}?conversationId={conversation_id}");
    let response = app.request(Method::DELETE, &uri, Some(&ada), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let deleted = json_body(response).await;
    assert_eq!(deleted["deleted"], true);
    assert_eq!(deleted["content"], DELETED_CONTENT);

    let again = app.request(Method::DELETE, &uri, Some(&ada), None).await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);

    assert_eq!(
        db::find_member(&app.db_pool, &guild.server.id, &guild.ada.id).await.unwrap().unwrap().role,
        MemberRole::Admin
    );
}

#[tokio::test]
async fn deleted_message_cannot_be_edited() {
    let app = TestApp::new().await;
    let guild = app.guild().await;
    let conversation_id = conversation_id(&app, &guild).await;
    let bob = app.cookie(&guild.bob).await;

    let sent = app
        .request(
            Method::POST,
            &format!("/api/socket/direct-messages?conversationId={conversation_id}"),
            Some(&bob),
            Some(json!({ "content": "oops" })),
        )
        .await;
    let message_id = json_body(sent).await["id"].as_str().unwrap().to_owned();
    let uri = format!("/api/socket/direct-messages/{message_id}?conversationId={conversation_id}");

    let deleted = app.request(Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(deleted.status(), StatusCode::OK);

    let edit = app.request(Method::PATCH, &uri, Some(&bob), Some(json!({ "content": "back" }))).await;
    assert_eq!(edit.status(), StatusCode::NOT_FOUND);
    assert_eq!(common::text(edit).await, "Message not found");

    let stored = murmur::direct_messages::find_message(&app.db_pool, &conversation_id, &message_id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.deleted);
    assert_eq!(stored.content, DELETED_CONTENT);
}
