mod common;

use axum::http::StatusCode;
use common::{location, text, TestApp};
use murmur::conversations::find_conversation;

#[tokio::test]
async fn without_profile_redirects_to_sign_in() {
    let app = TestApp::new().await;
    let guild = app.guild().await;
    let uri = format!("/servers/{}/conversations/{}", guild.server.id, guild.bob_member.id);

    let response = app.get(&uri, None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/sign-in");

    // a session whose user never got a profile
    let cookie = app.cookie_for_user_id("test:ghost").await;
    let response = app.get(&uri, Some(&cookie)).await;
    assert_eq!(location(&response), "/sign-in");
}

#[tokio::test]
async fn non_member_redirects_home() {
    let app = TestApp::new().await;
    let guild = app.guild().await;
    let stranger = app.profile("stranger").await;
    let cookie = app.cookie(&stranger).await;

    let response = app
        .get(&format!("/servers/{}/conversations/{}", guild.server.id, guild.bob_member.id), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let response = app.get(&format!("/servers/nope/conversations/{}", guild.bob_member.id), Some(&cookie)).await;
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn unresolvable_conversation_redirects_to_server() {
    let app = TestApp::new().await;
    let guild = app.guild().await;
    let cookie = app.cookie(&guild.ada).await;
    let server_root = format!("/servers/{}", guild.server.id);

    for member_id in ["not-a-member", guild.ada_member.id.as_str()] {
        let response = app
            .get(&format!("{server_root}/conversations/{member_id}"), Some(&cookie))
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), server_root);
    }
}

#[tokio::test]
async fn text_view_shows_other_member_and_composer() {
    let app = TestApp::new().await;
    let guild = app.guild().await;
    let cookie = app.cookie(&guild.ada).await;

    let response = app
        .get(&format!("/servers/{}/conversations/{}", guild.server.id, guild.bob_member.id), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = text(response).await;
    assert!(html.contains("<span>bob</span>"));
    assert!(html.contains(r#"id="chat-messages""#));
    assert!(html.contains(r#"id="chat-input""#));
    assert!(!html.contains(r#"id="media-room""#));

    let conversation = find_conversation(&app.db_pool, &guild.ada_member.id, &guild.bob_member.id)
        .await
        .unwrap()
        .unwrap();
    assert!(html.contains(&conversation.id));
}

#[tokio::test]
async fn video_view_shows_only_the_media_room() {
    let app = TestApp::new().await;
    let guild = app.guild().await;
    let cookie = app.cookie(&guild.bob).await;

    let response = app
        .get(
            &format!("/servers/{}/conversations/{}?video=true", guild.server.id, guild.ada_member.id),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = text(response).await;
    assert!(html.contains("<span>ada</span>"));
    assert!(html.contains(r#"id="media-room""#));
    assert!(!html.contains(r#"id="chat-messages""#));
    assert!(!html.contains(r#"id="chat-input""#));
}

#[tokio::test]
async fn repeated_video_flag_still_opens_the_media_room() {
    let app = TestApp::new().await;
    let guild = app.guild().await;
    let cookie = app.cookie(&guild.bob).await;

    let response = app
        .get(
            &format!("/servers/{}/conversations/{}?video=1&video=1", guild.server.id, guild.ada_member.id),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(text(response).await.contains(r#"id="media-room""#));

    let response = app
        .get(
            &format!("/servers/{}/conversations/{}?video=no&video=0", guild.server.id, guild.ada_member.id),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(text(response).await.contains(r#"id="chat-messages""#));
}

#[tokio::test]
async fn both_sides_land_in_the_same_conversation() {
    let app = TestApp::new().await;
    let guild = app.guild().await;
    let ada = app.cookie(&guild.ada).await;
    let bob = app.cookie(&guild.bob).await;

    let from_ada = app
        .get(&format!("/servers/{}/conversations/{}", guild.server.id, guild.bob_member.id), Some(&ada))
        .await;
    let from_bob = app
        .get(&format!("/servers/{}/conversations/{}", guild.server.id, guild.ada_member.id), Some(&bob))
        .await;
    assert_eq!(from_ada.status(), StatusCode::OK);
    assert_eq!(from_bob.status(), StatusCode::OK);

    let (count,): (i64,) = sqlx::query_as("SELECT count(*) FROM conversations")
        .fetch_one(&app.db_pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}
