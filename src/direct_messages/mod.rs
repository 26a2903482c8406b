//! Direct-message history and the endpoints the chat composer posts to.

mod edit;
mod list;
mod send;

use axum::{http::StatusCode, response::{IntoResponse, Response}, routing::{get, patch, post}, Router};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{db::Member, AppResult, AppState};

pub const MESSAGES_BATCH: usize = 10;
pub const DELETED_CONTENT: &str = "This message has been deleted.";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/direct-messages", get(list::list_messages))
        .route("/socket/direct-messages", post(send::send_message))
        .route(
            "/socket/direct-messages/{direct_message_id}",
            patch(edit::edit_message).delete(edit::delete_message),
        )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DirectMessage {
    pub id: String,
    pub content: String,
    pub member_id: String,
    pub conversation_id: String,
    pub deleted: bool,
    pub created_at: String,
    pub updated_at: String,
    pub author_profile_id: String,
    pub author_name: String,
    pub author_image_url: String,
}

impl DirectMessage {
    pub fn edited(&self) -> bool {
        !self.deleted && self.created_at != self.updated_at
    }
}

/// One page of history, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageBatch {
    pub items: Vec<DirectMessage>,
    /// Id to pass as `cursor` for the next older page; absent on the last page.
    pub next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConversationQuery {
    pub(crate) conversation_id: Option<String>,
    pub(crate) cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageBody {
    pub(crate) content: String,
}

const MESSAGE_COLUMNS: &str = "d.id, d.content, d.member_id, d.conversation_id, d.deleted, d.created_at, d.updated_at,
    m.profile_id AS author_profile_id, p.name AS author_name, p.image_url AS author_image_url
    FROM direct_messages d
    JOIN members m ON m.id = d.member_id
    JOIN profiles p ON p.id = m.profile_id";

pub async fn fetch_batch(
    db_pool: &SqlitePool,
    conversation_id: &str,
    cursor: Option<&str>,
) -> sqlx::Result<MessageBatch> {
    let items: Vec<DirectMessage> = match cursor {
        Some(cursor) => sqlx::query_as(&format!(
            "SELECT {MESSAGE_COLUMNS} WHERE d.conversation_id=? AND d.id<? ORDER BY d.id DESC LIMIT ?"
        ))
            .bind(conversation_id)
            .bind(cursor)
            .bind(MESSAGES_BATCH as i64)
            .fetch_all(db_pool)
            .await?,
        None => sqlx::query_as(&format!(
            "SELECT {MESSAGE_COLUMNS} WHERE d.conversation_id=? ORDER BY d.id DESC LIMIT ?"
        ))
            .bind(conversation_id)
            .bind(MESSAGES_BATCH as i64)
            .fetch_all(db_pool)
            .await?,
    };

    let next_cursor = if items.len() == MESSAGES_BATCH {
        items.last().map(|message| message.id.clone())
    } else {
        None
    };

    Ok(MessageBatch { items, next_cursor })
}

pub async fn find_message(
    db_pool: &SqlitePool,
    conversation_id: &str,
    message_id: &str,
) -> sqlx::Result<Option<DirectMessage>> {
    sqlx::query_as(&format!("SELECT {MESSAGE_COLUMNS} WHERE d.conversation_id=? AND d.id=?"))
        .bind(conversation_id)
        .bind(message_id)
        .fetch_optional(db_pool)
        .await
}

/// The member `profile_id` plays in the conversation, if it is one of its two.
pub async fn participant(
    db_pool: &SqlitePool,
    conversation_id: &str,
    profile_id: &str,
) -> sqlx::Result<Option<Member>> {
    sqlx::query_as(
        "SELECT m.id, m.role, m.server_id, m.profile_id FROM conversations c
         JOIN members m ON m.id IN (c.member_one_id, c.member_two_id)
         WHERE c.id=? AND m.profile_id=?",
    )
        .bind(conversation_id)
        .bind(profile_id)
        .fetch_optional(db_pool)
        .await
}

fn refuse(status: StatusCode, reason: &'static str) -> AppResult<Response> {
    Ok((status, reason).into_response())
}
