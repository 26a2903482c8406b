use axum::{debug_handler, extract::{Path, Query, State}, http::StatusCode, response::{IntoResponse, Response}, Json};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db::Member, session::current_profile, AppResult};

use super::{find_message, participant, refuse, ConversationQuery, DirectMessage, MessageBody, DELETED_CONTENT};

enum Lookup {
    Found(Member, DirectMessage),
    Refused(Response),
}

/// Shared checks: signed in, part of the conversation, message exists and isn't deleted.
async fn lookup(
    db_pool: &SqlitePool,
    session: &Session,
    conversation_id: Option<String>,
    direct_message_id: &str,
) -> AppResult<Lookup> {
    let refused = |status, reason| refuse(status, reason).map(Lookup::Refused);

    let Some(profile) = current_profile(session, db_pool).await? else {
        return refused(StatusCode::UNAUTHORIZED, "Unauthorized");
    };
    let Some(conversation_id) = conversation_id else {
        return refused(StatusCode::BAD_REQUEST, "Conversation ID missing");
    };
    let Some(member) = participant(db_pool, &conversation_id, &profile.id).await? else {
        return refused(StatusCode::NOT_FOUND, "Conversation not found");
    };
    let Some(message) = find_message(db_pool, &conversation_id, direct_message_id).await? else {
        return refused(StatusCode::NOT_FOUND, "Message not found");
    };
    if message.deleted {
        return refused(StatusCode::NOT_FOUND, "Message not found");
    }

    Ok(Lookup::Found(member, message))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn edit_message(
    Path(direct_message_id): Path<String>,
    Query(ConversationQuery { conversation_id, .. }): Query<ConversationQuery>,
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(MessageBody { content }): Json<MessageBody>,
) -> AppResult<Response> {
    let (member, message) = match lookup(&db_pool, &session, conversation_id, &direct_message_id).await? {
        Lookup::Found(member, message) => (member, message),
        Lookup::Refused(response) => return Ok(response),
    };
    if message.member_id != member.id {
        return refuse(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    if content.trim().is_empty() {
        return refuse(StatusCode::BAD_REQUEST, "Content missing");
    }

    sqlx::query("UPDATE direct_messages SET content=?, updated_at=strftime('%Y-%m-%d %H:%M:%f','now') WHERE id=?")
        .bind(&content)
        .bind(&message.id)
        .execute(&db_pool)
        .await?;

    updated(&db_pool, &message).await
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn delete_message(
    Path(direct_message_id): Path<String>,
    Query(ConversationQuery { conversation_id, .. }): Query<ConversationQuery>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let (member, message) = match lookup(&db_pool, &session, conversation_id, &direct_message_id).await? {
        Lookup::Found(member, message) => (member, message),
        Lookup::Refused(response) => return Ok(response),
    };
    if message.member_id != member.id && !member.role.moderates() {
        return refuse(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    sqlx::query("UPDATE direct_messages SET content=?, deleted=1, updated_at=strftime('%Y-%m-%d %H:%M:%f','now') WHERE id=?")
        .bind(DELETED_CONTENT)
        .bind(&message.id)
        .execute(&db_pool)
        .await?;
    tracing::debug!(member_id = %member.id, "deleted direct message {}", message.id);

    updated(&db_pool, &message).await
}

async fn updated(db_pool: &SqlitePool, message: &DirectMessage) -> AppResult<Response> {
    let message = find_message(db_pool, &message.conversation_id, &message.id)
        .await?
        .ok_or(anyhow::anyhow!("direct message {} vanished after update", message.id))?;
    Ok(Json(message).into_response())
}
