use axum::{debug_handler, extract::{Query, State}, http::StatusCode, response::{IntoResponse, Response}, Json};
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{session::current_profile, AppResult};

use super::{find_message, participant, refuse, ConversationQuery, MessageBody};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn send_message(
    Query(ConversationQuery { conversation_id, .. }): Query<ConversationQuery>,
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(MessageBody { content }): Json<MessageBody>,
) -> AppResult<Response> {
    let Some(profile) = current_profile(&session, &db_pool).await? else {
        return refuse(StatusCode::UNAUTHORIZED, "Unauthorized");
    };
    let Some(conversation_id) = conversation_id else {
        return refuse(StatusCode::BAD_REQUEST, "Conversation ID missing");
    };
    if content.trim().is_empty() {
        return refuse(StatusCode::BAD_REQUEST, "Content missing");
    }
    let Some(member) = participant(&db_pool, &conversation_id, &profile.id).await? else {
        return refuse(StatusCode::NOT_FOUND, "Conversation not found");
    };

    let id = Uuid::now_v7().to_string();
    sqlx::query("INSERT INTO direct_messages (id,content,member_id,conversation_id) VALUES (?,?,?,?)")
        .bind(&id)
        .bind(&content)
        .bind(&member.id)
        .bind(&conversation_id)
        .execute(&db_pool)
        .await?;
    tracing::debug!(%conversation_id, member_id = %member.id, "direct message {id}");

    let message = find_message(&db_pool, &conversation_id, &id)
        .await?
        .ok_or(anyhow::anyhow!("direct message {id} vanished after insert"))?;
    Ok((StatusCode::CREATED, Json(message)).into_response())
}
