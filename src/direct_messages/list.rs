use axum::{debug_handler, extract::{Query, State}, http::StatusCode, response::{IntoResponse, Response}, Json};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{session::current_profile, AppResult};

use super::{fetch_batch, participant, refuse, ConversationQuery};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn list_messages(
    Query(ConversationQuery { conversation_id, cursor }): Query<ConversationQuery>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(profile) = current_profile(&session, &db_pool).await? else {
        return refuse(StatusCode::UNAUTHORIZED, "Unauthorized");
    };
    let Some(conversation_id) = conversation_id else {
        return refuse(StatusCode::BAD_REQUEST, "Conversation ID missing");
    };
    if participant(&db_pool, &conversation_id, &profile.id).await?.is_none() {
        return refuse(StatusCode::NOT_FOUND, "Conversation not found");
    }

    let batch = fetch_batch(&db_pool, &conversation_id, cursor.as_deref()).await?;
    Ok(Json(batch).into_response())
}
