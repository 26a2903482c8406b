use askama::Template;
use axum::{debug_handler, extract::{Path, Query, State}, response::{Html, IntoResponse, Redirect, Response}};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{direct_messages, session::current_profile, AppResult, AppState};

use super::{resolve_direct_chat, ChatView, ConversationPage};

#[debug_handler(state = AppState)]
pub(crate) async fn conversation(
    Path((server_id, member_id)): Path<(String, String)>,
    Query(params): Query<Vec<(String, String)>>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let profile = current_profile(&session, &db_pool).await?;

    let chat = match resolve_direct_chat(&db_pool, profile, &server_id, &member_id).await? {
        Ok(chat) => chat,
        Err(denied) => {
            tracing::debug!(?denied, %server_id, %member_id, "conversation page redirected");
            return Ok(Redirect::to(&denied.location()).into_response());
        }
    };

    let view = ChatView::from_query(&params);
    let first_batch = match view {
        ChatView::Text => Some(direct_messages::fetch_batch(&db_pool, &chat.conversation.id, None).await?),
        ChatView::Media => None,
    };

    Ok(Html(
        ConversationPage::new(&chat, view, first_batch).render()?
    ).into_response())
}
