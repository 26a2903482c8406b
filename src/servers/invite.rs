use axum::{debug_handler, extract::{Path, State}, response::{IntoResponse, Redirect, Response}};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db, session::current_profile, AppResult, AppState};

#[debug_handler(state = AppState)]
pub(crate) async fn invite(
    Path(invite_code): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    if invite_code.is_empty() || !invite_code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Ok(Redirect::to("/").into_response());
    }

    let Some(profile) = current_profile(&session, &db_pool).await? else {
        return Ok(Redirect::to(&format!("/sign-in?return_url=/invite/{invite_code}")).into_response());
    };

    let Some(server) = db::find_server_by_invite(&db_pool, &invite_code).await? else {
        return Ok(Redirect::to("/").into_response());
    };

    if db::join_server(&db_pool, &server.id, &profile.id).await? {
        tracing::info!(server_id = %server.id, profile_id = %profile.id, "{} joined {}", profile.name, server.name);
    }

    Ok(Redirect::to(&format!("/servers/{}", server.id)).into_response())
}
