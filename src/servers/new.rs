use axum::{debug_handler, extract::State, http::StatusCode, response::{IntoResponse, Redirect, Response}, Form};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db, session::current_profile, AppResult, AppState};

#[derive(Debug, Deserialize)]
pub(crate) struct NewServerForm {
    name: String,
    #[serde(default)]
    image_url: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn new_server(
    State(db_pool): State<SqlitePool>,
    session: Session,

    Form(NewServerForm { name, image_url }): Form<NewServerForm>,
) -> AppResult<Response> {
    let Some(profile) = current_profile(&session, &db_pool).await? else {
        return Ok(Redirect::to("/sign-in").into_response());
    };

    let name = name.trim();
    if name.is_empty() {
        return Ok((StatusCode::BAD_REQUEST, "Server name is required").into_response());
    }

    let server = db::create_server(&db_pool, &profile, name, image_url.trim()).await?;
    tracing::info!(server_id = %server.id, profile_id = %profile.id, "created server {name}");

    Ok(Redirect::to(
        &format!("/servers/{}", server.id)
    ).into_response())
}
