use askama::Template;
use axum::{debug_handler, extract::{Path, State}, response::{Html, IntoResponse, Redirect, Response}};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{config::Config, db::{self, MemberProfile, Server}, res, session::current_profile, AppResult, AppState};

#[derive(Template)]
#[template(path = "server.html")]
struct ServerPage {
    server: Server,
    invite_url: String,
    /// Everyone but the viewer.
    members: Vec<MemberProfile>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn server(
    State(db_pool): State<SqlitePool>,
    State(config): State<Config>,
    session: Session,
    Path(server_id): Path<String>,
) -> AppResult<Response> {
    let Some(profile) = current_profile(&session, &db_pool).await? else {
        return Ok(Redirect::to("/sign-in").into_response());
    };

    let Some(current_member) = db::find_member(&db_pool, &server_id, &profile.id).await? else {
        return Ok(Redirect::to("/").into_response());
    };

    let Some(server) = db::find_server(&db_pool, &server_id).await? else {
        return res::sorry("server");
    };

    let members = db::members_of_server(&db_pool, &server_id)
        .await?
        .into_iter()
        .filter(|member| member.id != current_member.id)
        .collect();

    let invite_url = format!("{}/invite/{}", config.public_url, server.invite_code);
    Ok(Html(
        ServerPage { server, invite_url, members }.render()?
    ).into_response())
}
