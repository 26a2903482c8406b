use askama::Template;
use axum::{debug_handler, extract::State, response::{Html, IntoResponse, Redirect, Response}};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db::{self, Server}, session::current_profile, AppResult, AppState};

#[derive(Template)]
#[template(path = "index.html")]
struct IndexPage {
    profile_name: String,
    servers: Vec<Server>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn index(
    State(db_pool): State<SqlitePool>,
    session: Session
) -> AppResult<Response> {
    let Some(profile) = current_profile(&session, &db_pool).await? else {
        return Ok(
            Redirect::to("/sign-in")
                .into_response()
        );
    };

    let servers = db::servers_of_profile(&db_pool, &profile.id).await?;

    Ok(
        Html(
            IndexPage { profile_name: profile.name, servers }.render()?
        ).into_response()
    )
}
