mod index;
mod invite;
mod new;
mod server;

use axum::{routing::{get, post}, Router};

use crate::AppState;

pub(crate) use index::index;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/servers", post(new::new_server))
        .route("/servers/{server_id}", get(server::server))
        .route("/invite/{invite_code}", get(invite::invite))
}
