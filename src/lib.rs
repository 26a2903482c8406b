pub mod appresult;
pub mod auth;
pub mod config;
pub mod conversations;
pub mod db;
pub mod direct_messages;
pub mod logging;
pub mod res;
pub mod servers;
pub mod session;

use axum::{extract::FromRef, routing::get, Router};
use serde_json::Value;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

pub use appresult::{AppError, AppResult};
pub use config::Config;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub clients: auth::Clients,
    pub config: Config,
}

/// Every route of the service, before state and session are attached.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(servers::index))
        .route("/res/style.css", get(res::stylesheet))

        .merge(auth::router())
        .merge(servers::router())
        .merge(conversations::router())
        .nest("/api", direct_messages::router())
}

pub fn session_layer(config: &Config) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_secure(config.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(config.session_inactivity))
}

pub fn app(state: AppState) -> Router {
    let session_layer = session_layer(&state.config);

    routes()
        .with_state(state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
}

pub trait GetField {
    fn get_str_field(&self, field: &str) -> AppResult<String>;
    fn get_obj_field(&self, field: &str) -> AppResult<&Value>;
}

impl GetField for serde_json::Value {
    fn get_str_field(&self, field: &str) -> AppResult<String> {
        Ok(
            self.get(field)
            .ok_or(anyhow::anyhow!("expected {field} in {self}"))?
            .as_str()
            .ok_or(anyhow::anyhow!("expected {field} in {self} to be string"))?
            .to_owned()
        )
    }

    fn get_obj_field(&self, field: &str) -> AppResult<&Value> {
        Ok(
            self.get(field)
            .ok_or(anyhow::anyhow!("expected {field} in {self}"))?
        )
    }
}

/// Renders message Markdown. Raw HTML in the source is shown as text.
pub fn render_markdown(source: &str) -> String {
    use pulldown_cmark::{Event, Options, Parser};

    let parser = Parser::new_ext(source, Options::ENABLE_STRIKETHROUGH)
        .map(|event| match event {
            Event::Html(html) | Event::InlineHtml(html) => Event::Text(html),
            _ => event,
        });

    let mut html_output = String::new();
    pulldown_cmark::html::push_html(&mut html_output, parser);
    html_output
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn markdown_escapes_raw_html() {
        let html = render_markdown("**hi** <script>alert(1)</script>");
        assert!(html.contains("<strong>hi</strong>"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn get_field_reports_missing_and_mistyped() {
        let value = json!({ "name": "Ada", "id": 7, "web": { "a": "b" } });

        assert_eq!(value.get_str_field("name").unwrap(), "Ada");
        assert!(value.get_str_field("id").is_err());
        assert!(value.get_str_field("nope").is_err());
        assert_eq!(value.get_obj_field("web").unwrap().get_str_field("a").unwrap(), "b");
    }
}
