#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    extract::Path,
    http::{header, Method, Request, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use murmur::{auth::Clients, db::{self, MemberProfile, MemberRole, Profile, Server}, session::USER_ID, AppState, Config};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tower::ServiceExt;
use tower_sessions::Session;

async fn sign_in_as(Path(user_id): Path<String>, session: Session) -> StatusCode {
    session.insert(USER_ID, user_id).await.unwrap();
    StatusCode::NO_CONTENT
}

pub struct TestApp {
    pub router: Router,
    pub db_pool: SqlitePool,
}

/// A server owned by ada with bob as a guest.
pub struct Guild {
    pub server: Server,
    pub ada: Profile,
    pub ada_member: MemberProfile,
    pub bob: Profile,
    pub bob_member: MemberProfile,
}

impl TestApp {
    pub async fn new() -> TestApp {
        let db_pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!().run(&db_pool).await.unwrap();

        let config = Config::default();
        let state = AppState {
            db_pool: db_pool.clone(),
            clients: Clients::from_json(serde_json::json!({}), &config.public_url).unwrap(),
            config: config.clone(),
        };

        let router = murmur::routes()
            .route("/test/sign-in/{user_id}", get(sign_in_as))
            .with_state(state)
            .layer(murmur::session_layer(&config));

        TestApp { router, db_pool }
    }

    pub async fn profile(&self, name: &str) -> Profile {
        db::upsert_profile(&self.db_pool, &format!("test:{name}"), name, "").await.unwrap()
    }

    pub async fn guild(&self) -> Guild {
        let ada = self.profile("ada").await;
        let bob = self.profile("bob").await;
        let server = db::create_server(&self.db_pool, &ada, "analytical engines", "").await.unwrap();

        let mut conn = self.db_pool.acquire().await.unwrap();
        db::add_member(&mut conn, &server.id, &bob.id, MemberRole::Guest).await.unwrap();
        drop(conn);

        let ada_member = db::find_member(&self.db_pool, &server.id, &ada.id).await.unwrap().unwrap();
        let bob_member = db::find_member(&self.db_pool, &server.id, &bob.id).await.unwrap().unwrap();
        Guild { server, ada, ada_member, bob, bob_member }
    }

    /// Session cookie for `profile`.
    pub async fn cookie(&self, profile: &Profile) -> String {
        self.cookie_for_user_id(&profile.user_id).await
    }

    pub async fn cookie_for_user_id(&self, user_id: &str) -> String {
        let response = self.request(Method::GET, &format!("/test/sign-in/{user_id}"), None, None).await;
        response.headers()[header::SET_COOKIE]
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_owned()
    }

    pub async fn request(&self, method: Method, uri: &str, cookie: Option<&str>, json: Option<serde_json::Value>) -> Response {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let body = match json {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.router.clone().oneshot(request.body(body).unwrap()).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        self.request(Method::GET, uri, cookie, None).await
    }
}

pub fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

pub async fn text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn json_body(response: Response) -> serde_json::Value {
    serde_json::from_str(&text(response).await).unwrap()
}
