use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db::{self, Profile}, AppResult};

pub const USER_ID: &str = "user_id";
pub const CSRF_STATE: &str = "csrf_state";
pub const PKCE_VERIFIER: &str = "pkce_verifier";
pub const RETURN_URL: &str = "return_url";

/// The profile signed in on this session, if any.
pub async fn current_profile(session: &Session, db_pool: &SqlitePool) -> AppResult<Option<Profile>> {
    let Some(user_id) = session.get::<String>(USER_ID).await? else {
        return Ok(None);
    };

    Ok(db::find_profile_by_user_id(db_pool, &user_id).await?)
}
