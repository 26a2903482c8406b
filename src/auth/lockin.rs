use axum::{debug_handler, extract::{Path, Query, State}, http::header, response::{IntoResponse, Redirect}};
use oauth2::{AuthorizationCode, CsrfToken, PkceCodeVerifier, TokenResponse};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db, session::{CSRF_STATE, PKCE_VERIFIER, RETURN_URL, USER_ID}, AppResult, AppState};

use super::{clients::ClientProvider, random_alias, safe_return_url, Clients};

#[derive(Deserialize)]
pub struct LockinQuery {
    pub state: Option<String>,
    pub code: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn lockin(
    Path(provider): Path<ClientProvider>,
    Query(LockinQuery { state, code }): Query<LockinQuery>,
    State(db_pool): State<SqlitePool>,
    State(clients): State<Clients>,
    session: Session,
) -> AppResult<impl IntoResponse> {
    let state = CsrfToken::new(state.ok_or(anyhow::anyhow!("OAuth: without state"))?);
    let code = AuthorizationCode::new(code.ok_or(anyhow::anyhow!("OAuth: without code"))?);

    let Some(stored_state) = session.remove::<String>(CSRF_STATE).await? else {
        return Err(anyhow::anyhow!("no csrf_state").into());
    };

    if state.secret().as_str() != stored_state.as_str() {
        return Err(anyhow::anyhow!("csrf tokens don't match").into());
    }

    let Some(pkce_verifier) = session.remove::<String>(PKCE_VERIFIER).await? else {
        return Err(anyhow::anyhow!("no pkce_verifier").into());
    };

    let client = clients.get_client(provider)?;
    let http_client = reqwest::ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .build()?;
    let token_result = client
        .exchange_code(code)
        .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier))
        .request_async(&http_client)
        .await?;

    let access_token = token_result.access_token().secret();
    let body: serde_json::Value = http_client.get(provider.userinfo_url())
        .bearer_auth(access_token)
        .header(header::USER_AGENT, "murmur")
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    let user = provider.parse_user(&body)?;

    let user_id = format!("{}:{}", provider.id(), user.id);
    let name = user.name.unwrap_or_else(random_alias);
    let profile = db::upsert_profile(&db_pool, &user_id, &name, &user.image_url).await?;

    session.cycle_id().await?;
    session.insert(USER_ID, user_id).await?;
    tracing::info!(profile_id = %profile.id, "welcome {}", profile.name);

    let return_url = session.remove::<String>(RETURN_URL).await?;
    Ok(Redirect::to(&safe_return_url(return_url)))
}
