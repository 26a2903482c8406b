use std::fmt;

use oauth2::{basic::BasicClient, AuthUrl, Client, ClientId, ClientSecret, RedirectUrl, Scope, TokenUrl};
use serde::Deserialize;
use serde_json::Value;

use crate::{AppResult, GetField};

type HappyClient = Client<oauth2::StandardErrorResponse<oauth2::basic::BasicErrorResponseType>, oauth2::StandardTokenResponse<oauth2::EmptyExtraTokenFields, oauth2::basic::BasicTokenType>, oauth2::StandardTokenIntrospectionResponse<oauth2::EmptyExtraTokenFields, oauth2::basic::BasicTokenType>, oauth2::StandardRevocableToken, oauth2::StandardErrorResponse<oauth2::RevocationErrorResponseType>, oauth2::EndpointSet, oauth2::EndpointNotSet, oauth2::EndpointNotSet, oauth2::EndpointNotSet, oauth2::EndpointSet>;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClientProvider {
    Google,
    Github,
}

/// Who the provider says signed in.
#[derive(Debug, PartialEq, Eq)]
pub struct ProviderUser {
    pub id: String,
    pub name: Option<String>,
    pub image_url: String,
}

impl ClientProvider {
    pub const ALL: [ClientProvider; 2] = [ClientProvider::Google, ClientProvider::Github];

    pub fn id(&self) -> &'static str {
        use ClientProvider::*;
        match self {
            Google => "google.com",
            Github => "github.com",
        }
    }

    /// Path segment used in `/sign-in/{provider}` and `/lockin/{provider}`.
    pub fn slug(&self) -> &'static str {
        use ClientProvider::*;
        match self {
            Google => "google",
            Github => "github",
        }
    }

    pub(crate) fn scopes(&self) -> Vec<Scope> {
        use ClientProvider::*;
        let scopes: &[&str] = match self {
            Google => &["openid", "profile"],
            Github => &["read:user"],
        };
        scopes.iter().map(|scope| Scope::new(scope.to_string())).collect()
    }

    pub(crate) fn userinfo_url(&self) -> &'static str {
        use ClientProvider::*;
        match self {
            Google => "https://www.googleapis.com/oauth2/v2/userinfo",
            Github => "https://api.github.com/user",
        }
    }

    pub(crate) fn parse_user(&self, body: &Value) -> AppResult<ProviderUser> {
        use ClientProvider::*;
        let name = |field: &str| body.get(field)
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
            .map(str::to_owned);

        Ok(match self {
            Google => ProviderUser {
                id: body.get_str_field("id")?,
                name: name("name"),
                image_url: name("picture").unwrap_or_default(),
            },
            Github => ProviderUser {
                id: body.get("id")
                    .and_then(Value::as_u64)
                    .ok_or(anyhow::anyhow!("expected numeric id in {body}"))?
                    .to_string(),
                name: name("name").or_else(|| name("login")),
                image_url: name("avatar_url").unwrap_or_default(),
            },
        })
    }
}

impl fmt::Display for ClientProvider {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Clone)]
pub struct Clients {
    google_client: Option<HappyClient>,
    github_client: Option<HappyClient>,
}

impl Clients {
    /// Builds a client per provider present in `json`; `public_url` is where providers send users back.
    pub fn from_json(json: Value, public_url: &str) -> AppResult<Clients> {
        let google_client = build_client(
            &json,
            ClientProvider::Google,
            "https://accounts.google.com/o/oauth2/auth",
            "https://oauth2.googleapis.com/token",
            public_url,
        )?;
        let github_client = build_client(
            &json,
            ClientProvider::Github,
            "https://github.com/login/oauth/authorize",
            "https://github.com/login/oauth/access_token",
            public_url,
        )?;

        Ok(
            Clients {
                google_client,
                github_client,
            }
        )
    }

    pub fn get_client(&self, provider: ClientProvider) -> AppResult<HappyClient> {
        use ClientProvider::*;
        match provider {
            Google => self.google_client.clone(),
            Github => self.github_client.clone(),
        }.ok_or_else(|| anyhow::anyhow!("OAuth provider {provider} keys not supplied").into())
    }

    pub fn providers(&self) -> Vec<ClientProvider> {
        ClientProvider::ALL
            .into_iter()
            .filter(|provider| self.get_client(*provider).is_ok())
            .collect()
    }
}

fn build_client(
    json: &Value,
    provider: ClientProvider,
    auth_url: &str,
    token_url: &str,
    public_url: &str,
) -> AppResult<Option<HappyClient>> {
    let Some(json) = json.get(provider.slug()) else {
        return Ok(None);
    };
    let client_id = ClientId::new(json.get_str_field("client_id")?);
    let client_secret = ClientSecret::new(json.get_str_field("client_secret")?);

    let auth_url = AuthUrl::new(auth_url.to_owned())?;
    let token_url = TokenUrl::new(token_url.to_owned())?;
    let redirect_url = RedirectUrl::new(format!("{public_url}/lockin/{}", provider.slug()))?;

    Ok(Some(
        BasicClient::new(client_id)
        .set_client_secret(client_secret)
        .set_auth_uri(auth_url)
        .set_token_uri(token_url)
        .set_redirect_uri(redirect_url)
    ))
}
