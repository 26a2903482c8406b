use std::path::PathBuf;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    /// Base url OAuth providers redirect back to.
    pub public_url: String,
    pub client_secrets: PathBuf,
    pub secure_cookies: bool,
    pub session_inactivity: time::Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: "sqlite://murmur.db?mode=rwc".to_owned(),
            bind_addr: "0.0.0.0:8080".to_owned(),
            public_url: "http://localhost:8080".to_owned(),
            client_secrets: PathBuf::from("client_secret.json"),
            secure_cookies: false,
            session_inactivity: time::Duration::minutes(60),
        }
    }
}

impl Config {
    /// Reads `.env` (if any) and the process environment over the defaults.
    pub fn from_env() -> anyhow::Result<Config> {
        dotenv::dotenv().ok();
        let defaults = Config::default();

        let secure_cookies = match dotenv::var("SECURE_COOKIES") {
            Ok(x) => x.parse().with_context(|| format!("SECURE_COOKIES={x} is not a bool"))?,
            Err(_) => defaults.secure_cookies,
        };
        let session_inactivity = match dotenv::var("SESSION_INACTIVITY_MINUTES") {
            Ok(x) => time::Duration::minutes(
                x.parse().with_context(|| format!("SESSION_INACTIVITY_MINUTES={x} is not a number"))?,
            ),
            Err(_) => defaults.session_inactivity,
        };

        Ok(Config {
            database_url: dotenv::var("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: dotenv::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            public_url: dotenv::var("PUBLIC_URL")
                .map(|url| url.trim_end_matches('/').to_owned())
                .unwrap_or(defaults.public_url),
            client_secrets: dotenv::var("CLIENT_SECRETS")
                .map(PathBuf::from)
                .unwrap_or(defaults.client_secrets),
            secure_cookies,
            session_inactivity,
        })
    }
}
