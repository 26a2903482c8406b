use anyhow::Context;
use murmur::{auth, logging, AppState, Config};
use sqlx::sqlite::SqlitePoolOptions;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing();
    let config = Config::from_env()?;

    let db_pool = SqlitePoolOptions::new()
        .max_connections(16)
        .connect(&config.database_url)
        .await
        .with_context(|| format!("connecting to {}", config.database_url))?;
    sqlx::migrate!().run(&db_pool).await?;

    let clients = match std::fs::read_to_string(&config.client_secrets) {
        Ok(json) => auth::Clients::from_json(serde_json::from_str(&json)?, &config.public_url)
            .map_err(|err| err.0)?,
        Err(err) => {
            tracing::warn!("no client secrets at {}: {err}; sign-in is disabled", config.client_secrets.display());
            auth::Clients::from_json(serde_json::json!({}), &config.public_url).map_err(|err| err.0)?
        }
    };

    let bind_addr = config.bind_addr.clone();
    let app = murmur::app(AppState {
        db_pool,
        clients,
        config,
    });

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {bind_addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
